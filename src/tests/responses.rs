use crate::responses::{find, is_joined_to, WifiMode};

#[test]
fn test_wifi_mode_from_reply() {
    assert_eq!(Some(WifiMode::Null), WifiMode::from_reply(b"+CWMODE:0\r\n\r\nOK\r\n"));
    assert_eq!(Some(WifiMode::Station), WifiMode::from_reply(b"+CWMODE:1\r\n\r\nOK\r\n"));
    assert_eq!(Some(WifiMode::SoftAccessPoint), WifiMode::from_reply(b"+CWMODE:2\r\n\r\nOK\r\n"));
    assert_eq!(
        Some(WifiMode::SoftAccessPointStation),
        WifiMode::from_reply(b"AT+CWMODE?\r\r\n+CWMODE:3\r\n\r\nOK\r\n")
    );
}

#[test]
fn test_wifi_mode_from_reply_invalid() {
    assert_eq!(None, WifiMode::from_reply(b"\r\nOK\r\n"));
    assert_eq!(None, WifiMode::from_reply(b"+CWMODE:"));
    assert_eq!(None, WifiMode::from_reply(b"+CWMODE:9\r\n"));
    assert_eq!(None, WifiMode::from_reply(b"+CWMOD:1\r\n"));
}

#[test]
fn test_is_joined_to() {
    assert_eq!(Some(true), is_joined_to(b"+CWJAP:\"test_wifi\"\r\n\r\nOK\r\n", "test_wifi"));
    assert_eq!(Some(false), is_joined_to(b"+CWJAP:\"other\"\r\n\r\nOK\r\n", "test_wifi"));
    assert_eq!(None, is_joined_to(b"No AP\r\n\r\nOK\r\n", "test_wifi"));

    // SSID before the marker is not taken into account
    assert_eq!(Some(false), is_joined_to(b"test_wifi+CWJAP:\"other\"\r\n", "test_wifi"));
}

#[test]
fn test_find() {
    assert_eq!(Some(0), find(b"OK", b"OK"));
    assert_eq!(Some(2), find(b"\r\nOK\r\n", b"OK"));
    assert_eq!(Some(1), find(b"A\0B\0C", b"\0B"));
    assert_eq!(None, find(b"O", b"OK"));
    assert_eq!(Some(0), find(b"abc", b""));
}
