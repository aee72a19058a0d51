use crate::asynch::Adapter;
use crate::expect::ExpectError;
use crate::tests::mock::{MockModem, MockedExchange};
use crate::wifi::{Error, Step};
use alloc::string::ToString;
use embassy_futures::block_on;

type AdapterType = Adapter<MockModem, 128>;

#[test]
fn test_init_station_mode_already_set() {
    let mut modem = MockModem::new();
    modem.add_init_until_mode_query(b"+CWMODE:1\r\n\r\nOK\r\n");
    modem.add_exchange(MockedExchange::ok(b"AT+CIPMUX=0\r\n"));

    let mut adapter: AdapterType = Adapter::new(modem);
    block_on(adapter.init()).unwrap();

    let commands = adapter.transport.get_commands_as_strings();
    assert_eq!(4, commands.len());
    assert_eq!("AT+CIPMUX=0\r\n".to_string(), commands[3]);
}

#[test]
fn test_init_station_mode_set() {
    let mut modem = MockModem::new();
    modem.add_init_until_mode_query(b"+CWMODE:2\r\n\r\nOK\r\n");
    modem.add_exchange(MockedExchange::ok(b"AT+CWMODE=1\r\n"));
    modem.add_exchange(MockedExchange::ok(b"AT+CIPMUX=0\r\n"));

    let mut adapter: AdapterType = Adapter::new(modem);
    block_on(adapter.init()).unwrap();

    let commands = adapter.transport.get_commands_as_strings();
    assert_eq!("AT+CWMODE=1\r\n".to_string(), commands[3]);
    adapter.transport.assert_all_exchanges_done();
}

#[test]
fn test_init_mode_marker_missing() {
    let mut modem = MockModem::new();
    modem.add_init_until_mode_query(b"\r\nOK\r\n");

    let mut adapter: AdapterType = Adapter::new(modem);
    let error = block_on(adapter.init()).unwrap_err();

    assert_eq!(Error::Protocol(Step::ModeQuery), error);
}

#[test]
fn test_init_reset_banner_required() {
    let mut modem = MockModem::new();
    modem.add_exchange(MockedExchange::ok(b"AT+RST\r\n"));

    let mut adapter: AdapterType = Adapter::new(modem);
    adapter.set_reset_banner_required(true);
    let error = block_on(adapter.init()).unwrap_err();

    assert_eq!(Error::Reply(Step::Reset, ExpectError::UnexpectedEof), error);
}

#[test]
fn test_join_and_state() {
    let mut modem = MockModem::new();
    modem.add_exchange(MockedExchange::new(Some(b"AT+CWJAP?\r\n"), b"+CWJAP:\"other\"\r\n\r\nOK\r\n"));
    modem.add_exchange(MockedExchange::ok(b"AT+CWJAP=\"test_wifi\",\"secret\"\r\n"));

    let mut adapter: AdapterType = Adapter::new(modem);
    block_on(adapter.ensure_joined("test_wifi", "secret")).unwrap();

    adapter.transport.assert_all_exchanges_done();
}

#[test]
fn test_join_invalid_character() {
    let mut adapter: AdapterType = Adapter::new(MockModem::new());

    let error = block_on(adapter.join_network("test\"wifi", "secret")).unwrap_err();
    assert_eq!(Error::InvalidCharacter, error);
}

#[test]
fn test_http_get_correct_conversation() {
    let mut modem = MockModem::new();
    modem.add_exchange(MockedExchange::new(
        Some(b"AT+CIPSTART=\"TCP\",\"93.184.216.34\",80\r\n"),
        b"\r\nOK\r\nLinked\r\n",
    ));
    modem.add_exchange(MockedExchange::new(Some(b"AT+CIPSEND=64\r\n"), b"> "));
    modem.add_exchange(MockedExchange::new(
        Some(b"GET / HTTP/1.1\r\nHost: 93.184.216.34\r\nUser-Agent: ESP8266/1.0\r\n\r\n"),
        b"\r\nSEND OK\r\n\r\nOK\r\n",
    ));
    modem.add_exchange(MockedExchange::new(Some(b"AT+CIPCLOSE\r\n"), b"\r\nOK\r\nUnlink\r\n"));

    let mut adapter: AdapterType = Adapter::new(modem);
    block_on(adapter.http_get("93.184.216.34", "/")).unwrap();

    let modem = adapter.into_inner();
    modem.assert_all_exchanges_done();
    assert_eq!(4, modem.get_commands_as_strings().len());
}

#[test]
fn test_http_get_close_on_failure() {
    let mut modem = MockModem::new();
    modem.add_exchange(MockedExchange::new(
        Some(b"AT+CIPSTART=\"TCP\",\"93.184.216.34\",80\r\n"),
        b"\r\nOK\r\nLinked\r\n",
    ));
    modem.add_exchange(MockedExchange::new(Some(b"AT+CIPSEND=64\r\n"), &[b'.'; 200]));
    modem.add_exchange(MockedExchange::new(Some(b"AT+CIPCLOSE\r\n"), b"\r\nOK\r\nUnlink\r\n"));

    let mut adapter: AdapterType = Adapter::new(modem);
    adapter.set_close_on_failure(true);
    let error = block_on(adapter.http_get("93.184.216.34", "/")).unwrap_err();

    assert_eq!(Error::Reply(Step::TransmissionStart, ExpectError::Overflow), error);
    adapter.transport.assert_all_exchanges_done();
}

#[test]
fn test_ensure_joined_no_access_point() {
    let mut modem = MockModem::new();
    modem.add_exchange(MockedExchange::new(Some(b"AT+CWJAP?\r\n"), b"No AP\r\n\r\nOK\r\n"));
    modem.add_exchange(MockedExchange::ok(b"AT+CWJAP=\"test_wifi\",\"secret\"\r\n"));

    let mut adapter: AdapterType = Adapter::new(modem);
    block_on(adapter.ensure_joined("test_wifi", "secret")).unwrap();

    adapter.transport.assert_all_exchanges_done();
}

#[test]
fn test_join_state_empty_ssid() {
    let mut adapter: AdapterType = Adapter::new(MockModem::new());

    let error = block_on(adapter.join_state("")).unwrap_err();
    assert_eq!(Error::InvalidSsidLength, error);
    assert!(adapter.transport.get_commands_as_strings().is_empty());
}

#[test]
fn test_http_get_link_not_confirmed_close_on_failure() {
    let mut modem = MockModem::new();
    modem.add_exchange(MockedExchange::ok(b"AT+CIPSTART=\"TCP\",\"93.184.216.34\",80\r\n"));
    modem.add_exchange(MockedExchange::new(Some(b"AT+CIPCLOSE\r\n"), b"\r\nOK\r\nUnlink\r\n"));

    let mut adapter: AdapterType = Adapter::new(modem);
    adapter.set_close_on_failure(true);
    let error = block_on(adapter.http_get("93.184.216.34", "/")).unwrap_err();

    assert_eq!(Error::Reply(Step::Linked, ExpectError::UnexpectedEof), error);
    adapter.transport.assert_all_exchanges_done();
}
