use atat::atat_derive::AtatResp;

/// Commands which gets just responded by OK
#[derive(Clone, AtatResp)]
pub struct NoResponse;

/// Generic acknowledge of a successful command
pub const OK: &[u8] = b"\r\nOK\r\n";

/// Last line of the boot banner printed after a reset
pub const RESET_BANNER: &[u8] = b"www.ai-thinker.com]\r\n";

/// TCP connection got established
pub const LINKED: &[u8] = b"Linked\r\n";

/// Modem is waiting for the raw payload announced by CIPSEND
pub const SEND_PROMPT: &[u8] = b"> ";

/// Transmission of the payload was confirmed
pub const SEND_OK: &[u8] = b"\r\nSEND OK\r\n";

/// TCP connection got closed
pub const UNLINK: &[u8] = b"Unlink\r\n";

/// Prefix of the CWMODE query response, followed by the mode digit
pub const WIFI_MODE_MARKER: &[u8] = b"+CWMODE:";

/// Prefix of the CWJAP query response, followed by the quoted SSID
pub const JOIN_STATE_MARKER: &[u8] = b"+CWJAP:";

/// WIFI mode reported by the CWMODE query
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WifiMode {
    /// Wi-Fi RF is disabled
    Null,
    /// Station mode
    Station,
    /// SoftAP mode
    SoftAccessPoint,
    /// SoftAP + Station mode
    SoftAccessPointStation,
}

impl WifiMode {
    /// Parses the mode digit following the `+CWMODE:` marker
    ///
    /// Returns None if the marker is missing or not followed by a known mode digit.
    pub fn from_reply(reply: &[u8]) -> Option<Self> {
        let start = find(reply, WIFI_MODE_MARKER)?;

        match reply.get(start + WIFI_MODE_MARKER.len()).copied()? {
            b'0' => Some(Self::Null),
            b'1' => Some(Self::Station),
            b'2' => Some(Self::SoftAccessPoint),
            b'3' => Some(Self::SoftAccessPointStation),
            _ => None,
        }
    }
}

/// Checks the CWJAP query response. Returns None if the `+CWJAP:` marker is missing,
/// otherwise true if the given SSID is reported after the marker.
pub fn is_joined_to(reply: &[u8], ssid: &str) -> Option<bool> {
    let start = find(reply, JOIN_STATE_MARKER)? + JOIN_STATE_MARKER.len();
    Some(find(&reply[start..], ssid.as_bytes()).is_some())
}

/// Returns the start index of the first occurrence of `needle`
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }

    haystack.windows(needle.len()).position(|window| window == needle)
}
