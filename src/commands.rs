use crate::expect::ExpectError;
use crate::responses::NoResponse;
use crate::wifi::{Error, Step};
use atat::atat_derive::AtatCmd;
use atat::heapless::String;

/// Max. SSID length accepted by ESP-AT
pub const MAX_SSID_LENGTH: usize = 32;

/// Max. password length accepted by ESP-AT
pub const MAX_PASSWORD_LENGTH: usize = 63;

/// Max. length of a remote host (IPv4, IPv6 or domain name)
pub const MAX_HOST_LENGTH: usize = 64;

/// Trait for mapping command errors
pub trait CommandErrorHandler {
    /// Sequencing step reported when the command fails
    const STEP: Step;

    /// Maps a failed reply wait
    fn command_error(&self, error: ExpectError) -> Error {
        Error::Reply(Self::STEP, error)
    }
}

/// Restarts the module
#[derive(Clone, AtatCmd)]
#[at_cmd("+RST", NoResponse)]
pub struct RestartCommand;

impl CommandErrorHandler for RestartCommand {
    const STEP: Step = Step::Reset;
}

/// Disables the echo of received commands
#[derive(Clone, AtatCmd)]
#[at_cmd("E0", NoResponse)]
pub struct EchoOffCommand;

impl CommandErrorHandler for EchoOffCommand {
    const STEP: Step = Step::EchoOff;
}

/// Queries the current WIFI mode
#[derive(Clone, AtatCmd)]
#[at_cmd("+CWMODE?", NoResponse)]
pub struct WifiModeQueryCommand;

impl CommandErrorHandler for WifiModeQueryCommand {
    const STEP: Step = Step::ModeQuery;
}

/// Sets the WIFI mode
#[derive(Clone, AtatCmd)]
#[at_cmd("+CWMODE", NoResponse)]
pub struct WifiModeCommand {
    /// WIFI mode:
    ///     0: Null mode. Wi-Fi RF will be disabled.
    ///     1: Station mode.
    ///     2: SoftAP mode.
    ///     3: SoftAP+Station mode.
    #[at_arg(position = 0)]
    mode: usize,
}

impl WifiModeCommand {
    pub fn station_mode() -> Self {
        Self { mode: 1 }
    }
}

impl CommandErrorHandler for WifiModeCommand {
    const STEP: Step = Step::ModeSet;
}

/// Enables/Disables multiple connections
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPMUX", NoResponse)]
pub struct SetMultipleConnectionsCommand {
    /// 0: single connection, 1: multiple connections
    #[at_arg(position = 0)]
    mode: usize,
}

impl SetMultipleConnectionsCommand {
    /// Restricts the modem to a single connection
    pub fn single() -> Self {
        Self { mode: 0 }
    }
}

impl CommandErrorHandler for SetMultipleConnectionsCommand {
    const STEP: Step = Step::SingleConnection;
}

/// Command for setting the target WIFI access point parameters
#[derive(Clone, AtatCmd)]
#[at_cmd("+CWJAP", NoResponse)]
pub struct AccessPointConnectCommand {
    /// The SSID of the target access point
    #[at_arg(position = 0)]
    ssid: String<32>,

    /// The password/key of the target access point
    #[at_arg(position = 1)]
    password: String<64>,
}

impl AccessPointConnectCommand {
    /// Validates the credentials, which are sent unescaped
    pub fn new(ssid: &str, password: &str) -> Result<Self, Error> {
        assert_valid_ssid(ssid)?;

        if password.len() > MAX_PASSWORD_LENGTH {
            return Err(Error::InvalidPasswordLength);
        }

        assert_quotable(password)?;

        Ok(Self {
            ssid: String::try_from(ssid).map_err(|_| Error::InvalidSsidLength)?,
            password: String::try_from(password).map_err(|_| Error::InvalidPasswordLength)?,
        })
    }
}

impl CommandErrorHandler for AccessPointConnectCommand {
    const STEP: Step = Step::Join;
}

/// Queries the access point the modem is currently joined to
#[derive(Clone, AtatCmd)]
#[at_cmd("+CWJAP?", NoResponse)]
pub struct JoinStateQueryCommand;

impl CommandErrorHandler for JoinStateQueryCommand {
    const STEP: Step = Step::JoinQuery;
}

/// Establish TCP Connection
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPSTART", NoResponse)]
pub struct ConnectCommand {
    /// Connection type, e.g. TCP, UDP, SSL
    #[at_arg(position = 0)]
    connection_type: String<5>,

    /// Remote IP address or domain name
    #[at_arg(position = 1)]
    remote_host: String<64>,

    /// Remote port
    #[at_arg(position = 2)]
    port: u16,
}

impl ConnectCommand {
    /// Establishes a TCP connection
    pub fn tcp(host: &str, port: u16) -> Result<Self, Error> {
        if host.is_empty() || host.len() > MAX_HOST_LENGTH {
            return Err(Error::InvalidHostLength);
        }

        assert_quotable(host)?;

        Ok(Self {
            connection_type: String::try_from("TCP").map_err(|_| Error::CommandTooLong(Step::Connect))?,
            remote_host: String::try_from(host).map_err(|_| Error::InvalidHostLength)?,
            port,
        })
    }
}

impl CommandErrorHandler for ConnectCommand {
    const STEP: Step = Step::Connect;
}

/// Announces the length of the following raw payload
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPSEND", NoResponse)]
pub struct TransmissionPrepareCommand {
    /// Payload length in bytes
    #[at_arg(position = 0)]
    length: usize,
}

impl TransmissionPrepareCommand {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl CommandErrorHandler for TransmissionPrepareCommand {
    const STEP: Step = Step::TransmissionStart;
}

/// Closes the TCP connection
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPCLOSE", NoResponse)]
pub struct CloseSocketCommand;

impl CommandErrorHandler for CloseSocketCommand {
    const STEP: Step = Step::Close;
}

/// Rejects values which would break the quoted command framing
fn assert_quotable(value: &str) -> Result<(), Error> {
    if value.bytes().any(|byte| byte == b'"' || byte.is_ascii_control()) {
        return Err(Error::InvalidCharacter);
    }

    Ok(())
}

/// Rejects empty, oversized or unquotable SSIDs
pub(crate) fn assert_valid_ssid(ssid: &str) -> Result<(), Error> {
    if ssid.is_empty() || ssid.len() > MAX_SSID_LENGTH {
        return Err(Error::InvalidSsidLength);
    }

    assert_quotable(ssid)
}

/// Rejects paths which would break the HTTP request framing
pub(crate) fn assert_valid_path(path: &str) -> Result<(), Error> {
    if path.is_empty() {
        return Err(Error::InvalidPathLength);
    }

    if path.bytes().any(|byte| byte.is_ascii_control()) {
        return Err(Error::InvalidCharacter);
    }

    Ok(())
}
