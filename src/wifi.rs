//! # WIFI access point client
//!
//! Initializing the modem and joining a network is supported.
//!
//! Every exchange writes a command and blocks until the expected reply was read. There are no
//! retries, the first failure is returned to the caller.
//!
//! ## Example
//!
//! ````
//! # use esp_at_expect::example::ExampleSerial;
//! use esp_at_expect::wifi::{Adapter, WifiAdapter};
//!
//! let serial = ExampleSerial::default();
//! let mut adapter: Adapter<_, 128> = Adapter::new(serial);
//!
//! // Reset, echo off, station mode, single connection
//! adapter.init().unwrap();
//!
//! // Joining the WIFI access point
//! adapter.join_network("test_wifi", "secret").unwrap();
//! assert!(adapter.join_state("test_wifi").unwrap());
//! ````
use crate::commands::{
    assert_valid_ssid, AccessPointConnectCommand, CommandErrorHandler, EchoOffCommand, JoinStateQueryCommand, RestartCommand,
    SetMultipleConnectionsCommand, WifiModeCommand, WifiModeQueryCommand,
};
use crate::expect::{ExpectEngine, ExpectError};
use crate::responses::{is_joined_to, WifiMode, OK, RESET_BANNER};
use atat::AtatCmd;
use core::fmt::Debug;
use embedded_io::{Error as _, ErrorKind, Read, Write};

/// Size of the stack buffer commands get encoded into
pub const COMMAND_BUFFER_SIZE: usize = 256;

/// Wifi network adapter trait
pub trait WifiAdapter {
    /// Error when initializing or joining
    type Error: Debug;

    /// Resets and configures the modem for single connection station mode
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Connects to an WIFI access point
    fn join_network(&mut self, ssid: &str, password: &str) -> Result<(), Self::Error>;

    /// Returns true if the modem reports being joined to the given SSID
    fn join_state(&mut self, ssid: &str) -> Result<bool, Self::Error>;

    /// Joins the given network, unless the modem is already joined to it
    fn ensure_joined(&mut self, ssid: &str, password: &str) -> Result<(), Self::Error>;
}

/// Sequencing step an error occurred in
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// AT+RST, waiting for the boot banner
    Reset,
    /// ATE0
    EchoOff,
    /// AT+CWMODE?
    ModeQuery,
    /// AT+CWMODE=1
    ModeSet,
    /// AT+CIPMUX=0
    SingleConnection,
    /// AT+CWJAP="<ssid>","<password>"
    Join,
    /// AT+CWJAP?
    JoinQuery,
    /// AT+CIPSTART, waiting for OK
    Connect,
    /// Waiting for the link confirmation
    Linked,
    /// AT+CIPSEND, waiting for the prompt
    TransmissionStart,
    /// Writing the raw payload
    Transmission,
    /// Waiting for SEND OK and the final OK
    SendConfirmation,
    /// AT+CIPCLOSE, waiting for OK
    Close,
    /// Waiting for the unlink confirmation
    Unlink,
}

/// Driver errors
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Expected reply was not received. [ExpectError::Overflow] if the byte budget was exhausted.
    Reply(Step, ExpectError),

    /// Reply was received, but the expected data marker is missing or malformed
    Protocol(Step),

    /// Writing to the transport failed
    Write(Step, ErrorKind),

    /// Encoded command does not fit into the command buffer
    CommandTooLong(Step),

    /// SSID is empty or longer then 32 chars
    InvalidSsidLength,

    /// Password is longer then 63 chars
    InvalidPasswordLength,

    /// Host is empty or longer then 64 chars
    InvalidHostLength,

    /// Request path is empty
    InvalidPathLength,

    /// Argument contains a quote or control character, which would corrupt the command framing
    InvalidCharacter,
}

impl Error {
    /// Returns the step the error occurred in. None for argument validation errors.
    pub fn step(&self) -> Option<Step> {
        match self {
            Error::Reply(step, _) | Error::Protocol(step) | Error::Write(step, _) | Error::CommandTooLong(step) => {
                Some(*step)
            }
            _ => None,
        }
    }

    /// True if the expected reply was not found within the byte budget
    pub fn is_overflow(&self) -> bool {
        matches!(self, Error::Reply(_, ExpectError::Overflow))
    }

    /// True if a reply was received but could not be parsed
    pub fn is_protocol(&self) -> bool {
        matches!(self, Error::Protocol(_))
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Reply(step, e) => defmt::write!(f, "Error::Reply({}, {})", step, e),
            Error::Protocol(step) => defmt::write!(f, "Error::Protocol({})", step),
            Error::Write(step, kind) => {
                defmt::write!(f, "Error::Write({}, {})", step, defmt::Debug2Format(kind))
            }
            Error::CommandTooLong(step) => defmt::write!(f, "Error::CommandTooLong({})", step),
            Error::InvalidSsidLength => defmt::write!(f, "Error::InvalidSsidLength"),
            Error::InvalidPasswordLength => defmt::write!(f, "Error::InvalidPasswordLength"),
            Error::InvalidHostLength => defmt::write!(f, "Error::InvalidHostLength"),
            Error::InvalidPathLength => defmt::write!(f, "Error::InvalidPathLength"),
            Error::InvalidCharacter => defmt::write!(f, "Error::InvalidCharacter"),
        }
    }
}

/// Central client for network communication
///
/// CAPACITY: Size of the reply history in bytes. Bounds how many bytes are consumed while
/// waiting for a reply, s. [ExpectEngine].
pub struct Adapter<T: Read + Write, const CAPACITY: usize> {
    /// Serial connection to the modem
    pub(crate) transport: T,

    /// Reply matcher
    pub(crate) engine: ExpectEngine<CAPACITY>,

    /// True => missing reset banner fails init()
    pub(crate) reset_banner_required: bool,

    /// True => http_get() sends a best-effort close after a failure on an open connection
    pub(crate) close_on_failure: bool,
}

impl<T: Read + Write, const CAPACITY: usize> WifiAdapter for Adapter<T, CAPACITY> {
    type Error = Error;

    /// Resets and configures the modem
    ///
    /// A missing reset banner is ignored unless [Adapter::set_reset_banner_required] is set.
    /// Station mode is only set if the modem reports a different mode.
    fn init(&mut self) -> Result<(), Error> {
        self.restart()?;
        self.exchange(&EchoOffCommand, OK)?;

        let mode = self.query_mode()?;
        if mode != WifiMode::Station {
            log::debug!("Switching WIFI mode {:?} to station mode", mode);
            self.exchange(&WifiModeCommand::station_mode(), OK)?;
        }

        self.exchange(&SetMultipleConnectionsCommand::single(), OK)
    }

    /// Connects to an WIFI access point
    ///
    /// SSID and password must not contain quotes or control characters.
    fn join_network(&mut self, ssid: &str, password: &str) -> Result<(), Error> {
        let command = AccessPointConnectCommand::new(ssid, password)?;
        self.exchange(&command, OK)
    }

    /// Queries the current access point
    ///
    /// A reply without `+CWJAP:` marker (e.g. `No AP`) results in [Error::Protocol].
    fn join_state(&mut self, ssid: &str) -> Result<bool, Error> {
        assert_valid_ssid(ssid)?;

        self.exchange(&JoinStateQueryCommand, OK)?;
        is_joined_to(self.engine.history(), ssid).ok_or(Error::Protocol(Step::JoinQuery))
    }

    /// Queries the current access point and joins if not connected to the given SSID
    ///
    /// A reply without `+CWJAP:` marker counts as not joined.
    fn ensure_joined(&mut self, ssid: &str, password: &str) -> Result<(), Error> {
        let command = AccessPointConnectCommand::new(ssid, password)?;

        self.exchange(&JoinStateQueryCommand, OK)?;
        if is_joined_to(self.engine.history(), ssid).unwrap_or(false) {
            return Ok(());
        }

        log::debug!("Not joined to {:?}, joining", ssid);
        self.exchange(&command, OK)
    }
}

impl<T: Read + Write, const CAPACITY: usize> Adapter<T, CAPACITY> {
    /// Creates a new adapter on the given serial transport
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            engine: ExpectEngine::new(),
            reset_banner_required: false,
            close_on_failure: false,
        }
    }

    /// If true, init() fails if the boot banner is not received after reset. Default: false
    pub fn set_reset_banner_required(&mut self, required: bool) {
        self.reset_banner_required = required;
    }

    /// If true, http_get() tries to close the connection if a step after the CIPSTART
    /// acknowledge fails, including a missing `Linked` notification. The original error is
    /// returned in any case. Default: false
    pub fn set_close_on_failure(&mut self, enabled: bool) {
        self.close_on_failure = enabled;
    }

    /// Bytes received by the last exchange, including the matched reply
    pub fn last_reply(&self) -> &[u8] {
        self.engine.history()
    }

    /// Releases the serial transport
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Sends the restart command and waits for the boot banner
    fn restart(&mut self) -> Result<(), Error> {
        self.send_command(&RestartCommand)?;

        if let Err(error) = self.expect(RestartCommand::STEP, RESET_BANNER) {
            if self.reset_banner_required {
                return Err(error);
            }

            log::warn!("Reset banner not received, continuing: {:?}", error);
        }

        Ok(())
    }

    /// Queries and parses the current WIFI mode
    fn query_mode(&mut self) -> Result<WifiMode, Error> {
        self.exchange(&WifiModeQueryCommand, OK)?;
        WifiMode::from_reply(self.engine.history()).ok_or(Error::Protocol(Step::ModeQuery))
    }

    /// Sends a command and waits for the given reply
    pub(crate) fn exchange<Cmd: AtatCmd + CommandErrorHandler>(
        &mut self,
        command: &Cmd,
        reply: &[u8],
    ) -> Result<(), Error> {
        self.send_command(command)?;
        self.engine
            .await_pattern(&mut self.transport, reply)
            .map_err(|e| command.command_error(e))
    }

    /// Encodes and writes a command
    pub(crate) fn send_command<Cmd: AtatCmd + CommandErrorHandler>(&mut self, command: &Cmd) -> Result<(), Error> {
        let mut buffer = [0x0; COMMAND_BUFFER_SIZE];
        let encoded = encode(command, &mut buffer)?;
        self.write(Cmd::STEP, encoded)
    }

    /// Writes raw bytes and flushes the transport
    pub(crate) fn write(&mut self, step: Step, data: &[u8]) -> Result<(), Error> {
        self.transport.write_all(data).map_err(|e| Error::Write(step, e.kind()))?;
        self.transport.flush().map_err(|e| Error::Write(step, e.kind()))
    }

    /// Waits for the given reply without sending anything
    pub(crate) fn expect(&mut self, step: Step, reply: &[u8]) -> Result<(), Error> {
        self.engine
            .await_pattern(&mut self.transport, reply)
            .map_err(|e| Error::Reply(step, e))?;

        log::debug!("Step {:?} matched after {} bytes", step, self.engine.consumed());
        Ok(())
    }
}

/// Encodes a command into the given buffer
pub(crate) fn encode<'a, Cmd: AtatCmd + CommandErrorHandler>(
    command: &Cmd,
    buffer: &'a mut [u8],
) -> Result<&'a [u8], Error> {
    if Cmd::MAX_LEN > buffer.len() {
        return Err(Error::CommandTooLong(Cmd::STEP));
    }

    let length = command.write(buffer);
    let encoded = &buffer[..length];
    log::debug!("Sending {:?}", core::str::from_utf8(encoded).unwrap_or("<binary>"));

    Ok(encoded)
}
