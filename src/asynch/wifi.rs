use crate::commands::{
    assert_valid_ssid, AccessPointConnectCommand, CommandErrorHandler, EchoOffCommand, JoinStateQueryCommand, RestartCommand,
    SetMultipleConnectionsCommand, WifiModeCommand, WifiModeQueryCommand,
};
use crate::expect::ExpectEngine;
use crate::responses::{is_joined_to, WifiMode, OK, RESET_BANNER};
use crate::wifi::{encode, Error, Step, COMMAND_BUFFER_SIZE};
use atat::AtatCmd;
use embedded_io_async::{Error as _, Read, Write};

/// Async variant of [crate::wifi::Adapter]
///
/// Performs the same exchanges, each byte read or write being an await point.
pub struct Adapter<T: Read + Write, const CAPACITY: usize> {
    /// Serial connection to the modem
    pub(crate) transport: T,

    /// Reply matcher
    pub(crate) engine: ExpectEngine<CAPACITY>,

    /// True => missing reset banner fails init()
    reset_banner_required: bool,

    /// True => http_get() sends a best-effort close after a failure on an open connection
    pub(crate) close_on_failure: bool,
}

impl<T: Read + Write, const CAPACITY: usize> Adapter<T, CAPACITY> {
    /// Creates a new adapter on the given async serial transport
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

    /// Resets and configures the modem for single connection station mode
    pub async fn init(&mut self) -> Result<(), Error> {
        self.restart().await?;
        self.exchange(&EchoOffCommand, OK).await?;

        let mode = self.query_mode().await?;
        if mode != WifiMode::Station {
            log::debug!("Switching WIFI mode {:?} to station mode", mode);
            self.exchange(&WifiModeCommand::station_mode(), OK).await?;
        }

        self.exchange(&SetMultipleConnectionsCommand::single(), OK).await
    }

    /// Connects to an WIFI access point
    pub async fn join_network(&mut self, ssid: &str, password: &str) -> Result<(), Error> {
        let command = AccessPointConnectCommand::new(ssid, password)?;
        self.exchange(&command, OK).await
    }

    /// Returns true if the modem reports being joined to the given SSID
    pub async fn join_state(&mut self, ssid: &str) -> Result<bool, Error> {
        assert_valid_ssid(ssid)?;

        self.exchange(&JoinStateQueryCommand, OK).await?;
        is_joined_to(self.engine.history(), ssid).ok_or(Error::Protocol(Step::JoinQuery))
    }

    /// Joins the given network, unless the modem is already joined to it.
    /// A reply without `+CWJAP:` marker counts as not joined.
    pub async fn ensure_joined(&mut self, ssid: &str, password: &str) -> Result<(), Error> {
        let command = AccessPointConnectCommand::new(ssid, password)?;

        self.exchange(&JoinStateQueryCommand, OK).await?;
        if is_joined_to(self.engine.history(), ssid).unwrap_or(false) {
            return Ok(());
        }

        log::debug!("Not joined to {:?}, joining", ssid);
        self.exchange(&command, OK).await
    }

    async fn restart(&mut self) -> Result<(), Error> {
        self.send_command(&RestartCommand).await?;

        if let Err(error) = self.expect(RestartCommand::STEP, RESET_BANNER).await {
            if self.reset_banner_required {
                return Err(error);
            }

            log::warn!("Reset banner not received, continuing: {:?}", error);
        }

        Ok(())
    }

    async fn query_mode(&mut self) -> Result<WifiMode, Error> {
        self.exchange(&WifiModeQueryCommand, OK).await?;
        WifiMode::from_reply(self.engine.history()).ok_or(Error::Protocol(Step::ModeQuery))
    }

    pub(crate) async fn exchange<Cmd: AtatCmd + CommandErrorHandler>(
        &mut self,
        command: &Cmd,
        reply: &[u8],
    ) -> Result<(), Error> {
        self.send_command(command).await?;
        self.engine
            .await_pattern_async(&mut self.transport, reply)
            .await
            .map_err(|e| command.command_error(e))
    }

    async fn send_command<Cmd: AtatCmd + CommandErrorHandler>(&mut self, command: &Cmd) -> Result<(), Error> {
        let mut buffer = [0x0; COMMAND_BUFFER_SIZE];
        let encoded = encode(command, &mut buffer)?;
        self.write(Cmd::STEP, encoded).await
    }

    pub(crate) async fn write(&mut self, step: Step, data: &[u8]) -> Result<(), Error> {
        self.transport.write_all(data).await.map_err(|e| Error::Write(step, e.kind()))?;
        self.transport.flush().await.map_err(|e| Error::Write(step, e.kind()))
    }

    pub(crate) async fn expect(&mut self, step: Step, reply: &[u8]) -> Result<(), Error> {
        self.engine
            .await_pattern_async(&mut self.transport, reply)
            .await
            .map_err(|e| Error::Reply(step, e))?;

        log::debug!("Step {:?} matched after {} bytes", step, self.engine.consumed());
        Ok(())
    }
}
