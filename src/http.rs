//! # HTTP GET client
//!
//! Issues a single HTTP/1.1 GET request over a TCP connection brokered by the modem. The
//! connection is opened, the request is transmitted and the connection is closed again. The HTTP
//! response itself is not evaluated.
//!
//! ## Example
//!
//! ````
//! # use esp_at_expect::example::ExampleSerial;
//! use esp_at_expect::http::HttpClient;
//! use esp_at_expect::wifi::{Adapter, WifiAdapter};
//!
//! let mut adapter: Adapter<_, 128> = Adapter::new(ExampleSerial::default());
//! adapter.init().unwrap();
//! adapter.join_network("test_wifi", "secret").unwrap();
//!
//! adapter.http_get("93.184.216.34", "/").unwrap();
//! ````
use crate::commands::{assert_valid_path, CloseSocketCommand, ConnectCommand, TransmissionPrepareCommand};
use crate::responses::{LINKED, OK, SEND_OK, SEND_PROMPT, UNLINK};
use crate::wifi::{Adapter, Error, Step};
use alloc::string::String;
use core::fmt::Debug;
use embedded_io::{Read, Write};

/// Remote port of all connections
pub const HTTP_PORT: u16 = 80;

/// Value of the User-Agent header
pub const USER_AGENT: &str = "ESP8266/1.0";

/// Upper bound of the request length without host and path
pub const REQUEST_OVERHEAD: usize = 60;

/// HTTP client trait
pub trait HttpClient {
    /// Error when requesting
    type Error: Debug;

    /// Sends a GET request for `path` to `host` on port 80
    fn http_get(&mut self, host: &str, path: &str) -> Result<(), Self::Error>;
}

/// Builds the request text for a GET request
pub fn build_request(host: &str, path: &str) -> String {
    let mut request = String::with_capacity(REQUEST_OVERHEAD + host.len() + path.len());

    request.push_str("GET ");
    request.push_str(path);
    request.push_str(" HTTP/1.1\r\nHost: ");
    request.push_str(host);
    request.push_str("\r\nUser-Agent: ");
    request.push_str(USER_AGENT);
    request.push_str("\r\n\r\n");

    request
}

impl<T: Read + Write, const CAPACITY: usize> HttpClient for Adapter<T, CAPACITY> {
    type Error = Error;

    /// Connects, transmits the request and closes the connection
    ///
    /// Returns the first error. If [Adapter::set_close_on_failure] is set, any failure after the
    /// CIPSTART acknowledge is followed by a best-effort close.
    fn http_get(&mut self, host: &str, path: &str) -> Result<(), Error> {
        assert_valid_path(path)?;
        let command = ConnectCommand::tcp(host, HTTP_PORT)?;
        self.exchange(&command, OK)?;

        // Link may be open from here on
        let request = build_request(host, path);
        if let Err(error) = self.transmit(request.as_bytes()) {
            self.abort();
            return Err(error);
        }

        self.close()
    }
}

impl<T: Read + Write, const CAPACITY: usize> Adapter<T, CAPACITY> {
    /// Opens a TCP connection to the given host on port 80
    pub fn connect(&mut self, host: &str) -> Result<(), Error> {
        let command = ConnectCommand::tcp(host, HTTP_PORT)?;

        self.exchange(&command, OK)?;
        self.expect(Step::Linked, LINKED)
    }

    /// Transmits the given data on the open connection
    pub fn send(&mut self, data: &[u8]) -> Result<(), Error> {
        self.exchange(&TransmissionPrepareCommand::new(data.len()), SEND_PROMPT)?;
        self.write(Step::Transmission, data)?;

        self.expect(Step::SendConfirmation, SEND_OK)?;
        self.expect(Step::SendConfirmation, OK)
    }

    /// Waits for the link notification and transmits the given data
    fn transmit(&mut self, data: &[u8]) -> Result<(), Error> {
        self.expect(Step::Linked, LINKED)?;
        self.send(data)
    }

    /// Closes the open connection
    pub fn close(&mut self) -> Result<(), Error> {
        self.exchange(&CloseSocketCommand, OK)?;
        self.expect(Step::Unlink, UNLINK)
    }

    /// Best-effort close after a failure on a possibly open link
    fn abort(&mut self) {
        if !self.close_on_failure {
            return;
        }

        if let Err(error) = self.close() {
            log::warn!("Closing connection after failure failed: {:?}", error);
        }
    }
}
