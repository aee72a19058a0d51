use super::wifi::Adapter;
use crate::commands::{assert_valid_path, CloseSocketCommand, ConnectCommand, TransmissionPrepareCommand};
use crate::http::{build_request, HTTP_PORT};
use crate::responses::{LINKED, OK, SEND_OK, SEND_PROMPT, UNLINK};
use crate::wifi::{Error, Step};
use embedded_io_async::{Read, Write};

impl<T: Read + Write, const CAPACITY: usize> Adapter<T, CAPACITY> {
    /// Sends a GET request for `path` to `host` on port 80, s. [crate::http::HttpClient]
    pub async fn http_get(&mut self, host: &str, path: &str) -> Result<(), Error> {
        assert_valid_path(path)?;
        let command = ConnectCommand::tcp(host, HTTP_PORT)?;
        self.exchange(&command, OK).await?;

        // Link may be open from here on
        let request = build_request(host, path);
        if let Err(error) = self.transmit(request.as_bytes()).await {
            if self.close_on_failure {
                if let Err(close_error) = self.close().await {
                    log::warn!("Closing connection after failure failed: {:?}", close_error);
                }
            }

            return Err(error);
        }

        self.close().await
    }

    /// Opens a TCP connection to the given host on port 80
    pub async fn connect(&mut self, host: &str) -> Result<(), Error> {
        let command = ConnectCommand::tcp(host, HTTP_PORT)?;

        self.exchange(&command, OK).await?;
        self.expect(Step::Linked, LINKED).await
    }

    /// Transmits the given data on the open connection
    pub async fn send(&mut self, data: &[u8]) -> Result<(), Error> {
        self.exchange(&TransmissionPrepareCommand::new(data.len()), SEND_PROMPT).await?;
        self.write(Step::Transmission, data).await?;

        self.expect(Step::SendConfirmation, SEND_OK).await?;
        self.expect(Step::SendConfirmation, OK).await
    }

    async fn transmit(&mut self, data: &[u8]) -> Result<(), Error> {
        self.expect(Step::Linked, LINKED).await?;
        self.send(data).await
    }

    /// Closes the open connection
    pub async fn close(&mut self) -> Result<(), Error> {
        self.exchange(&CloseSocketCommand, OK).await?;
        self.expect(Step::Unlink, UNLINK).await
    }
}
