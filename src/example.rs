//! Mocks for doc examples
use alloc::collections::VecDeque;
use core::convert::Infallible;
use embedded_io::{ErrorType, Read, Write};

/// Serial port mock answering like an ESP8266 running AT firmware 0.9.x
#[derive(Default)]
pub struct ExampleSerial {
    /// Pending bytes to be read
    rx: VecDeque<u8>,
}

impl ExampleSerial {
    /// Returns the modem reply for the given command
    fn reply(command: &[u8]) -> &'static [u8] {
        match command {
            b"AT+RST\r\n" => b"AT+RST\r\n\r\nOK\r\n\r\n[System Ready, Vendor:www.ai-thinker.com]\r\n",
            b"ATE0\r\n" => b"ATE0\r\n\r\nOK\r\n",
            b"AT+CWMODE?\r\n" => b"+CWMODE:1\r\n\r\nOK\r\n",
            b"AT+CIPMUX=0\r\n" => b"\r\nOK\r\n",
            b"AT+CWJAP=\"test_wifi\",\"secret\"\r\n" => b"\r\nOK\r\n",
            b"AT+CWJAP?\r\n" => b"+CWJAP:\"test_wifi\"\r\n\r\nOK\r\n",
            b"AT+CIPCLOSE\r\n" => b"\r\nOK\r\nUnlink\r\n",
            _ if command.starts_with(b"AT+CIPSTART=") => b"\r\nOK\r\nLinked\r\n",
            _ if command.starts_with(b"AT+CIPSEND=") => b"\r\nOK\r\n> ",
            _ if command.starts_with(b"GET ") => b"\r\nSEND OK\r\n\r\nOK\r\n",
            _ => b"\r\nERROR\r\n",
        }
    }
}

impl ErrorType for ExampleSerial {
    type Error = Infallible;
}

impl Read for ExampleSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut length = 0;

        while length < buf.len() {
            match self.rx.pop_front() {
                Some(byte) => buf[length] = byte,
                None => break,
            }
            length += 1;
        }

        Ok(length)
    }
}

impl Write for ExampleSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.rx.extend(Self::reply(buf));
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
