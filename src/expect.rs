//! # Pattern-expect engine
//!
//! Bounded, byte-at-a-time scanner for the serial output of the modem. A call to
//! [ExpectEngine::await_pattern] reads one byte after another until the most recent bytes equal the
//! given pattern.
//!
//! There is no clock. The wait is bounded by the number of consumed bytes instead: after
//! `CAPACITY - pattern.len() + 1` bytes without a match, [ExpectError::Overflow] is returned. As
//! the transport is blocking, this budget acts as the timeout of every exchange.
//!
//! ## Example
//!
//! ````
//! use esp_at_expect::expect::{ExpectEngine, ExpectError};
//!
//! let mut engine: ExpectEngine<32> = ExpectEngine::new();
//!
//! let mut serial: &[u8] = b"+CWMODE:1\r\n\r\nOK\r\n";
//! engine.await_pattern(&mut serial, b"\r\nOK\r\n").unwrap();
//! assert_eq!(b"+CWMODE:1\r\n\r\nOK\r\n", engine.history());
//!
//! let mut serial: &[u8] = &[b'x'; 64];
//! assert_eq!(Err(ExpectError::Overflow), engine.await_pattern(&mut serial, b"\r\nOK\r\n"));
//! assert_eq!(27, engine.consumed());
//! ````
use embedded_io::{ErrorKind, ReadExactError};
use heapless::Vec;

/// History capacity used when no specific size is required
pub const DEFAULT_CAPACITY: usize = 128;

/// Possible errors while waiting for a pattern
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExpectError {
    /// Byte budget exhausted without a match. This is the de facto timeout of the engine.
    Overflow,

    /// Pattern is empty or longer than the history capacity
    InvalidPattern,

    /// Transport signaled the end of the byte stream
    UnexpectedEof,

    /// Reading from the transport failed
    Transport(ErrorKind),
}

#[cfg(feature = "defmt")]
impl defmt::Format for ExpectError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ExpectError::Overflow => defmt::write!(f, "ExpectError::Overflow"),
            ExpectError::InvalidPattern => defmt::write!(f, "ExpectError::InvalidPattern"),
            ExpectError::UnexpectedEof => defmt::write!(f, "ExpectError::UnexpectedEof"),
            ExpectError::Transport(kind) => {
                defmt::write!(f, "ExpectError::Transport({})", defmt::Debug2Format(kind))
            }
        }
    }
}

impl<E: embedded_io::Error> From<ReadExactError<E>> for ExpectError {
    fn from(error: ReadExactError<E>) -> Self {
        match error {
            ReadExactError::UnexpectedEof => ExpectError::UnexpectedEof,
            ReadExactError::Other(other) => ExpectError::Transport(other.kind()),
        }
    }
}

/// Scan state after feeding a single byte
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Progress {
    /// No match yet, more bytes may be consumed
    Pending,

    /// Pattern matched the most recent bytes
    Matched,

    /// Byte budget is exhausted
    Overflow,
}

/// Sliding-window matcher with a fixed history of `CAPACITY` bytes
///
/// The history is cleared at the start of each wait and keeps everything consumed since then, so
/// callers may inspect data preceding the matched pattern (e.g. a reported mode) until the next
/// wait starts.
#[derive(Clone, Debug, Default)]
pub struct ExpectEngine<const CAPACITY: usize> {
    /// Bytes consumed by the current or last wait
    history: Vec<u8, CAPACITY>,
}

impl<const CAPACITY: usize> ExpectEngine<CAPACITY> {
    pub const fn new() -> Self {
        Self { history: Vec::new() }
    }

    /// Blocks until `pattern` was read from `reader`
    ///
    /// Returns on the first occurrence. Consumed bytes are not pushed back.
    pub fn await_pattern<R: embedded_io::Read>(&mut self, reader: &mut R, pattern: &[u8]) -> Result<(), ExpectError> {
        self.start(pattern)?;

        loop {
            let mut byte = [0x0; 1];
            reader.read_exact(&mut byte)?;

            match self.feed(pattern, byte[0]) {
                Progress::Pending => {}
                Progress::Matched => return Ok(()),
                Progress::Overflow => return Err(self.overflow(pattern)),
            }
        }
    }

    /// Async version of [ExpectEngine::await_pattern]
    pub async fn await_pattern_async<R: embedded_io_async::Read>(
        &mut self,
        reader: &mut R,
        pattern: &[u8],
    ) -> Result<(), ExpectError> {
        self.start(pattern)?;

        loop {
            let mut byte = [0x0; 1];
            reader.read_exact(&mut byte).await?;

            match self.feed(pattern, byte[0]) {
                Progress::Pending => {}
                Progress::Matched => return Ok(()),
                Progress::Overflow => return Err(self.overflow(pattern)),
            }
        }
    }

    /// Clears the history and validates the pattern
    pub fn start(&mut self, pattern: &[u8]) -> Result<(), ExpectError> {
        self.history.clear();

        if pattern.is_empty() || pattern.len() > CAPACITY {
            return Err(ExpectError::InvalidPattern);
        }

        Ok(())
    }

    /// Appends a single byte and compares the match window
    ///
    /// The match is checked before the budget, so an occurrence ending on the last budgeted byte
    /// is still detected. `pattern` must be the one passed to [ExpectEngine::start].
    pub fn feed(&mut self, pattern: &[u8], byte: u8) -> Progress {
        if self.history.push(byte).is_err() {
            return Progress::Overflow;
        }

        if self.history.ends_with(pattern) {
            return Progress::Matched;
        }

        if self.history.len() >= Self::budget(pattern.len()) {
            return Progress::Overflow;
        }

        Progress::Pending
    }

    /// Max. number of bytes consumed while waiting for a pattern of the given length
    pub const fn budget(pattern_len: usize) -> usize {
        CAPACITY.saturating_sub(pattern_len) + 1
    }

    /// Bytes consumed since the last wait started
    pub fn history(&self) -> &[u8] {
        self.history.as_slice()
    }

    /// Number of bytes consumed since the last wait started
    pub fn consumed(&self) -> usize {
        self.history.len()
    }

    /// Returns the history capacity
    pub const fn capacity(&self) -> usize {
        CAPACITY
    }

    fn overflow(&self, pattern: &[u8]) -> ExpectError {
        log::debug!(
            "Pattern {:?} not found within {} bytes",
            core::str::from_utf8(pattern).unwrap_or("<binary>"),
            self.history.len()
        );
        ExpectError::Overflow
    }
}
