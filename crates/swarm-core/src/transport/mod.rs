//! Serial Transport
//!
//! Byte-level access to a serial line: opening and configuring the device
//! node, and reading terminator-delimited ASCII lines from any async stream.
//!
//! [`Transport`] is generic over the underlying stream so the same line
//! handling runs against a [`SerialPort`], a pseudo-terminal, or an
//! in-memory duplex pipe in tests.

mod error;
mod ports;
#[cfg(unix)]
mod serial;
mod settings;
#[cfg(unix)]
mod termios;

pub use error::TransportError;
pub use ports::{list_ports, PortInfo};
#[cfg(unix)]
pub use serial::SerialPort;
pub use settings::{DataBits, LineSettings, Parity, StopBits};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Longest line accepted before a terminator must appear
pub const MAX_LINE_LENGTH: usize = 1024;

const READ_CHUNK: usize = 256;

/// Line-oriented reader and writer over an async byte stream
#[derive(Debug)]
pub struct Transport<S> {
    io: S,
    pending: Vec<u8>,
    cursor: usize,
}

impl<S> Transport<S> {
    /// Wrap a byte stream
    pub fn new(io: S) -> Self {
        Self {
            io,
            pending: Vec::with_capacity(READ_CHUNK),
            cursor: 0,
        }
    }

    /// Access the underlying stream
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.io
    }

    /// Shared access to the underlying stream
    pub fn get_ref(&self) -> &S {
        &self.io
    }

    /// Unwrap the stream. Bytes read ahead but not yet consumed are dropped.
    pub fn into_inner(self) -> S {
        self.io
    }

    /// Number of bytes read from the stream but not yet consumed
    pub fn buffered(&self) -> usize {
        self.pending.len() - self.cursor
    }
}

impl<S: AsyncRead + Unpin> Transport<S> {
    /// Refill the read-ahead buffer. Returns `false` at end of stream.
    async fn fill(&mut self) -> Result<bool, TransportError> {
        let mut chunk = [0u8; READ_CHUNK];
        let n = self.io.read(&mut chunk).await?;
        if n == 0 {
            return Ok(false);
        }
        self.pending.clear();
        self.pending.extend_from_slice(&chunk[..n]);
        self.cursor = 0;
        Ok(true)
    }

    async fn next_byte(&mut self) -> Result<Option<u8>, TransportError> {
        if self.cursor >= self.pending.len() && !self.fill().await? {
            return Ok(None);
        }
        let byte = self.pending[self.cursor];
        self.cursor += 1;
        Ok(Some(byte))
    }

    /// Read exactly one byte
    pub async fn read_byte(&mut self) -> Result<u8, TransportError> {
        self.next_byte().await?.ok_or(TransportError::Disconnected)
    }

    /// Read ASCII characters up to `terminator`, which is consumed but not
    /// included in the result.
    ///
    /// Cancelling the returned future discards any partially read line. If
    /// the stream ends after some characters but before the terminator, those
    /// characters are returned; if it ends before any, the result is
    /// [`TransportError::Disconnected`].
    pub async fn read_until(&mut self, terminator: u8) -> Result<String, TransportError> {
        let mut line = Vec::new();
        loop {
            let Some(byte) = self.next_byte().await? else {
                if line.is_empty() {
                    return Err(TransportError::Disconnected);
                }
                break;
            };
            if byte == terminator {
                break;
            }
            if !byte.is_ascii() {
                return Err(TransportError::UnableToConvertByteToCharacter(byte));
            }
            if line.len() >= MAX_LINE_LENGTH {
                return Err(TransportError::LineTooLong(MAX_LINE_LENGTH));
            }
            line.push(byte);
        }
        // Every byte is ASCII at this point
        Ok(line.into_iter().map(char::from).collect())
    }
}

impl<S: AsyncWrite + Unpin> Transport<S> {
    /// Write `bytes` and flush. Returns how many bytes the stream accepted,
    /// which is less than `bytes.len()` only if the stream stopped accepting.
    pub async fn write_bytes(&mut self, bytes: &[u8]) -> Result<usize, TransportError> {
        let mut written = 0;
        while written < bytes.len() {
            let n = self.io.write(&bytes[written..]).await?;
            if n == 0 {
                break;
            }
            written += n;
        }
        self.io.flush().await?;
        Ok(written)
    }
}
