//! Transport errors

use std::io;
use thiserror::Error;

/// Errors that can occur while opening, configuring or using a serial line
#[derive(Error, Debug)]
pub enum TransportError {
    /// The device path is empty
    #[error("Invalid serial device path")]
    InvalidPath,

    /// Neither receive nor transmit was requested
    #[error("Port must be opened to receive, transmit or both")]
    MustReceiveOrTransmit,

    /// The OS refused to open the device; carries the errno
    #[error("Failed to open serial device: {}", io::Error::from_raw_os_error(*.0))]
    OpenFailed(i32),

    /// `open` was called on an open port
    #[error("Serial port is already open")]
    AlreadyOpen,

    /// `open` was called after `close`
    #[error("Serial port has been closed")]
    PortClosed,

    /// I/O on a port that is not open
    #[error("Serial port is not open")]
    NotOpen,

    /// A received byte is not ASCII
    #[error("Unable to convert byte {0:#04x} to an ASCII character")]
    UnableToConvertByteToCharacter(u8),

    /// The stream ended
    #[error("Device disconnected")]
    Disconnected,

    /// No terminator within the line length limit
    #[error("Line exceeds {0} bytes without a terminator")]
    LineTooLong(usize),

    /// The platform has no speed constant for this rate
    #[error("Unsupported baud rate: {0}")]
    UnsupportedBaudRate(u32),

    /// Any other I/O failure
    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => TransportError::Disconnected,
            io::ErrorKind::NotConnected => TransportError::NotOpen,
            _ => TransportError::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mapping() {
        let eof = io::Error::from(io::ErrorKind::UnexpectedEof);
        assert!(matches!(TransportError::from(eof), TransportError::Disconnected));

        let closed = io::Error::from(io::ErrorKind::NotConnected);
        assert!(matches!(TransportError::from(closed), TransportError::NotOpen));

        let other = io::Error::from(io::ErrorKind::PermissionDenied);
        assert!(matches!(TransportError::from(other), TransportError::Io(_)));
    }

    #[test]
    fn test_open_failed_display_includes_os_message() {
        let err = TransportError::OpenFailed(libc::ENOENT);
        assert!(err.to_string().starts_with("Failed to open serial device: "));
        assert!(err.to_string().len() > "Failed to open serial device: ".len());
    }
}
