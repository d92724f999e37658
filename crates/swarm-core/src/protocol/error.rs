//! Protocol errors

use thiserror::Error;

use super::MessageType;
use crate::transport::TransportError;

/// Errors raised while constructing frames
///
/// Parsing inbound text never produces these; a line that is not a valid
/// frame simply parses to `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The type code is empty or has characters outside `[A-Za-z0-9_]`
    #[error("Invalid message type '{0}': expected one or more of [A-Za-z0-9_]")]
    InvalidType(String),

    /// A body was given but is empty
    #[error("Frame body must be absent or non-empty")]
    EmptyBody,

    /// The body contains a line terminator
    #[error("Frame body must not contain line terminators: {0:?}")]
    InvalidBody(String),

    /// Text handed to `FromStr` is not a valid frame
    #[error("Malformed frame: {0:?}")]
    Malformed(String),
}

/// Errors that can occur while talking to a device
#[derive(Error, Debug)]
pub enum DeviceError {
    /// The serial line failed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// An outgoing frame could not be built
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// A line that is not a valid frame, or a frame that did not decode
    #[error("Invalid data from device: {:?}", String::from_utf8_lossy(.0))]
    InvalidData(Vec<u8>),

    /// The line stopped accepting bytes before the whole frame was written
    #[error("Partial write: expected {expected} bytes, wrote {written}")]
    PartialWrite {
        /// Frame length including the line terminator
        expected: usize,
        /// Bytes actually accepted
        written: usize,
    },

    /// No reply within the response timeout
    #[error("Timed out waiting for device response")]
    Timeout,

    /// Too many unrelated frames arrived before the reply
    #[error("No ${0} response from device")]
    NoResponse(MessageType),
}
