//! Serial Protocol Communication
//!
//! Implements the Swarm device UART protocol: `$`-prefixed ASCII frames with
//! an 8-bit XOR checksum, typed message bodies, and a device session that
//! sends commands and reads replies over a [`Transport`](crate::transport::Transport).

mod checksum;
mod device;
mod error;
mod frame;
mod message_type;
pub mod messages;

pub use checksum::{checksum, Checksum};
pub use device::Device;
pub use error::{DeviceError, FrameError};
pub use frame::{serialize, Frame};
pub use message_type::MessageType;
pub use messages::{DecodeMessage, EncodeMessage, Message};

/// Default baud rate for Swarm devices
pub const DEFAULT_BAUD_RATE: u32 = 115200;

/// Default time to wait for a reply to a command, in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Unrelated frames tolerated while waiting for a reply
pub const MAX_INTERLEAVED_FRAMES: usize = 16;

/// Line terminator appended to every outgoing frame
pub const LINE_TERMINATOR: &[u8] = b"\r\n";
