//! # Swarm Core Library
//!
//! Host-side protocol stack for Swarm satellite modems (Tile and M138).

//!
//! This library provides:
//! - NMEA-style frame encoding and parsing with XOR checksums
//! - A registry of the device's two-letter message types
//! - Typed codecs for date/time, geospatial, configuration and firmware messages
//! - Raw-mode serial transport over termios
//! - A request/response device session
//!
//! ## Example
//!
//! ```rust,ignore
//! use swarm_core::prelude::*;
//!
//! let mut device = Device::open(&DeviceConfig::for_path("/dev/ttyUSB0"))?;
//! let config: DeviceConfiguration = device
//!     .request(&Frame::query(MessageType::CONFIGURATION))
//!     .await?;
//! println!("{} {}", config.kind, config.id);
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod protocol;
pub mod transport;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::DeviceConfig;
    pub use crate::protocol::messages::{
        DateTimeCommand, DateTimeResponse, DeviceConfiguration, DeviceKind, FirmwareVersion,
        GeospatialCommand, GeospatialResponse,
    };
    pub use crate::protocol::{
        DecodeMessage, Device, DeviceError, EncodeMessage, Frame, Message, MessageType,
    };
    #[cfg(unix)]
    pub use crate::transport::SerialPort;
    pub use crate::transport::{LineSettings, Transport, TransportError};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
