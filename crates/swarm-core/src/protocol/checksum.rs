//! Frame checksum
//!
//! Every frame carries an 8-bit XOR of the bytes between `$` and `*`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 8-bit XOR checksum of a frame's type and body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checksum(pub u8);

impl Checksum {
    /// XOR-fold every byte of `bytes`
    pub fn compute(bytes: &[u8]) -> Self {
        Self(checksum(bytes))
    }

    /// Raw checksum value
    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<u8> for Checksum {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl fmt::Display for Checksum {
    /// Two lowercase hex digits, as written on the wire
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}", self.0)
    }
}

impl fmt::LowerHex for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// XOR of every byte in `bytes`; 0 for the empty slice.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, byte| acc ^ byte)
}
