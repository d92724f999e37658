//! Message types
//!
//! The short code after `$` that selects what a frame means. Codes form an
//! open space: anything made of word characters is a valid type, and the
//! constants below only name the ones this crate knows about. Frames with
//! unknown codes still parse and serialize unchanged.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use super::FrameError;

/// Message type code, e.g. `DT` or `M138`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageType(Cow<'static, str>);

impl MessageType {
    /// Configuration settings (`$CS`)
    pub const CONFIGURATION: Self = Self::from_static("CS");
    /// Date/time status (`$DT`)
    pub const DATE_TIME: Self = Self::from_static("DT");
    /// Firmware version (`$FV`)
    pub const FIRMWARE_VERSION: Self = Self::from_static("FV");
    /// GPS jamming/spoofing indication (`$GJ`)
    pub const GPS_JAMMING: Self = Self::from_static("GJ");
    /// Geospatial information (`$GN`)
    pub const GEOSPATIAL: Self = Self::from_static("GN");
    /// GPIO1 control (`$GP`)
    pub const GPIO1: Self = Self::from_static("GP");
    /// GPS fix quality (`$GS`)
    pub const GPS_FIX_QUALITY: Self = Self::from_static("GS");
    /// Messages received management (`$MM`)
    pub const MESSAGES_RECEIVED: Self = Self::from_static("MM");
    /// Messages to transmit management (`$MT`)
    pub const MESSAGES_TO_TRANSMIT: Self = Self::from_static("MT");
    /// Power off (`$PO`)
    pub const POWER_OFF: Self = Self::from_static("PO");
    /// Power status (`$PW`)
    pub const POWER_STATUS: Self = Self::from_static("PW");
    /// Restart device (`$RS`)
    pub const RESTART: Self = Self::from_static("RS");
    /// Receive test (`$RT`)
    pub const RECEIVE_TEST: Self = Self::from_static("RT");
    /// Sleep mode (`$SL`)
    pub const SLEEP_MODE: Self = Self::from_static("SL");
    /// Transmit data (`$TD`)
    pub const TRANSMIT_DATA: Self = Self::from_static("TD");
    /// Receive data (`$RD`)
    pub const RECEIVE_DATA: Self = Self::from_static("RD");
    /// Boot and status banner from a Tile (`$TILE`)
    pub const TILE: Self = Self::from_static("TILE");
    /// Boot and status banner from an M138 modem (`$M138`)
    pub const M138: Self = Self::from_static("M138");

    /// Well-known operation names and their codes
    pub const WELL_KNOWN: [(&'static str, MessageType); 18] = [
        ("configuration", Self::CONFIGURATION),
        ("date-time", Self::DATE_TIME),
        ("firmware-version", Self::FIRMWARE_VERSION),
        ("gps-jamming", Self::GPS_JAMMING),
        ("geospatial", Self::GEOSPATIAL),
        ("gpio1", Self::GPIO1),
        ("gps-fix-quality", Self::GPS_FIX_QUALITY),
        ("messages-received", Self::MESSAGES_RECEIVED),
        ("messages-to-transmit", Self::MESSAGES_TO_TRANSMIT),
        ("power-off", Self::POWER_OFF),
        ("power-status", Self::POWER_STATUS),
        ("restart", Self::RESTART),
        ("receive-test", Self::RECEIVE_TEST),
        ("sleep-mode", Self::SLEEP_MODE),
        ("transmit-data", Self::TRANSMIT_DATA),
        ("receive-data", Self::RECEIVE_DATA),
        ("tile", Self::TILE),
        ("m138", Self::M138),
    ];

    /// Build a message type from a code known at compile time.
    ///
    /// Panics (at compile time when used in a `const`) if the code is empty
    /// or contains anything other than ASCII letters, digits and `_`.
    pub const fn from_static(code: &'static str) -> Self {
        assert!(is_valid_code(code.as_bytes()), "invalid message type code");
        Self(Cow::Borrowed(code))
    }

    /// Build a message type from a runtime string
    pub fn new(code: impl Into<String>) -> Result<Self, FrameError> {
        let code = code.into();
        if is_valid_code(code.as_bytes()) {
            Ok(Self(Cow::Owned(code)))
        } else {
            Err(FrameError::InvalidType(code))
        }
    }

    /// The code as it appears on the wire
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Operation name if this is one of the well-known codes
    pub fn well_known_name(&self) -> Option<&'static str> {
        Self::WELL_KNOWN
            .iter()
            .find(|(_, code)| code == self)
            .map(|(name, _)| *name)
    }

    /// Look up a well-known code by operation name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::WELL_KNOWN
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, code)| code.clone())
    }

    /// Whether this code appears in [`MessageType::WELL_KNOWN`]
    pub fn is_well_known(&self) -> bool {
        self.well_known_name().is_some()
    }
}

const fn is_valid_code(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if !(b.is_ascii_alphanumeric() || b == b'_') {
            return false;
        }
        i += 1;
    }
    true
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MessageType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for MessageType {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for MessageType {
    type Error = FrameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MessageType> for String {
    fn from(value: MessageType) -> Self {
        value.0.into_owned()
    }
}
