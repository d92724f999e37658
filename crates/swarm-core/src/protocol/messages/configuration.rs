//! `$CS` device configuration

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use super::DecodeMessage;
use crate::protocol::MessageType;

static CONFIGURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^DI=0x([0-9A-Fa-f]+),DN=([A-Za-z0-9_]+)$")
        .expect("configuration grammar is a valid regex")
});

/// Identifier of a device on the Swarm network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:06x}", self.0)
    }
}

impl From<u32> for DeviceId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Hardware family reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    /// Swarm Tile
    #[serde(rename = "TILE")]
    Tile,
    /// M138 modem / asset tracker
    #[serde(rename = "M138")]
    M138,
}

impl DeviceKind {
    /// Name as it appears in `DN=` fields
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Tile => "TILE",
            DeviceKind::M138 => "M138",
        }
    }

    /// Type code of the boot and status banners this device emits
    pub fn boot_message_type(&self) -> MessageType {
        match self {
            DeviceKind::Tile => MessageType::TILE,
            DeviceKind::M138 => MessageType::M138,
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TILE" => Ok(DeviceKind::Tile),
            "M138" => Ok(DeviceKind::M138),
            other => Err(format!("unknown device kind '{other}'")),
        }
    }
}

/// Reply to `$CS`: the identity assigned to this device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceConfiguration {
    /// Network device ID (`DI=`)
    pub id: DeviceId,
    /// Hardware family (`DN=`)
    pub kind: DeviceKind,
}

impl DecodeMessage for DeviceConfiguration {
    const MESSAGE_TYPE: MessageType = MessageType::CONFIGURATION;

    fn decode_body(body: &str) -> Option<Self> {
        let captures = CONFIGURATION_RE.captures(body)?;
        let id = u32::from_str_radix(&captures[1], 16).ok()?;
        let kind = captures[2].parse().ok()?;
        Some(Self {
            id: DeviceId(id),
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Frame;

    #[test]
    fn test_decode_m138() {
        let config = DeviceConfiguration::decode_body("DI=0x006c0e,DN=M138").unwrap();
        assert_eq!(config.id, DeviceId(0x006c0e));
        assert_eq!(config.kind, DeviceKind::M138);
    }

    #[test]
    fn test_decode_from_frame() {
        let frame = Frame::parse("$CS DI=0x006c0e,DN=M138*24").unwrap();
        let config = DeviceConfiguration::from_frame(&frame).unwrap();
        assert_eq!(config.kind, DeviceKind::M138);
    }

    #[test]
    fn test_unknown_kind_fails() {
        assert_eq!(DeviceConfiguration::decode_body("DI=0x006c0e,DN=FOO"), None);
    }

    #[test]
    fn test_malformed_bodies_fail() {
        for body in [
            "DI=006c0e,DN=TILE",
            "DI=0x,DN=TILE",
            "DI=0xZZ,DN=TILE",
            "DI=0x1ffffffff,DN=TILE",
            "DI=0x006c0e,DN=",
            "DI=0x006c0e DN=TILE",
            "DI=0x006c0e,DN=TILE,extra",
        ] {
            assert_eq!(DeviceConfiguration::decode_body(body), None, "{body:?}");
        }
    }

    #[test]
    fn test_device_id_display() {
        assert_eq!(DeviceId(0x000e57).to_string(), "0x000e57");
        assert_eq!(DeviceId(0x12345678).to_string(), "0x12345678");
    }

    #[test]
    fn test_boot_message_type() {
        assert_eq!(DeviceKind::Tile.boot_message_type(), MessageType::TILE);
        assert_eq!(DeviceKind::M138.boot_message_type().as_str(), "M138");
    }
}
