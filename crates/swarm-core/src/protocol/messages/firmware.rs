//! `$FV` firmware version

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DecodeMessage, EncodeMessage};
use crate::protocol::MessageType;

const BUILD_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Firmware build date and version string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FirmwareVersion {
    /// Build timestamp
    pub date: DateTime<Utc>,
    /// Opaque version text as reported, e.g. `v3.0.1`
    pub version: String,
}

impl DecodeMessage for FirmwareVersion {
    const MESSAGE_TYPE: MessageType = MessageType::FIRMWARE_VERSION;

    fn decode_body(body: &str) -> Option<Self> {
        let (date, version) = body.split_once(',')?;
        let date = NaiveDateTime::parse_from_str(date, BUILD_DATE_FORMAT)
            .ok()?
            .and_utc();
        Some(Self {
            date,
            version: version.to_string(),
        })
    }
}

impl EncodeMessage for FirmwareVersion {
    const MESSAGE_TYPE: MessageType = MessageType::FIRMWARE_VERSION;

    fn encode_body(&self) -> String {
        format!("{},{}", self.date.format(BUILD_DATE_FORMAT), self.version)
    }
}
