//! Typed messages
//!
//! Each message kind is bound to one [`MessageType`] and knows how to turn a
//! frame body into a typed value (and back, for commands). Implement
//! [`EncodeMessage`] / [`DecodeMessage`] for your own types to support
//! message kinds this crate does not cover.

mod configuration;
mod date_time;
mod firmware;
mod geospatial;

pub use configuration::{DeviceConfiguration, DeviceId, DeviceKind};
pub use date_time::{DateTimeCommand, DateTimeResponse, Validity};
pub use firmware::FirmwareVersion;
pub use geospatial::{GeospatialCommand, GeospatialInformation, GeospatialResponse};

use serde::Serialize;

use super::{Frame, FrameError, MessageType};

/// A message that can be sent to the device
pub trait EncodeMessage {
    /// Type code frames of this kind are sent under
    const MESSAGE_TYPE: MessageType;

    /// Encode the frame body
    fn encode_body(&self) -> String;

    /// Build the complete frame
    fn to_frame(&self) -> Result<Frame, FrameError> {
        Frame::with_body(Self::MESSAGE_TYPE, self.encode_body())
    }
}

/// A message that can be received from the device
pub trait DecodeMessage: Sized {
    /// Type code frames of this kind arrive under
    const MESSAGE_TYPE: MessageType;

    /// Decode a frame body, `None` if it does not match this kind's grammar
    fn decode_body(body: &str) -> Option<Self>;

    /// Decode a whole frame. The frame must carry this kind's type code and a body.
    fn from_frame(frame: &Frame) -> Option<Self> {
        if *frame.message_type() != Self::MESSAGE_TYPE {
            return None;
        }
        frame.body().and_then(Self::decode_body)
    }
}

/// Any inbound message, decoded when its type is known
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Message {
    /// `$DT` report or reply
    DateTime(DateTimeResponse),
    /// `$GN` report or reply
    Geospatial(GeospatialResponse),
    /// `$CS` reply
    Configuration(DeviceConfiguration),
    /// `$FV` reply
    FirmwareVersion(FirmwareVersion),
    /// Unknown type, or a known type whose body did not decode
    Other(Frame),
}

impl Message {
    /// Decode a frame into the matching typed message
    pub fn decode(frame: &Frame) -> Self {
        // from_frame checks the type code, so at most one of these matches
        DateTimeResponse::from_frame(frame)
            .map(Message::DateTime)
            .or_else(|| GeospatialResponse::from_frame(frame).map(Message::Geospatial))
            .or_else(|| DeviceConfiguration::from_frame(frame).map(Message::Configuration))
            .or_else(|| FirmwareVersion::from_frame(frame).map(Message::FirmwareVersion))
            .unwrap_or_else(|| Message::Other(frame.clone()))
    }

    /// Type code of the underlying frame
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::DateTime(_) => MessageType::DATE_TIME,
            Message::Geospatial(_) => MessageType::GEOSPATIAL,
            Message::Configuration(_) => MessageType::CONFIGURATION,
            Message::FirmwareVersion(_) => MessageType::FIRMWARE_VERSION,
            Message::Other(frame) => frame.message_type().clone(),
        }
    }
}

/// Leading alternatives shared by rate-style responses
pub(crate) enum StatusBody {
    Ok,
    Error,
    Rate(u32),
}

pub(crate) fn parse_status_body(body: &str) -> Option<StatusBody> {
    match body {
        "OK" => Some(StatusBody::Ok),
        "ERR" => Some(StatusBody::Error),
        _ => parse_u32(body).map(StatusBody::Rate),
    }
}

/// Plain decimal `u32`, no sign
fn parse_u32(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
