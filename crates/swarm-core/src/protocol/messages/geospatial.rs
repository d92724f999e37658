//! `$GN` geospatial messages

use serde::{Deserialize, Serialize};

use super::{parse_status_body, DecodeMessage, EncodeMessage, StatusBody};
use crate::protocol::MessageType;

/// Position fix reported by the device's GNSS receiver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeospatialInformation {
    /// Degrees, north positive
    pub latitude: f64,
    /// Degrees, east positive
    pub longitude: f64,
    /// Meters
    pub altitude: f64,
    /// Degrees clockwise from north, 0..360
    pub course: f64,
    /// Kilometers per hour
    pub speed: f64,
}

/// Set or query the rate of unsolicited `$GN` reports, or repeat the last one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeospatialCommand {
    /// Repeat the most recent `$GN` report
    Repeat,
    /// Query the current `$GN` rate
    QueryRate,
    /// Set the `$GN` rate in seconds (0 disables)
    SetRate(u32),
}

impl EncodeMessage for GeospatialCommand {
    const MESSAGE_TYPE: MessageType = MessageType::GEOSPATIAL;

    fn encode_body(&self) -> String {
        match self {
            GeospatialCommand::Repeat => "@".to_string(),
            GeospatialCommand::QueryRate => "?".to_string(),
            GeospatialCommand::SetRate(rate) => rate.to_string(),
        }
    }
}

/// Reply to a [`GeospatialCommand`], or an unsolicited `$GN` report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeospatialResponse {
    /// Command accepted
    Ok,
    /// Command rejected
    Error,
    /// Current report rate in seconds
    Rate(u32),
    /// Position fix
    Information(GeospatialInformation),
}

impl DecodeMessage for GeospatialResponse {
    const MESSAGE_TYPE: MessageType = MessageType::GEOSPATIAL;

    fn decode_body(body: &str) -> Option<Self> {
        if let Some(status) = parse_status_body(body) {
            return Some(match status {
                StatusBody::Ok => GeospatialResponse::Ok,
                StatusBody::Error => GeospatialResponse::Error,
                StatusBody::Rate(rate) => GeospatialResponse::Rate(rate),
            });
        }

        let fields = body
            .split(',')
            .map(|field| field.parse::<f64>().ok())
            .collect::<Option<Vec<_>>>()?;
        let &[latitude, longitude, altitude, course, speed] = fields.as_slice() else {
            return None;
        };
        Some(GeospatialResponse::Information(GeospatialInformation {
            latitude,
            longitude,
            altitude,
            course,
            speed,
        }))
    }
}
