//! `$DT` date/time messages

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{parse_status_body, DecodeMessage, EncodeMessage, StatusBody};
use crate::protocol::MessageType;

const DATE_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Set or query the rate of unsolicited `$DT` reports, or repeat the last one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateTimeCommand {
    /// Repeat the most recent `$DT` report
    Repeat,
    /// Query the current `$DT` rate
    QueryRate,
    /// Set the `$DT` rate in seconds (0 disables)
    SetRate(u32),
}

impl EncodeMessage for DateTimeCommand {
    const MESSAGE_TYPE: MessageType = MessageType::DATE_TIME;

    fn encode_body(&self) -> String {
        match self {
            DateTimeCommand::Repeat => "@".to_string(),
            DateTimeCommand::QueryRate => "?".to_string(),
            DateTimeCommand::SetRate(rate) => rate.to_string(),
        }
    }
}

/// Whether the device considers a reported time trustworthy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validity {
    /// `V`
    Valid,
    /// `I`
    Invalid,
}

impl Validity {
    fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "V" => Some(Validity::Valid),
            "I" => Some(Validity::Invalid),
            _ => None,
        }
    }
}

/// Reply to a [`DateTimeCommand`], or an unsolicited `$DT` report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateTimeResponse {
    /// Command accepted
    Ok,
    /// Command rejected
    Error,
    /// Current report rate in seconds
    Rate(u32),
    /// Reported time and whether it is trustworthy
    DateTime(DateTime<Utc>, Validity),
}

impl DecodeMessage for DateTimeResponse {
    const MESSAGE_TYPE: MessageType = MessageType::DATE_TIME;

    fn decode_body(body: &str) -> Option<Self> {
        if let Some(status) = parse_status_body(body) {
            return Some(match status {
                StatusBody::Ok => DateTimeResponse::Ok,
                StatusBody::Error => DateTimeResponse::Error,
                StatusBody::Rate(rate) => DateTimeResponse::Rate(rate),
            });
        }

        let mut fields = body.split(',');
        let (Some(timestamp), Some(flag), None) = (fields.next(), fields.next(), fields.next())
        else {
            return None;
        };
        Some(DateTimeResponse::DateTime(
            parse_timestamp(timestamp)?,
            Validity::from_flag(flag)?,
        ))
    }
}

/// `yyyyMMddHHmmss`, UTC, exactly fourteen digits
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if text.len() != 14 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDateTime::parse_from_str(text, DATE_TIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_command_bodies() {
        assert_eq!(DateTimeCommand::Repeat.encode_body(), "@");
        assert_eq!(DateTimeCommand::QueryRate.encode_body(), "?");
        assert_eq!(DateTimeCommand::SetRate(60).encode_body(), "60");
    }

    #[test]
    fn test_command_frames() {
        assert_eq!(DateTimeCommand::Repeat.to_frame().unwrap().to_string(), "$DT @*70");
        assert_eq!(DateTimeCommand::QueryRate.to_frame().unwrap().to_string(), "$DT ?*0f");
        assert_eq!(DateTimeCommand::SetRate(300).to_frame().unwrap().to_string(), "$DT 300*03");
    }

    #[test]
    fn test_decode_table() {
        assert_eq!(DateTimeResponse::decode_body("OK"), Some(DateTimeResponse::Ok));
        assert_eq!(DateTimeResponse::decode_body("ERR"), Some(DateTimeResponse::Error));
        assert_eq!(DateTimeResponse::decode_body("300"), Some(DateTimeResponse::Rate(300)));
        assert_eq!(
            DateTimeResponse::decode_body("20190408195123,V"),
            Some(DateTimeResponse::DateTime(
                Utc.with_ymd_and_hms(2019, 4, 8, 19, 51, 23).unwrap(),
                Validity::Valid
            ))
        );
        assert_eq!(
            DateTimeResponse::decode_body("20190408195123,I"),
            Some(DateTimeResponse::DateTime(
                Utc.with_ymd_and_hms(2019, 4, 8, 19, 51, 23).unwrap(),
                Validity::Invalid
            ))
        );
    }

    #[test]
    fn test_decode_rejects_other_shapes() {
        for body in [
            "ok",
            "20190408195123",
            "20190408195123,X",
            "20190408195123,V,1",
            "2019040819512,V",
            "201904081951230,V",
            "20191308195123,V",
            "2019-04-08 19:51,V",
            "",
        ] {
            assert_eq!(DateTimeResponse::decode_body(body), None, "{body:?}");
        }
    }
}
