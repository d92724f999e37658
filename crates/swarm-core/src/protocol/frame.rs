//! Frame encoding/decoding
//!
//! Frame format (one ASCII line, `\r\n` terminated on the wire):
//!
//! ```text
//! $<type>[ <body>]*<checksum>
//! ```
//!
//! - `<type>`: one or more word characters (`[A-Za-z0-9_]`)
//! - `<body>`: optional, non-empty, no line terminators, runs up to the last `*`
//! - `<checksum>`: XOR of `<type>` plus `" " + <body>` when present, written
//!   as two lowercase hex digits (one or two digits accepted on input)

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use super::{Checksum, FrameError, MessageType};

static FRAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$([A-Za-z0-9_]+)(?: ([^\r\n]+))?\*([0-9A-Fa-f]{1,2})$")
        .expect("frame grammar is a valid regex")
});

/// A single protocol frame
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Frame {
    message_type: MessageType,
    body: Option<String>,
    checksum: Checksum,
}

impl Frame {
    /// Create a frame, computing its checksum.
    ///
    /// A body of `Some("")` is rejected; use `None` for a body-less frame.
    /// Bodies must stay on one line, so `\r` and `\n` are rejected too.
    pub fn new(message_type: MessageType, body: Option<String>) -> Result<Self, FrameError> {
        match body.as_deref() {
            Some("") => return Err(FrameError::EmptyBody),
            Some(text) if text.contains(['\r', '\n']) => {
                return Err(FrameError::InvalidBody(text.to_string()))
            }
            _ => {}
        }
        let checksum = compute_checksum(message_type.as_str(), body.as_deref());
        Ok(Self {
            message_type,
            body,
            checksum,
        })
    }

    /// Create a frame with a body
    pub fn with_body(message_type: MessageType, body: impl Into<String>) -> Result<Self, FrameError> {
        Self::new(message_type, Some(body.into()))
    }

    /// Create a body-less frame, e.g. `$CS*10`
    pub fn query(message_type: MessageType) -> Self {
        let checksum = compute_checksum(message_type.as_str(), None);
        Self {
            message_type,
            body: None,
            checksum,
        }
    }

    /// Parse a frame, verifying its checksum.
    ///
    /// Returns `None` for anything that is not a well-formed frame or whose
    /// checksum does not match; serial links are noisy and callers are
    /// expected to drop such lines and keep reading.
    pub fn parse(text: &str) -> Option<Self> {
        parse_frame(text, true)
    }

    /// Message type code
    pub fn message_type(&self) -> &MessageType {
        &self.message_type
    }

    /// Body text, if any
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Checksum carried by this frame
    pub fn checksum(&self) -> Checksum {
        self.checksum
    }

    /// Length of the serialized frame in bytes (without line terminator)
    pub fn encoded_len(&self) -> usize {
        // "$" + type + [" " + body] + "*" + two hex digits
        1 + self.message_type.as_str().len()
            + self.body.as_ref().map_or(0, |body| body.len() + 1)
            + 3
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        f.write_str(self.message_type.as_str())?;
        if let Some(body) = &self.body {
            write!(f, " {body}")?;
        }
        write!(f, "*{}", self.checksum)
    }
}

impl FromStr for Frame {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| FrameError::Malformed(s.to_string()))
    }
}

/// Serialize a message type and optional body to frame text.
///
/// An empty body is treated as absent.
pub fn serialize(message_type: &str, body: Option<&str>) -> Result<String, FrameError> {
    let message_type = MessageType::new(message_type)?;
    let body = body.filter(|body| !body.is_empty()).map(str::to_string);
    Ok(Frame::new(message_type, body)?.to_string())
}

fn compute_checksum(message_type: &str, body: Option<&str>) -> Checksum {
    let mut covered = String::with_capacity(message_type.len() + body.map_or(0, |b| b.len() + 1));
    covered.push_str(message_type);
    if let Some(body) = body {
        covered.push(' ');
        covered.push_str(body);
    }
    Checksum::compute(covered.as_bytes())
}

fn parse_frame(text: &str, verify_checksum: bool) -> Option<Frame> {
    let captures = FRAME_RE.captures(text)?;
    let message_type = MessageType::new(&captures[1]).ok()?;
    let body = captures.get(2).map(|m| m.as_str().to_string());
    let received = Checksum(u8::from_str_radix(&captures[3], 16).ok()?);

    if verify_checksum {
        let expected = compute_checksum(message_type.as_str(), body.as_deref());
        if expected != received {
            tracing::trace!(
                "checksum mismatch for {:?}: expected {}, got {}",
                text,
                expected,
                received
            );
            return None;
        }
    }

    Some(Frame {
        message_type,
        body,
        checksum: received,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serialize_boot_banner() {
        assert_eq!(
            serialize("M138", Some("BOOT,RUNNING")).unwrap(),
            "$M138 BOOT,RUNNING*2a"
        );
    }

    #[test]
    fn test_serialize_without_body() {
        assert_eq!(serialize("CS", None).unwrap(), "$CS*10");
        assert_eq!(serialize("FV", Some("")).unwrap(), "$FV*10");
    }

    #[test]
    fn test_serialize_rejects_bad_type() {
        assert_eq!(
            serialize("C S", None),
            Err(FrameError::InvalidType("C S".to_string()))
        );
        assert!(serialize("CS*", Some("x")).is_err());
    }

    #[test]
    fn test_empty_body_is_construction_error() {
        assert_eq!(
            Frame::new(MessageType::DATE_TIME, Some(String::new())),
            Err(FrameError::EmptyBody)
        );
    }

    #[test]
    fn test_line_terminator_in_body_is_construction_error() {
        for body in ["a\r\nb", "a\nb", "OK\r"] {
            assert_eq!(
                Frame::with_body(MessageType::TRANSMIT_DATA, body),
                Err(FrameError::InvalidBody(body.to_string()))
            );
        }
        assert_eq!(
            serialize("TD", Some("a\r\nb")),
            Err(FrameError::InvalidBody("a\r\nb".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_carriage_return_in_body() {
        let text = format!("$TD a\rb*{}", compute_checksum("TD", Some("a\rb")));
        assert_eq!(Frame::parse(&text), None);
    }

    #[test]
    fn test_parse_fields() {
        let frame = Frame::parse("$DT 20190408195123,V*41").unwrap();
        assert_eq!(frame.message_type(), &MessageType::DATE_TIME);
        assert_eq!(frame.body(), Some("20190408195123,V"));
        assert_eq!(frame.checksum(), Checksum(0x41));
    }

    #[test]
    fn test_parse_body_less() {
        let frame = Frame::parse("$CS*10").unwrap();
        assert_eq!(frame, Frame::query(MessageType::CONFIGURATION));
        assert_eq!(frame.body(), None);
    }

    #[test]
    fn test_parse_single_digit_checksum() {
        let frame = Frame::parse("$DT 300*3").unwrap();
        assert_eq!(frame.to_string(), "$DT 300*03");
    }

    #[test]
    fn test_parse_uppercase_checksum() {
        assert!(Frame::parse("$M138 BOOT,RUNNING*2A").is_some());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for text in [
            "",
            "$",
            "DT 300*03",
            "$DT 300",
            "$DT 300*",
            "$DT 300*003",
            "$DT *75",
            "$DT 300*03\r",
            " $DT 300*03",
            "$D-T 300*03",
            "$DT 300*zz",
        ] {
            assert_eq!(Frame::parse(text), None, "{text:?} should not parse");
        }
    }

    #[test]
    fn test_body_runs_to_last_star() {
        let frame = Frame::with_body(MessageType::TRANSMIT_DATA, "a*b").unwrap();
        let text = frame.to_string();
        let parsed = Frame::parse(&text).unwrap();
        assert_eq!(parsed.body(), Some("a*b"));
    }

    #[test]
    fn test_checksum_mismatch_rejected() {
        assert_eq!(Frame::parse("$DT 20190408195123,V*42"), None);
    }

    #[test]
    fn test_unverified_parse_keeps_received_checksum() {
        let frame = parse_frame("$DT 20190408195123,V*42", false).unwrap();
        assert_eq!(frame.checksum(), Checksum(0x42));
        assert_eq!(frame.body(), Some("20190408195123,V"));
    }

    #[test]
    fn test_encoded_len_matches_display() {
        for frame in [
            Frame::query(MessageType::FIRMWARE_VERSION),
            Frame::with_body(MessageType::GEOSPATIAL, "37.8921,-122.0155,77,89,2").unwrap(),
        ] {
            assert_eq!(frame.encoded_len(), frame.to_string().len());
        }
    }

    #[test]
    fn test_from_str() {
        let frame: Frame = "$GN 30*2a".parse().unwrap();
        assert_eq!(frame.body(), Some("30"));
        assert!(matches!(
            "$GN 30*2b".parse::<Frame>(),
            Err(FrameError::Malformed(_))
        ));
    }
}
