use crate::identity::Mrn;
use crate::protocol::error::{FrameError, FrameResult};
use crate::protocol::types::{MessageType, Priority};
use serde::Deserialize;
use serde_json::Value;

/// Shape accepted off the wire before validation
///
/// Scalar fields stay untyped so a wrong JSON type is reported against the
/// field that carried it.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: Option<Value>,
    recipient_mrn: Option<Value>,
    message_type: Option<Value>,
    priority: Option<Value>,
    subject: Option<Value>,
    body: Option<Value>,
    metadata: Option<Value>,
    /// Client clock; informational only, the relay stamps its own time
    #[allow(dead_code)]
    timestamp: Option<Value>,
}

impl RawFrame {
    fn has_message_fields(&self) -> bool {
        self.recipient_mrn.is_some()
            || self.message_type.is_some()
            || self.priority.is_some()
            || self.subject.is_some()
            || self.body.is_some()
            || self.metadata.is_some()
    }
}

fn string_field(field: &'static str, value: Option<Value>) -> FrameResult<Option<String>> {
    match value {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(FrameError::InvalidField {
            field,
            reason: format!("expected a string, got {other}"),
        }),
    }
}

/// A validated message submission
#[derive(Debug, Clone, PartialEq)]
pub struct MessageFrame {
    pub recipient: Mrn,
    pub message_type: MessageType,
    pub priority: Priority,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl MessageFrame {
    pub fn new(recipient: Mrn, message_type: MessageType) -> Self {
        Self {
            recipient,
            message_type,
            priority: Priority::default(),
            subject: None,
            body: None,
            metadata: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Client to server frames
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    Ping,
    Message(MessageFrame),
}

impl InboundFrame {
    /// Decode and validate one text frame
    pub fn decode(text: &str) -> FrameResult<Self> {
        let mut raw: RawFrame =
            serde_json::from_str(text).map_err(|e| FrameError::Syntax(e.to_string()))?;
        let kind = string_field("type", raw.kind.take())?;

        match kind.as_deref() {
            Some("ping") if !raw.has_message_fields() => Ok(InboundFrame::Ping),
            Some("ping") => Err(FrameError::InvalidField {
                field: "type",
                reason: "ping frames carry no message fields".into(),
            }),
            None | Some("message") => Self::decode_message(raw).map(InboundFrame::Message),
            Some(other) => Err(FrameError::UnsupportedType(other.to_string())),
        }
    }

    fn decode_message(raw: RawFrame) -> FrameResult<MessageFrame> {
        let recipient_mrn = string_field("recipient_mrn", raw.recipient_mrn)?;
        let message_type = string_field("message_type", raw.message_type)?;
        let priority = string_field("priority", raw.priority)?;
        let subject = string_field("subject", raw.subject)?;
        let body = string_field("body", raw.body)?;

        let recipient = match recipient_mrn.as_deref().map(str::trim) {
            None | Some("") => return Err(FrameError::MissingField("recipient_mrn")),
            Some(value) => Mrn::parse(value).map_err(|e| FrameError::InvalidField {
                field: "recipient_mrn",
                reason: e.to_string(),
            })?,
        };

        let message_type = match message_type.as_deref() {
            None | Some("") => return Err(FrameError::MissingField("message_type")),
            Some(value) => value
                .parse::<MessageType>()
                .map_err(|reason| FrameError::InvalidField {
                    field: "message_type",
                    reason,
                })?,
        };

        let priority = match priority.as_deref() {
            None => Priority::default(),
            Some(value) => value
                .parse::<Priority>()
                .map_err(|reason| FrameError::InvalidField {
                    field: "priority",
                    reason,
                })?,
        };

        if let Some(metadata) = &raw.metadata {
            if !metadata.is_object() {
                return Err(FrameError::InvalidField {
                    field: "metadata",
                    reason: "expected an object".into(),
                });
            }
        }

        Ok(MessageFrame {
            recipient,
            message_type,
            priority,
            subject,
            body,
            metadata: raw.metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ping() {
        assert_eq!(
            InboundFrame::decode(r#"{"type":"ping"}"#).unwrap(),
            InboundFrame::Ping
        );
    }

    #[test]
    fn test_decode_full_message() {
        let frame = InboundFrame::decode(
            r#"{
                "recipient_mrn": "urn:mrn:mcp:shore:authority:vts:tokyo-bay",
                "message_type": "position_report",
                "priority": "high",
                "subject": "Position",
                "body": "35.6762N 139.6503E",
                "metadata": {"speed_knots": 12.5},
                "timestamp": "2024-01-01T00:00:00"
            }"#,
        )
        .unwrap();

        let InboundFrame::Message(msg) = frame else {
            panic!("Expected message frame");
        };
        assert_eq!(
            msg.recipient.as_str(),
            "urn:mrn:mcp:shore:authority:vts:tokyo-bay"
        );
        assert_eq!(msg.message_type, MessageType::PositionReport);
        assert_eq!(msg.priority, Priority::High);
        assert_eq!(msg.subject.as_deref(), Some("Position"));
        assert_eq!(msg.metadata.unwrap()["speed_knots"], 12.5);
    }

    #[test]
    fn test_missing_recipient_names_field() {
        let err = InboundFrame::decode(r#"{"message_type":"text","body":"hi"}"#).unwrap_err();
        assert_eq!(err, FrameError::MissingField("recipient_mrn"));
        assert!(err.to_string().contains("recipient_mrn"));
    }

    #[test]
    fn test_missing_message_type_names_field() {
        let err = InboundFrame::decode(r#"{"recipient_mrn":"urn:mrn:mcp:vessel:imo:1"}"#)
            .unwrap_err();
        assert_eq!(err.field(), Some("message_type"));
    }

    #[test]
    fn test_invalid_values() {
        let err = InboundFrame::decode(r#"{"recipient_mrn":"bob","message_type":"text"}"#)
            .unwrap_err();
        assert_eq!(err.field(), Some("recipient_mrn"));

        let err = InboundFrame::decode(
            r#"{"recipient_mrn":"urn:mrn:mcp:vessel:imo:1","message_type":"telex"}"#,
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("message_type"));

        let err = InboundFrame::decode(
            r#"{"recipient_mrn":"urn:mrn:mcp:vessel:imo:1","message_type":"text","metadata":[1]}"#,
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("metadata"));
    }

    #[test]
    fn test_wrong_json_types_name_the_field() {
        let cases = [
            (r#"{"recipient_mrn":12345,"message_type":"text"}"#, "recipient_mrn"),
            (r#"{"recipient_mrn":"urn:mrn:mcp:vessel:imo:1","message_type":7}"#, "message_type"),
            (
                r#"{"recipient_mrn":"urn:mrn:mcp:vessel:imo:1","message_type":"text","priority":2}"#,
                "priority",
            ),
            (
                r#"{"recipient_mrn":"urn:mrn:mcp:vessel:imo:1","message_type":"text","subject":{"a":1}}"#,
                "subject",
            ),
            (
                r#"{"recipient_mrn":"urn:mrn:mcp:vessel:imo:1","message_type":"text","body":["x"]}"#,
                "body",
            ),
            (r#"{"type":1}"#, "type"),
        ];

        for (text, field) in cases {
            let err = InboundFrame::decode(text).unwrap_err();
            assert_eq!(err.field(), Some(field), "{text}");
            assert!(err.to_string().contains(field), "{err}");
            assert!(err.to_string().contains("expected a string"), "{err}");
        }
    }

    #[test]
    fn test_null_fields_count_as_absent() {
        let frame = InboundFrame::decode(
            r#"{"recipient_mrn":"urn:mrn:mcp:vessel:imo:1","message_type":"text","subject":null}"#,
        )
        .unwrap();
        let InboundFrame::Message(msg) = frame else {
            panic!("Expected message frame");
        };
        assert_eq!(msg.subject, None);
    }

    #[test]
    fn test_unknown_shapes_rejected() {
        let err = InboundFrame::decode(r#"{"type":"connection_status","status":"connected"}"#)
            .unwrap_err();
        assert!(matches!(err, FrameError::Syntax(_)));

        let err = InboundFrame::decode(r#"{"type":"subscribe"}"#).unwrap_err();
        assert_eq!(err, FrameError::UnsupportedType("subscribe".into()));

        let err = InboundFrame::decode(
            r#"{"recipient_mrn":"urn:mrn:mcp:vessel:imo:1","message_type":"text","sender_mrn":"urn:mrn:mcp:vessel:imo:2"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("sender_mrn"));

        assert!(matches!(
            InboundFrame::decode("not json").unwrap_err(),
            FrameError::Syntax(_)
        ));
    }
}
