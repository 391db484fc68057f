use crate::identity::Mrn;
use crate::protocol::{DeliveredMessage, MessageFrame, MessageType, Priority};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

const DEFAULT_SUBJECT: &str = "No Subject";

/// A submitted message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    #[serde(rename = "message_id")]
    pub id: Uuid,
    #[serde(rename = "sender_mrn")]
    pub sender: Mrn,
    #[serde(rename = "recipient_mrn")]
    pub recipient: Mrn,
    pub message_type: MessageType,
    pub priority: Priority,
    pub subject: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(rename = "timestamp")]
    pub submitted_at: DateTime<Utc>,
}

impl Message {
    /// Build a message from a validated frame, stamping the sender
    pub fn from_frame(sender: Mrn, frame: MessageFrame) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            recipient: frame.recipient,
            message_type: frame.message_type,
            priority: frame.priority,
            subject: frame.subject.unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            body: frame.body.unwrap_or_default(),
            metadata: frame.metadata,
            submitted_at: Utc::now(),
        }
    }

    /// Envelope forwarded to a connected recipient
    pub fn envelope(&self) -> DeliveredMessage {
        DeliveredMessage {
            message_id: self.id,
            sender_mrn: self.sender.to_string(),
            recipient_mrn: self.recipient.to_string(),
            message_type: self.message_type,
            priority: self.priority,
            subject: self.subject.clone(),
            body: self.body.clone(),
            metadata: self.metadata.clone(),
            timestamp: self.submitted_at,
        }
    }
}

/// Sender/recipient filter for listing
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    pub sender: Option<Mrn>,
    pub recipient: Option<Mrn>,
}

impl MessageFilter {
    pub fn sender(mut self, mrn: Mrn) -> Self {
        self.sender = Some(mrn);
        self
    }

    pub fn recipient(mut self, mrn: Mrn) -> Self {
        self.recipient = Some(mrn);
        self
    }

    pub fn matches(&self, message: &Message) -> bool {
        self.sender.as_ref().map_or(true, |s| *s == message.sender)
            && self.recipient.as_ref().map_or(true, |r| *r == message.recipient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mrn(s: &str) -> Mrn {
        Mrn::parse(s).unwrap()
    }

    #[test]
    fn test_from_frame_defaults() {
        let frame = MessageFrame::new(mrn("urn:mrn:mcp:shore:port:yokohama"), MessageType::Text);
        let message = Message::from_frame(mrn("urn:mrn:mcp:vessel:imo:1234567"), frame);

        assert_eq!(message.subject, "No Subject");
        assert_eq!(message.body, "");
        assert_eq!(message.priority, Priority::Normal);
        assert_eq!(message.sender.as_str(), "urn:mrn:mcp:vessel:imo:1234567");
    }

    #[test]
    fn test_envelope_carries_sender() {
        let frame = MessageFrame::new(mrn("urn:mrn:mcp:shore:port:yokohama"), MessageType::Safety)
            .with_subject("Navigational warning")
            .with_body("Buoy 7 unlit");
        let message = Message::from_frame(mrn("urn:mrn:mcp:vessel:imo:1234567"), frame);
        let envelope = message.envelope();

        assert_eq!(envelope.message_id, message.id);
        assert_eq!(envelope.sender_mrn, "urn:mrn:mcp:vessel:imo:1234567");
        assert_eq!(envelope.subject, "Navigational warning");
    }

    #[test]
    fn test_serialized_field_names() {
        let frame = MessageFrame::new(mrn("urn:mrn:mcp:shore:port:yokohama"), MessageType::Text);
        let message = Message::from_frame(mrn("urn:mrn:mcp:vessel:imo:1234567"), frame);
        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(value["message_id"], message.id.to_string());
        assert_eq!(value["recipient_mrn"], "urn:mrn:mcp:shore:port:yokohama");
        assert!(value.get("metadata").is_none());
    }

    #[test]
    fn test_filter() {
        let frame = MessageFrame::new(mrn("urn:mrn:mcp:shore:port:yokohama"), MessageType::Text);
        let message = Message::from_frame(mrn("urn:mrn:mcp:vessel:imo:1234567"), frame);

        assert!(MessageFilter::default().matches(&message));
        assert!(MessageFilter::default()
            .recipient(mrn("urn:mrn:mcp:shore:port:yokohama"))
            .matches(&message));
        assert!(!MessageFilter::default()
            .sender(mrn("urn:mrn:mcp:shore:port:yokohama"))
            .matches(&message));
    }
}
