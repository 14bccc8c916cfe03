use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::Message;

/// A real-time event pushed by the broker to connected sessions.
///
/// The `id` is a `UUIDv7` so it doubles as the SSE `id` field; the
/// embedded timestamp keeps ids sortable for reconnection bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEvent {
    /// Unique event identifier.
    pub id: String,
    /// When the event was emitted.
    pub timestamp: DateTime<Utc>,
    /// The type-specific payload.
    #[serde(flatten)]
    pub kind: ChatEventKind,
}

/// The type-specific payload of a [`ChatEvent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEventKind {
    /// A message was persisted and is being fanned out to all connected
    /// sessions. Carries the full persisted record, including the
    /// store-assigned id and timestamp.
    MessageDelivered {
        /// The persisted message.
        message: Message,
    },
}

impl ChatEvent {
    /// Wrap a freshly persisted message for broadcast.
    #[must_use]
    pub fn message_delivered(message: Message) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            timestamp: Utc::now(),
            kind: ChatEventKind::MessageDelivered { message },
        }
    }

    /// Return the SSE event type tag for this event.
    #[must_use]
    pub fn type_tag(&self) -> &'static str {
        match self.kind {
            ChatEventKind::MessageDelivered { .. } => "message_delivered",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MessageId, Username};

    fn message() -> Message {
        Message {
            id: MessageId::new("m1"),
            sender_username: Username::new("alice"),
            receiver_username: Username::new("bob"),
            message_text: Some("hi".into()),
            file: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let event = ChatEvent::message_delivered(message());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "message_delivered");
        assert_eq!(json["message"]["senderUsername"], "alice");
        assert!(json["id"].is_string());
    }

    #[test]
    fn event_roundtrip() {
        let event = ChatEvent::message_delivered(message());
        let json = serde_json::to_string(&event).unwrap();
        let back: ChatEvent = serde_json::from_str(&json).unwrap();
        let ChatEventKind::MessageDelivered { message } = back.kind;
        assert_eq!(message.id, MessageId::new("m1"));
    }

    #[test]
    fn event_ids_are_unique() {
        let a = ChatEvent::message_delivered(message());
        let b = ChatEvent::message_delivered(message());
        assert_ne!(a.id, b.id);
        assert_eq!(a.type_tag(), "message_delivered");
    }
}
