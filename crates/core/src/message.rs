use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{MessageId, Username};

/// File attachment metadata carried by a [`Message`].
///
/// The binary content lives in the blob store; a message only references
/// it by URL. Immutable once set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Public URL the file can be fetched from.
    pub url: String,

    /// Original filename as uploaded.
    pub name: String,

    /// MIME content type (e.g. `"image/png"`).
    #[serde(rename = "type")]
    pub content_type: String,

    /// Size in bytes.
    #[serde(rename = "size")]
    pub size_bytes: u64,
}

/// A persisted direct message between two users.
///
/// `id` and `timestamp` are assigned by the message store at persist
/// time; a `Message` is never observable without them. Persisted
/// messages are immutable and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", schema(example = json!({
    "id": "0198c5b4-1111-7000-8000-000000000000",
    "senderUsername": "alice",
    "receiverUsername": "bob",
    "messageText": "hi",
    "file": null,
    "timestamp": "2026-01-01T00:00:00Z"
})))]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Store-assigned unique identifier, used for client-side dedup.
    pub id: MessageId,

    /// Who sent the message.
    pub sender_username: Username,

    /// Who the message is addressed to.
    pub receiver_username: Username,

    /// Text content. Absent for attachment-only messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_text: Option<String>,

    /// Optional file attachment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<Attachment>,

    /// Store-assigned creation time, monotonically non-decreasing in
    /// insertion order.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Return `true` if this message belongs to the conversation between
    /// `a` and `b`, matching the `{sender, receiver}` pair in either order.
    #[must_use]
    pub fn is_between(&self, a: &Username, b: &Username) -> bool {
        (self.sender_username == *a && self.receiver_username == *b)
            || (self.sender_username == *b && self.receiver_username == *a)
    }

    /// Return `true` if the user is the sender or the receiver.
    #[must_use]
    pub fn involves(&self, user: &Username) -> bool {
        self.sender_username == *user || self.receiver_username == *user
    }
}

/// A message as submitted by a client, before the store assigns an id
/// and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MessageDraft {
    /// Who is sending the message.
    pub sender_username: Username,

    /// Who the message is addressed to.
    pub receiver_username: Username,

    /// Text content. May be absent when an attachment is present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_text: Option<String>,

    /// Optional file attachment, produced by a prior upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<Attachment>,
}

/// Why a [`MessageDraft`] was rejected before any I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidDraft {
    /// Sender or receiver username is empty.
    #[error("sender and receiver usernames are required")]
    MissingParticipant,

    /// Neither text nor an attachment is present.
    #[error("a message needs text or an attachment")]
    EmptyContent,
}

impl MessageDraft {
    /// Create a text-only draft.
    #[must_use]
    pub fn text(
        sender: impl Into<Username>,
        receiver: impl Into<Username>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            sender_username: sender.into(),
            receiver_username: receiver.into(),
            message_text: Some(text.into()),
            file: None,
        }
    }

    /// Attach a file to the draft.
    #[must_use]
    pub fn with_file(mut self, file: Attachment) -> Self {
        self.file = Some(file);
        self
    }

    /// Check the draft against the submission invariants.
    ///
    /// A draft is valid when both participants are named and it carries
    /// text and/or an attachment. Whitespace-only text does not count
    /// as content.
    pub fn validate(&self) -> Result<(), InvalidDraft> {
        if self.sender_username.is_empty() || self.receiver_username.is_empty() {
            return Err(InvalidDraft::MissingParticipant);
        }
        let has_text = self
            .message_text
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());
        if !has_text && self.file.is_none() {
            return Err(InvalidDraft::EmptyContent);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment() -> Attachment {
        Attachment {
            url: "http://localhost:8080/uploads/abc.png".into(),
            name: "photo.png".into(),
            content_type: "image/png".into(),
            size_bytes: 2_097_152,
        }
    }

    #[test]
    fn text_draft_is_valid() {
        let draft = MessageDraft::text("alice", "bob", "hi");
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn attachment_only_draft_is_valid() {
        let mut draft = MessageDraft::text("alice", "bob", "");
        draft.message_text = None;
        let draft = draft.with_file(attachment());
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn empty_draft_is_rejected() {
        let mut draft = MessageDraft::text("alice", "bob", "");
        assert_eq!(draft.validate(), Err(InvalidDraft::EmptyContent));
        draft.message_text = None;
        assert_eq!(draft.validate(), Err(InvalidDraft::EmptyContent));
    }

    #[test]
    fn whitespace_text_is_not_content() {
        let draft = MessageDraft::text("alice", "bob", "   ");
        assert_eq!(draft.validate(), Err(InvalidDraft::EmptyContent));
    }

    #[test]
    fn missing_participant_is_rejected() {
        let draft = MessageDraft::text("", "bob", "hi");
        assert_eq!(draft.validate(), Err(InvalidDraft::MissingParticipant));
        let draft = MessageDraft::text("alice", "", "hi");
        assert_eq!(draft.validate(), Err(InvalidDraft::MissingParticipant));
    }

    #[test]
    fn draft_wire_format_is_camel_case() {
        let draft = MessageDraft::text("alice", "bob", "hi").with_file(attachment());
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["senderUsername"], "alice");
        assert_eq!(json["receiverUsername"], "bob");
        assert_eq!(json["messageText"], "hi");
        assert_eq!(json["file"]["type"], "image/png");
        assert_eq!(json["file"]["size"], 2_097_152);
    }

    #[test]
    fn message_serde_roundtrip() {
        let message = Message {
            id: MessageId::new("m1"),
            sender_username: Username::new("alice"),
            receiver_username: Username::new("bob"),
            message_text: Some("hi".into()),
            file: None,
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_string(&message).unwrap();
        assert!(!json.contains("\"file\""), "absent file should be omitted");
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, message.id);
        assert_eq!(back.message_text.as_deref(), Some("hi"));
    }

    #[test]
    fn pair_match_is_order_independent() {
        let message = Message {
            id: MessageId::new("m1"),
            sender_username: Username::new("alice"),
            receiver_username: Username::new("bob"),
            message_text: Some("hi".into()),
            file: None,
            timestamp: chrono::Utc::now(),
        };
        let (a, b) = (Username::new("alice"), Username::new("bob"));
        assert!(message.is_between(&a, &b));
        assert!(message.is_between(&b, &a));
        assert!(!message.is_between(&a, &Username::new("carol")));
        assert!(message.involves(&a));
        assert!(message.involves(&b));
        assert!(!message.involves(&Username::new("carol")));
    }
}
