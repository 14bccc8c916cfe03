//! A stateful two-party conversation session.
//!
//! [`Session`] wraps a [`ParleyClient`] with the client-side state a
//! chat view needs: a deduplicated local message cache, the
//! send-with-attachment flow, and a local typing indicator. Real-time
//! events from the SSE stream are folded in with [`Session::apply_event`];
//! a lagged notice means the cache is stale and [`Session::refresh`]
//! should be called.

use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use tokio::time::Instant;

use parley_core::{ChatEvent, ChatEventKind, InvalidDraft, Message, MessageDraft, Username, assemble};

use crate::{Error, ParleyClient};

/// Largest attachment the session will attempt to upload. Matches the
/// server's upload cap so oversized files fail before any bytes move.
pub const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

/// How long after the last keystroke the typing indicator stays on.
const TYPING_QUIET_WINDOW: Duration = Duration::from_secs(2);

/// Errors surfaced by a conversation session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The peer username is not registered.
    #[error("unknown recipient: {0}")]
    UnknownRecipient(String),

    /// The attachment exceeds the upload cap.
    #[error("file too large: {size} bytes exceeds limit of {limit} bytes")]
    FileTooLarge {
        /// Actual size.
        size: u64,
        /// Maximum allowed size.
        limit: u64,
    },

    /// The draft failed local validation; nothing was sent.
    #[error("invalid message: {0}")]
    InvalidDraft(#[from] InvalidDraft),

    /// A transport or server error.
    #[error(transparent)]
    Transport(#[from] Error),
}

/// Local typing indicator driven by composition activity.
///
/// Purely client-side; nothing is sent over the wire. The indicator
/// turns on with [`note_activity`](Self::note_activity) and turns off
/// once the quiet window passes with no further activity.
#[derive(Debug, Default)]
pub struct TypingIndicator {
    last_activity: Option<Instant>,
}

impl TypingIndicator {
    /// Record a keystroke or other composition activity.
    pub fn note_activity(&mut self) {
        self.last_activity = Some(Instant::now());
    }

    /// Turn the indicator off immediately (e.g. after sending).
    pub fn clear(&mut self) {
        self.last_activity = None;
    }

    /// Whether the indicator is currently on.
    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.last_activity
            .is_some_and(|t| t.elapsed() < TYPING_QUIET_WINDOW)
    }
}

/// A live two-party conversation backed by the Parley server.
pub struct Session {
    client: ParleyClient,
    me: Username,
    peer: Username,
    messages: Vec<Message>,
    typing: TypingIndicator,
}

impl Session {
    /// Open a session with `peer`, validating the recipient and loading
    /// the conversation history.
    ///
    /// The client must already be logged in as `me`.
    pub async fn open(
        client: ParleyClient,
        me: impl Into<Username>,
        peer: impl Into<Username>,
    ) -> Result<Self, SessionError> {
        let me = me.into();
        let peer = peer.into();

        if !client.peer_exists(peer.as_str()).await? {
            return Err(SessionError::UnknownRecipient(peer.to_string()));
        }

        let mut session = Self {
            client,
            me,
            peer,
            messages: Vec::new(),
            typing: TypingIndicator::default(),
        };
        session.refresh().await?;
        Ok(session)
    }

    /// The authenticated user.
    #[must_use]
    pub fn me(&self) -> &Username {
        &self.me
    }

    /// The other participant.
    #[must_use]
    pub fn peer(&self) -> &Username {
        &self.peer
    }

    /// The local typing indicator.
    pub fn typing(&mut self) -> &mut TypingIndicator {
        &mut self.typing
    }

    /// Send a text message. Returns the persisted record.
    pub async fn send_text(&mut self, text: impl Into<String>) -> Result<Message, SessionError> {
        let draft = MessageDraft::text(self.me.clone(), self.peer.clone(), text);
        self.send(draft).await
    }

    /// Upload a file and send it, optionally with accompanying text.
    ///
    /// Oversized files are rejected locally before any upload traffic.
    pub async fn send_file(
        &mut self,
        filename: &str,
        content_type: &str,
        data: Bytes,
        text: Option<&str>,
    ) -> Result<Message, SessionError> {
        let size = data.len() as u64;
        if size > MAX_ATTACHMENT_BYTES {
            return Err(SessionError::FileTooLarge {
                size,
                limit: MAX_ATTACHMENT_BYTES,
            });
        }

        let attachment = self.client.upload(filename, content_type, data).await?;

        let mut draft = MessageDraft {
            sender_username: self.me.clone(),
            receiver_username: self.peer.clone(),
            message_text: text.map(ToOwned::to_owned),
            file: None,
        };
        draft = draft.with_file(attachment);
        self.send(draft).await
    }

    async fn send(&mut self, draft: MessageDraft) -> Result<Message, SessionError> {
        draft.validate()?;
        let message = self.client.submit(&draft).await?;
        self.typing.clear();
        self.insert(message.clone());
        Ok(message)
    }

    /// Re-fetch the conversation from the server, replacing the cache.
    pub async fn refresh(&mut self) -> Result<(), SessionError> {
        let messages = self
            .client
            .fetch_messages(self.peer.as_str(), None)
            .await?;
        self.messages = messages;
        Ok(())
    }

    /// Fold a real-time event into the cache.
    ///
    /// Returns `true` if the event belonged to this conversation and
    /// changed the cache. Deliveries already present (e.g. the echo of
    /// our own send) are ignored by id.
    pub fn apply_event(&mut self, event: ChatEvent) -> bool {
        let ChatEventKind::MessageDelivered { message } = event.kind;
        if !message.is_between(&self.me, &self.peer) {
            return false;
        }
        self.insert(message)
    }

    /// The assembled conversation view, oldest first, optionally
    /// narrowed by a case-insensitive text filter.
    #[must_use]
    pub fn conversation(&self, filter: Option<&str>) -> Vec<Message> {
        assemble(&self.messages, &self.me, &self.peer, filter)
    }

    /// Number of cached messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn insert(&mut self, message: Message) -> bool {
        if self.messages.iter().any(|m| m.id == message.id) {
            return false;
        }
        self.messages.push(message);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::MessageId;

    fn session() -> Session {
        Session {
            client: ParleyClient::new("http://localhost:8080"),
            me: Username::new("alice"),
            peer: Username::new("bob"),
            messages: Vec::new(),
            typing: TypingIndicator::default(),
        }
    }

    fn message(id: &str, sender: &str, receiver: &str, text: &str) -> Message {
        Message {
            id: MessageId::new(id),
            sender_username: Username::new(sender),
            receiver_username: Username::new(receiver),
            message_text: Some(text.into()),
            file: None,
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn apply_event_deduplicates_by_id() {
        let mut session = session();
        let m = message("m1", "bob", "alice", "hi");

        assert!(session.apply_event(ChatEvent::message_delivered(m.clone())));
        assert!(!session.apply_event(ChatEvent::message_delivered(m)));
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn apply_event_ignores_other_conversations() {
        let mut session = session();
        let m = message("m1", "carol", "dave", "psst");

        assert!(!session.apply_event(ChatEvent::message_delivered(m)));
        assert!(session.is_empty());
    }

    #[test]
    fn conversation_view_is_filtered() {
        let mut session = session();
        session.insert(message("m1", "alice", "bob", "see the attached report"));
        session.insert(message("m2", "bob", "alice", "thanks"));

        let all = session.conversation(None);
        assert_eq!(all.len(), 2);

        let filtered = session.conversation(Some("REPORT"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, MessageId::new("m1"));
    }

    #[tokio::test(start_paused = true)]
    async fn typing_indicator_clears_after_quiet_window() {
        let mut typing = TypingIndicator::default();
        assert!(!typing.is_typing());

        typing.note_activity();
        assert!(typing.is_typing());

        tokio::time::advance(Duration::from_millis(1900)).await;
        assert!(typing.is_typing());

        tokio::time::advance(Duration::from_millis(200)).await;
        assert!(!typing.is_typing());
    }

    #[tokio::test(start_paused = true)]
    async fn typing_indicator_extends_on_activity() {
        let mut typing = TypingIndicator::default();
        typing.note_activity();

        tokio::time::advance(Duration::from_millis(1500)).await;
        typing.note_activity();

        tokio::time::advance(Duration::from_millis(1500)).await;
        assert!(typing.is_typing());

        typing.clear();
        assert!(!typing.is_typing());
    }
}
