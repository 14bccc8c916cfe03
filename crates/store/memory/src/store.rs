use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use parley_core::{Message, MessageDraft, MessageId, Username};
use parley_store::error::StoreError;
use parley_store::store::MessageStore;

/// In-memory [`MessageStore`] backed by an append-only log.
///
/// The log order is the insertion order. Assigned timestamps are
/// clamped to the previous entry's timestamp so they never go
/// backwards even if the wall clock does. Used by tests and
/// single-node deployments; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryMessageStore {
    log: RwLock<Vec<Message>>,
}

impl MemoryMessageStore {
    /// Create a new, empty in-memory message store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages currently held.
    pub async fn len(&self) -> usize {
        self.log.read().await.len()
    }

    /// Return `true` if the store holds no messages.
    pub async fn is_empty(&self) -> bool {
        self.log.read().await.is_empty()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn persist(&self, draft: MessageDraft) -> Result<Message, StoreError> {
        let mut log = self.log.write().await;

        // Clamp to the tail so timestamps are monotone non-decreasing.
        let now = Utc::now();
        let timestamp: DateTime<Utc> = match log.last() {
            Some(tail) if tail.timestamp > now => tail.timestamp,
            _ => now,
        };

        let message = Message {
            id: MessageId::new(Uuid::now_v7().to_string()),
            sender_username: draft.sender_username,
            receiver_username: draft.receiver_username,
            message_text: draft.message_text,
            file: draft.file,
            timestamp,
        };

        log.push(message.clone());
        Ok(message)
    }

    async fn find_all_involving(&self, user: &Username) -> Result<Vec<Message>, StoreError> {
        let log = self.log.read().await;
        Ok(log.iter().filter(|m| m.involves(user)).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn draft(from: &str, to: &str, text: &str) -> MessageDraft {
        MessageDraft::text(from, to, text)
    }

    #[tokio::test]
    async fn persist_assigns_id_and_timestamp() {
        let store = MemoryMessageStore::new();
        let message = store.persist(draft("alice", "bob", "hi")).await.unwrap();
        assert!(!message.id.is_empty());
        assert_eq!(message.sender_username.as_str(), "alice");
    }

    #[tokio::test]
    async fn find_all_involving_covers_both_directions() {
        let store = MemoryMessageStore::new();
        store.persist(draft("alice", "bob", "one")).await.unwrap();
        store.persist(draft("bob", "alice", "two")).await.unwrap();
        store.persist(draft("carol", "dave", "three")).await.unwrap();

        let alice = store
            .find_all_involving(&Username::new("alice"))
            .await
            .unwrap();
        assert_eq!(alice.len(), 2);

        let bob = store
            .find_all_involving(&Username::new("bob"))
            .await
            .unwrap();
        assert_eq!(bob.len(), 2);

        let nobody = store
            .find_all_involving(&Username::new("nobody"))
            .await
            .unwrap();
        assert!(nobody.is_empty());
    }

    #[tokio::test]
    async fn persisted_message_appears_exactly_once_per_party() {
        let store = MemoryMessageStore::new();
        let message = store.persist(draft("alice", "bob", "hi")).await.unwrap();

        for user in ["alice", "bob"] {
            let found = store
                .find_all_involving(&Username::new(user))
                .await
                .unwrap();
            let hits = found.iter().filter(|m| m.id == message.id).count();
            assert_eq!(hits, 1, "{user} should see the message exactly once");
        }
    }

    #[tokio::test]
    async fn timestamps_are_monotone_in_insertion_order() {
        let store = MemoryMessageStore::new();
        let mut previous = None;
        for i in 0..20 {
            let message = store
                .persist(draft("alice", "bob", &format!("msg {i}")))
                .await
                .unwrap();
            if let Some(prev) = previous {
                assert!(message.timestamp >= prev, "timestamp went backwards");
            }
            previous = Some(message.timestamp);
        }
    }

    #[tokio::test]
    async fn read_your_writes_under_concurrency() {
        let store = Arc::new(MemoryMessageStore::new());

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .persist(MessageDraft::text("alice", "bob", format!("msg {i}")))
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let all = store
            .find_all_involving(&Username::new("alice"))
            .await
            .unwrap();
        assert_eq!(all.len(), 8);
        assert!(all.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }
}
