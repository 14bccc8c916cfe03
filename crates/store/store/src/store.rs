use async_trait::async_trait;

use parley_core::{Message, MessageDraft, Username};

use crate::error::StoreError;

/// Trait for durable, ordered message persistence.
///
/// Implementations must be `Send + Sync` and safe for concurrent access.
/// The store is the single source of truth for message history; callers
/// hold read-only caches at most.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a draft, assigning its `id` and `timestamp`.
    ///
    /// The write is all-or-nothing: an observer never sees a message
    /// missing either assigned field. Assigned timestamps are
    /// monotonically non-decreasing in insertion order. The caller is
    /// expected to have validated the draft already; the store does not
    /// re-check content invariants.
    async fn persist(&self, draft: MessageDraft) -> Result<Message, StoreError>;

    /// Return every message where the user is sender or receiver,
    /// ordered by timestamp ascending (ties in insertion order).
    ///
    /// Safe to call concurrently with `persist`; a call started after a
    /// `persist` completes includes that message (read-your-writes
    /// against the same store instance).
    async fn find_all_involving(&self, user: &Username) -> Result<Vec<Message>, StoreError>;
}
