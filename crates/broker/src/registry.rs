use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;

/// Registry of currently connected sessions, keyed by username.
///
/// Ephemeral bookkeeping only; nothing here is persisted. Connect and
/// disconnect are the only mutations, both safe under concurrent
/// invocation. Disconnect happens by dropping the [`SessionGuard`], so
/// it is idempotent by construction. An entry whose count reaches zero
/// is removed, so the map only holds usernames with live sessions.
pub struct SessionRegistry {
    connections: Arc<DashMap<String, Arc<AtomicUsize>>>,
    max_per_user: usize,
}

impl SessionRegistry {
    /// Create a registry with the given per-user concurrent session cap.
    #[must_use]
    pub fn new(max_per_user: usize) -> Self {
        Self {
            connections: Arc::new(DashMap::new()),
            max_per_user,
        }
    }

    /// Try to register a session for `username`.
    ///
    /// Returns `None` when the user already holds the maximum number of
    /// concurrent sessions. The returned guard deregisters on drop.
    pub fn try_connect(&self, username: &str) -> Option<SessionGuard> {
        // The increment happens while the entry is held, so a
        // concurrent guard drop cannot remove the entry between lookup
        // and increment.
        let counter = {
            let entry = self
                .connections
                .entry(username.to_owned())
                .or_insert_with(|| Arc::new(AtomicUsize::new(0)));
            let previous = entry.value().fetch_add(1, Ordering::Relaxed);
            if previous >= self.max_per_user {
                entry.value().fetch_sub(1, Ordering::Relaxed);
                return None;
            }
            Arc::clone(entry.value())
        };
        Some(SessionGuard {
            connections: Arc::clone(&self.connections),
            username: username.to_owned(),
            counter,
        })
    }

    /// Number of live sessions for `username`.
    #[must_use]
    pub fn sessions_for(&self, username: &str) -> usize {
        self.connections
            .get(username)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    /// Total number of live sessions across all users.
    #[must_use]
    pub fn total_sessions(&self) -> usize {
        self.connections
            .iter()
            .map(|entry| entry.value().load(Ordering::Relaxed))
            .sum()
    }
}

/// RAII guard for one registered session; deregisters on drop.
#[derive(Debug)]
pub struct SessionGuard {
    connections: Arc<DashMap<String, Arc<AtomicUsize>>>,
    username: String,
    counter: Arc<AtomicUsize>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::Relaxed);
        // Reap the entry once no sessions remain. remove_if checks the
        // count under the shard lock, and connects increment under the
        // same lock, so a fresh connect is never reaped.
        self.connections
            .remove_if(&self.username, |_, c| c.load(Ordering::Relaxed) == 0);
    }
}
