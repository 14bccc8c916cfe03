use std::sync::Arc;

use tokio::sync::broadcast;

use parley_store::MessageStore;

use crate::broker::Broker;
use crate::error::BrokerError;
use crate::metrics::BrokerMetrics;
use crate::registry::SessionRegistry;

/// Default capacity of the broadcast channel. Subscribers further
/// behind than this observe a `Lagged` error and must re-fetch history.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Default per-user concurrent session cap.
const DEFAULT_MAX_SESSIONS_PER_USER: usize = 10;

/// Fluent builder for constructing a [`Broker`] instance.
///
/// A [`MessageStore`] must be supplied; everything else has defaults.
pub struct BrokerBuilder {
    store: Option<Arc<dyn MessageStore>>,
    channel_capacity: usize,
    max_sessions_per_user: usize,
}

impl BrokerBuilder {
    /// Create a new builder with all optional fields set to their defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            max_sessions_per_user: DEFAULT_MAX_SESSIONS_PER_USER,
        }
    }

    /// Set the message store implementation.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn MessageStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the broadcast channel capacity.
    #[must_use]
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Set the per-user concurrent session cap.
    #[must_use]
    pub fn max_sessions_per_user(mut self, max: usize) -> Self {
        self.max_sessions_per_user = max;
        self
    }

    /// Consume the builder and produce a configured [`Broker`].
    ///
    /// Returns [`BrokerError::Configuration`] if the message store has
    /// not been set.
    pub fn build(self) -> Result<Broker, BrokerError> {
        let store = self
            .store
            .ok_or_else(|| BrokerError::Configuration("message store is required".into()))?;

        let (events_tx, _) = broadcast::channel(self.channel_capacity);

        Ok(Broker {
            store,
            events_tx,
            sessions: SessionRegistry::new(self.max_sessions_per_user),
            metrics: Arc::new(BrokerMetrics::default()),
        })
    }
}

impl Default for BrokerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_store_memory::MemoryMessageStore;

    #[test]
    fn build_missing_store_returns_error() {
        let result = BrokerBuilder::new().build();
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("message store is required"));
    }

    #[test]
    fn build_with_store_succeeds() {
        let store = Arc::new(MemoryMessageStore::new());
        let result = BrokerBuilder::new().store(store).build();
        assert!(result.is_ok());
    }
}
