use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use parley_core::{ChatEvent, Message, MessageDraft};
use parley_store::MessageStore;

use crate::error::BrokerError;
use crate::metrics::BrokerMetrics;
use crate::registry::{SessionGuard, SessionRegistry};

/// The delivery broker: the bridge between message submission and
/// real-time fan-out.
///
/// The submission pipeline for each draft:
/// 1. Validate (no I/O; rejects empty content or missing participants).
/// 2. Persist via the [`MessageStore`], which assigns id and timestamp.
/// 3. Broadcast the persisted [`Message`] to every connected session.
///
/// Fan-out is deliberately unfiltered: every subscriber receives every
/// delivered message, and each session derives its visible conversation
/// client-side. Delivery is best-effort; a subscriber that lags or
/// disconnects misses events and catches up with a full history fetch.
pub struct Broker {
    // Note: manual `Debug` impl below because trait objects lack `Debug`.
    pub(crate) store: Arc<dyn MessageStore>,
    pub(crate) events_tx: broadcast::Sender<ChatEvent>,
    pub(crate) sessions: SessionRegistry,
    pub(crate) metrics: Arc<BrokerMetrics>,
}

impl std::fmt::Debug for Broker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broker")
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

impl Broker {
    /// Submit a draft through the full validate -> persist -> broadcast
    /// pipeline.
    ///
    /// On success returns the persisted message (with store-assigned id
    /// and timestamp), which has also been handed to the broadcast
    /// channel. On persist failure nothing is broadcast and no retry is
    /// attempted; retrying is the submitter's decision.
    #[instrument(
        skip(self, draft),
        fields(
            message.sender = %draft.sender_username,
            message.receiver = %draft.receiver_username,
        )
    )]
    pub async fn submit(&self, draft: MessageDraft) -> Result<Message, BrokerError> {
        self.metrics.increment_submitted();

        if let Err(e) = draft.validate() {
            self.metrics.increment_rejected();
            warn!(error = %e, "draft rejected");
            return Err(BrokerError::InvalidMessage(e));
        }

        let message = match self.store.persist(draft).await {
            Ok(message) => message,
            Err(e) => {
                self.metrics.increment_store_failed();
                return Err(BrokerError::Store(e));
            }
        };

        // Fire-and-forget: send only fails when there are no subscribers,
        // which is fine -- they catch up from the store.
        let receivers = self
            .events_tx
            .send(ChatEvent::message_delivered(message.clone()))
            .unwrap_or(0);
        self.metrics.increment_delivered();

        info!(message.id = %message.id, receivers, "message delivered");

        Ok(message)
    }

    /// Register a connected session for `username`.
    ///
    /// Fails with [`BrokerError::TooManyConnections`] when the per-user
    /// cap is reached. Dropping the guard deregisters the session;
    /// repeated drops cannot double-deregister.
    pub fn connect(&self, username: &str) -> Result<SessionGuard, BrokerError> {
        self.sessions
            .try_connect(username)
            .ok_or_else(|| BrokerError::TooManyConnections(username.to_owned()))
    }

    /// Subscribe to the delivery fan-out.
    ///
    /// Every persisted message is pushed to every subscriber; filtering
    /// to a conversation is the receiving session's job.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events_tx.subscribe()
    }

    /// Return a reference to the message store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn MessageStore> {
        &self.store
    }

    /// Return a reference to the session registry.
    #[must_use]
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Return a reference to the broker metrics.
    #[must_use]
    pub fn metrics(&self) -> &BrokerMetrics {
        &self.metrics
    }
}
