use thiserror::Error;

use parley_core::InvalidDraft;
use parley_store::StoreError;

/// Errors surfaced by the delivery broker.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// The draft failed validation; nothing was written.
    #[error("invalid message: {0}")]
    InvalidMessage(#[from] InvalidDraft),

    /// Persistence failed; nothing was broadcast and no retry was
    /// attempted.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The per-user connection cap was reached.
    #[error("too many concurrent connections for user {0}")]
    TooManyConnections(String),

    /// A broker configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}
