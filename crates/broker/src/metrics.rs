use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters tracking broker submission outcomes.
///
/// All counters use relaxed ordering. For a consistent point-in-time
/// view, call [`snapshot`](Self::snapshot).
#[derive(Debug, Default)]
pub struct BrokerMetrics {
    /// Total number of drafts submitted.
    pub submitted: AtomicU64,
    /// Drafts rejected by validation before any I/O.
    pub rejected: AtomicU64,
    /// Submissions that failed at the persistence step.
    pub store_failed: AtomicU64,
    /// Messages persisted and handed to the broadcast channel.
    pub delivered: AtomicU64,
}

impl BrokerMetrics {
    /// Increment the submitted counter.
    pub fn increment_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the rejected counter.
    pub fn increment_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the store-failure counter.
    pub fn increment_store_failed(&self) {
        self.store_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the delivered counter.
    pub fn increment_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a consistent point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            store_failed: self.store_failed.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
        }
    }
}

/// A plain data snapshot of [`BrokerMetrics`] at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Total number of drafts submitted.
    pub submitted: u64,
    /// Drafts rejected by validation.
    pub rejected: u64,
    /// Submissions that failed at the persistence step.
    pub store_failed: u64,
    /// Messages persisted and broadcast.
    pub delivered: u64,
}
