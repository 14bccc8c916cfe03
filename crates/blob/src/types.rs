use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for a stored blob (file attachment).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobMetadata {
    /// Unique blob identifier.
    pub id: String,
    /// Name of the stored object within the backend (e.g. the on-disk
    /// filename). Safe to embed in a URL path.
    pub stored_name: String,
    /// Original filename as uploaded.
    pub filename: String,
    /// MIME content type (e.g. `"application/pdf"`).
    pub content_type: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// `SHA-256` hex digest of the blob content.
    pub checksum_sha256: String,
    /// Public URL the blob can be fetched from.
    pub url: String,
    /// When the blob was stored.
    pub created_at: DateTime<Utc>,
}
