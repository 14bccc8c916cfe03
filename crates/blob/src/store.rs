use async_trait::async_trait;
use bytes::Bytes;

use crate::error::BlobError;
use crate::types::BlobMetadata;

/// Pluggable blob storage backend for file attachments.
///
/// Implementors provide the actual storage mechanism (filesystem, S3,
/// ...). All backends enforce the shared acceptance policy: the 10 MB
/// size cap and the content-type allow-list from [`crate::policy`].
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a blob and return its metadata.
    ///
    /// The store assigns a unique ID, derives a URL-safe stored name,
    /// and computes a `SHA-256` checksum.
    async fn put(
        &self,
        filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<BlobMetadata, BlobError>;

    /// Retrieve a blob's content by its stored name.
    ///
    /// Returns `None` if the blob does not exist.
    async fn get(&self, stored_name: &str) -> Result<Option<Bytes>, BlobError>;

    /// Delete a blob by its stored name. Returns `true` if it existed.
    async fn delete(&self, stored_name: &str) -> Result<bool, BlobError>;
}
