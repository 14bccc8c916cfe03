use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::BlobError;
use crate::policy::{MAX_BLOB_BYTES, allowed_content_type};
use crate::store::BlobStore;
use crate::types::BlobMetadata;

/// Filesystem-backed [`BlobStore`].
///
/// Each blob becomes one file under the uploads directory, named
/// `{uuid}{ext}` where `ext` is the sanitized extension of the original
/// filename. The uploaded name never reaches the filesystem, so path
/// traversal is not a concern on write; `get`/`delete` reject stored
/// names containing path separators.
pub struct FsBlobStore {
    root: PathBuf,
    base_url: String,
}

impl FsBlobStore {
    /// Create a store rooted at `root`, producing URLs under
    /// `{base_url}/uploads/`.
    ///
    /// The directory is created if it does not exist.
    pub async fn new(
        root: impl Into<PathBuf>,
        base_url: impl Into<String>,
    ) -> Result<Self, BlobError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| BlobError::Storage(format!("creating uploads dir: {e}")))?;
        Ok(Self {
            root,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    fn path_for(&self, stored_name: &str) -> Result<PathBuf, BlobError> {
        if stored_name.is_empty()
            || stored_name.contains('/')
            || stored_name.contains('\\')
            || stored_name.contains("..")
        {
            return Err(BlobError::NotFound(stored_name.to_owned()));
        }
        Ok(self.root.join(stored_name))
    }
}

/// Extract a safe lowercase extension (including the dot) from an
/// uploaded filename. Anything but short alphanumeric extensions is
/// dropped.
fn sanitized_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(
        &self,
        filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<BlobMetadata, BlobError> {
        if !allowed_content_type(content_type) {
            return Err(BlobError::InvalidContentType(content_type.to_owned()));
        }
        let size = data.len() as u64;
        if size > MAX_BLOB_BYTES {
            return Err(BlobError::TooLarge {
                size,
                limit: MAX_BLOB_BYTES,
            });
        }

        let id = Uuid::new_v4().to_string();
        let stored_name = format!("{id}{}", sanitized_extension(filename));
        let path = self.root.join(&stored_name);

        let checksum = hex::encode(Sha256::digest(&data));

        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| BlobError::Storage(format!("writing {}: {e}", path.display())))?;

        Ok(BlobMetadata {
            url: format!("{}/uploads/{stored_name}", self.base_url),
            id,
            stored_name,
            filename: filename.to_owned(),
            content_type: content_type.to_owned(),
            size_bytes: size,
            checksum_sha256: checksum,
            created_at: Utc::now(),
        })
    }

    async fn get(&self, stored_name: &str) -> Result<Option<Bytes>, BlobError> {
        let path = match self.path_for(stored_name) {
            Ok(path) => path,
            Err(_) => return Ok(None),
        };
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BlobError::Storage(format!(
                "reading {}: {e}",
                path.display()
            ))),
        }
    }

    async fn delete(&self, stored_name: &str) -> Result<bool, BlobError> {
        let path = match self.path_for(stored_name) {
            Ok(path) => path,
            Err(_) => return Ok(false),
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BlobError::Storage(format!(
                "removing {}: {e}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> (tempfile::TempDir, FsBlobStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path(), "http://localhost:8080")
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn put_then_get_roundtrip() {
        let (_dir, store) = temp_store().await;
        let meta = store
            .put("photo.png", "image/png", Bytes::from_static(b"fake-png"))
            .await
            .unwrap();

        assert_eq!(meta.filename, "photo.png");
        assert_eq!(meta.content_type, "image/png");
        assert_eq!(meta.size_bytes, 8);
        assert!(meta.stored_name.ends_with(".png"));
        assert!(meta.url.ends_with(&format!("/uploads/{}", meta.stored_name)));

        let data = store.get(&meta.stored_name).await.unwrap();
        assert_eq!(data.as_deref(), Some(b"fake-png".as_slice()));
    }

    #[tokio::test]
    async fn oversized_blob_is_rejected_and_not_written() {
        let (dir, store) = temp_store().await;
        let big = Bytes::from(vec![0u8; (MAX_BLOB_BYTES + 1) as usize]);
        let err = store.put("big.pdf", "application/pdf", big).await;
        assert!(matches!(err, Err(BlobError::TooLarge { .. })));

        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 0, "nothing should be written on rejection");
    }

    #[tokio::test]
    async fn disallowed_content_type_is_rejected() {
        let (_dir, store) = temp_store().await;
        let err = store
            .put("evil.exe", "application/octet-stream", Bytes::from_static(b"x"))
            .await;
        assert!(matches!(err, Err(BlobError::InvalidContentType(_))));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let (_dir, store) = temp_store().await;
        assert!(store.get("nope.png").await.unwrap().is_none());
        assert!(store.get("../etc/passwd").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_dir, store) = temp_store().await;
        let meta = store
            .put("note.txt", "text/plain", Bytes::from_static(b"hello"))
            .await
            .unwrap();
        assert!(store.delete(&meta.stored_name).await.unwrap());
        assert!(!store.delete(&meta.stored_name).await.unwrap());
    }

    #[test]
    fn extensions_are_sanitized() {
        assert_eq!(sanitized_extension("photo.PNG"), ".png");
        assert_eq!(sanitized_extension("archive.tar.gz"), ".gz");
        assert_eq!(sanitized_extension("no-extension"), "");
        assert_eq!(sanitized_extension("weird.p/n"), "");
    }
}
