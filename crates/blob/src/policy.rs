//! Attachment acceptance policy.
//!
//! Shared between the server upload handler (reject before writing) and
//! the blob backends (enforce at the storage boundary).

/// Maximum accepted attachment size: 10 MB.
pub const MAX_BLOB_BYTES: u64 = 10 * 1024 * 1024;

/// Content types accepted as attachments: images, PDFs, plain text, and
/// Word documents.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "application/pdf",
    "text/plain",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Return `true` if the content type is on the allow-list.
///
/// Matching ignores any `; charset=...` style parameters.
#[must_use]
pub fn allowed_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim();
    ALLOWED_CONTENT_TYPES
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(essence))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn images_and_documents_are_allowed() {
        assert!(allowed_content_type("image/png"));
        assert!(allowed_content_type("application/pdf"));
        assert!(allowed_content_type("text/plain"));
    }

    #[test]
    fn executables_and_archives_are_rejected() {
        assert!(!allowed_content_type("application/zip"));
        assert!(!allowed_content_type("application/octet-stream"));
        assert!(!allowed_content_type("text/html"));
    }

    #[test]
    fn parameters_and_case_are_ignored() {
        assert!(allowed_content_type("text/plain; charset=utf-8"));
        assert!(allowed_content_type("IMAGE/PNG"));
    }
}
