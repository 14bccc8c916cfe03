pub mod error;
pub mod fs;
pub mod policy;
pub mod store;
pub mod types;

pub use error::BlobError;
pub use fs::FsBlobStore;
pub use policy::{MAX_BLOB_BYTES, allowed_content_type};
pub use store::BlobStore;
pub use types::BlobMetadata;
