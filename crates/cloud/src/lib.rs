//! Object storage collaborator.
//!
//! Uploaded schedule files go through the [`ObjectStore`] trait. Two
//! providers exist: [`S3Store`] for deployments and [`LocalDiskStore`] for
//! development and tests.

mod local;
mod s3;

use async_trait::async_trait;

pub use local::LocalDiskStore;
pub use s3::S3Store;

/// Where an uploaded object can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Storage key the object was written under.
    pub path: String,
    /// Publicly reachable retrieval URL.
    pub public_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The object path is empty, absolute, or escapes the storage root.
    #[error("Invalid object path: {0}")]
    InvalidPath(String),

    /// An object already exists and overwrite was not requested.
    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reported by the S3 provider.
    #[error("S3 error: {0}")]
    S3(String),
}

/// Binary upload returning a public URL.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        path: &str,
        overwrite: bool,
    ) -> Result<StoredObject, StorageError>;
}

/// Reject paths that could escape the storage root.
pub(crate) fn validate_path(path: &str) -> Result<(), StorageError> {
    let bad = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(())
}

/// Join a public base URL and an object path with exactly one slash.
pub(crate) fn public_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}
