//! Storage abstraction trait
//!
//! This module defines the Storage trait the upload handler writes through.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// The source stream failed before it reached its end (client abort,
    /// malformed body, body limit).
    #[error("Upload stream interrupted: {0}")]
    StreamInterrupted(#[source] std::io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A file that was fully written and is visible under its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Unique file name inside the storage root
    pub key: String,
    /// Size measured from the stored file, not from the request
    pub size_bytes: u64,
}

/// Storage abstraction trait
///
/// **Key format:** flat, unique file names (`{stem}-{hex}{ext}`); see the
/// crate root documentation.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Make sure the storage root exists. Safe to call concurrently and repeatedly.
    async fn ensure_ready(&self) -> StorageResult<()>;

    /// Store the contents of `reader` under a new unique key derived from
    /// `sanitized_filename`.
    ///
    /// The object only becomes visible under its key once the reader reached
    /// EOF and the data was flushed to disk. If the reader or the write fails,
    /// nothing is left behind.
    async fn store(
        &self,
        sanitized_filename: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StorageResult<StoredObject>;

    /// Directory (or prefix) objects are stored under, for logging.
    fn root(&self) -> &Path;
}
