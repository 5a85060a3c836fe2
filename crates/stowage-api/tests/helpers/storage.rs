//! Storage doubles for exercising failure paths.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use stowage_storage::{Storage, StorageError, StorageResult, StoredObject};
use tokio::io::AsyncRead;

/// Storage whose writes always fail, like a full or read-only disk.
pub struct FailingStorage {
    pub root: PathBuf,
}

#[async_trait]
impl Storage for FailingStorage {
    async fn ensure_ready(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn store(
        &self,
        _sanitized_filename: &str,
        _reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StorageResult<StoredObject> {
        Err(StorageError::UploadFailed(
            "No space left on device (os error 28)".to_string(),
        ))
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

/// Storage that panics mid-request.
pub struct PanickingStorage {
    pub root: PathBuf,
}

#[async_trait]
impl Storage for PanickingStorage {
    async fn ensure_ready(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn store(
        &self,
        _sanitized_filename: &str,
        _reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StorageResult<StoredObject> {
        panic!("storage backend exploded");
    }

    fn root(&self) -> &Path {
        &self.root
    }
}
