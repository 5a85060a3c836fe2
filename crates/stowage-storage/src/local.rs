use crate::keys::unique_storage_name;
use crate::traits::{Storage, StorageError, StorageResult, StoredObject};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

/// Attempts at finding an unused key before giving up.
const MAX_KEY_ATTEMPTS: usize = 3;

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at `base_path`.
    ///
    /// The directory is not touched here; it is created on the first
    /// [`Storage::ensure_ready`] call.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        LocalStorage {
            base_path: base_path.into(),
        }
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// A key must be exactly one normal, non-hidden path component, so the
    /// returned path is always a direct child of the base directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        let mut components = Path::new(storage_key).components();
        let single_normal = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );

        if !single_normal
            || storage_key.contains(['/', '\\', '\0'])
            || storage_key.contains("..")
            || storage_key.starts_with('.')
        {
            return Err(StorageError::InvalidKey(
                "Storage key must be a single file name inside the storage directory".to_string(),
            ));
        }

        Ok(self.base_path.join(storage_key))
    }

    /// Hidden sibling the upload is streamed into before it is renamed into place.
    fn partial_path(&self, storage_key: &str) -> PathBuf {
        self.base_path.join(format!(".{}.partial", storage_key))
    }

    /// Pick an unused key and exclusively create its partial file. Returns the
    /// key, its final path, the partial path and the open partial file.
    async fn create_partial(
        &self,
        sanitized_filename: &str,
    ) -> StorageResult<(String, PathBuf, PathBuf, fs::File)> {
        for _ in 0..MAX_KEY_ATTEMPTS {
            let key = unique_storage_name(sanitized_filename);
            let final_path = self.key_to_path(&key)?;

            if fs::try_exists(&final_path).await.unwrap_or(false) {
                tracing::warn!(key = %key, "Generated storage key already exists, regenerating");
                continue;
            }

            let partial_path = self.partial_path(&key);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&partial_path)
                .await
            {
                Ok(file) => return Ok((key, final_path, partial_path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::warn!(key = %key, "Partial file already exists, regenerating key");
                    continue;
                }
                Err(e) => {
                    return Err(StorageError::UploadFailed(format!(
                        "Failed to create file {}: {}",
                        partial_path.display(),
                        e
                    )))
                }
            }
        }

        Err(StorageError::UploadFailed(format!(
            "Could not allocate a unique name for {} after {} attempts",
            sanitized_filename, MAX_KEY_ATTEMPTS
        )))
    }

    /// Copy the reader into `file`, keeping read and write failures apart.
    ///
    /// Returns the size of the synced file as reported by its metadata.
    async fn write_stream(
        file: &mut fs::File,
        path: &Path,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StorageResult<u64> {
        let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
        let mut written: u64 = 0;

        loop {
            let read = reader
                .read(&mut buffer)
                .await
                .map_err(StorageError::StreamInterrupted)?;
            if read == 0 {
                break;
            }

            file.write_all(&buffer[..read]).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to write file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            written += read as u64;
        }

        file.flush().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to flush file {}: {}", path.display(), e))
        })?;
        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let size_bytes = file
            .metadata()
            .await
            .map_err(|e| {
                StorageError::UploadFailed(format!("Failed to stat file {}: {}", path.display(), e))
            })?
            .len();
        if size_bytes != written {
            tracing::warn!(
                path = %path.display(),
                written,
                size_bytes,
                "Stored size differs from bytes written"
            );
        }

        Ok(size_bytes)
    }

    /// Move a completed partial file to its final name. The partial file is
    /// removed if the move fails, and nothing can fail after it.
    async fn persist(partial_path: &Path, path: &Path) -> StorageResult<()> {
        if let Err(e) = fs::rename(partial_path, path).await {
            Self::discard(partial_path).await;
            return Err(StorageError::UploadFailed(format!(
                "Failed to move {} into place: {}",
                path.display(),
                e
            )));
        }
        Ok(())
    }

    /// Best-effort removal of a partial file after a failed upload.
    async fn discard(path: &Path) {
        match fs::remove_file(path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "Removed partial upload"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to remove partial upload"
            ),
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn ensure_ready(&self) -> StorageResult<()> {
        // create_dir_all treats an existing directory (including one created
        // by a concurrent request) as success.
        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to create storage directory {}: {}",
                self.base_path.display(),
                e
            ))
        })
    }

    async fn store(
        &self,
        sanitized_filename: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StorageResult<StoredObject> {
        self.ensure_ready().await?;

        let start = std::time::Instant::now();
        let (key, path, partial_path, mut file) = self.create_partial(sanitized_filename).await?;

        let written = Self::write_stream(&mut file, &partial_path, reader).await;
        drop(file);
        let size_bytes = match written {
            Ok(size_bytes) => size_bytes,
            Err(e) => {
                Self::discard(&partial_path).await;
                return Err(e);
            }
        };

        Self::persist(&partial_path, &path).await?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(StoredObject { key, size_bytes })
    }

    fn root(&self) -> &Path {
        &self.base_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::collections::HashSet;
    use std::io::Cursor;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn file_names(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[tokio::test]
    async fn test_local_storage_store_read_back() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let data = b"test data".to_vec();
        let mut reader = Cursor::new(data.clone());
        let stored = storage.store("test.txt", &mut reader).await.unwrap();

        assert!(stored.key.starts_with("test-"));
        assert!(stored.key.ends_with(".txt"));
        assert_eq!(stored.size_bytes, data.len() as u64);

        let on_disk = std::fs::read(dir.path().join(&stored.key)).unwrap();
        assert_eq!(data, on_disk);
        assert_eq!(file_names(dir.path()), vec![stored.key]);
    }

    #[tokio::test]
    async fn test_store_creates_missing_directories() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nested").join("uploads");
        let storage = LocalStorage::new(&root);
        assert!(!root.exists());

        let mut reader = Cursor::new(b"abc".to_vec());
        let stored = storage.store("a.bin", &mut reader).await.unwrap();

        assert!(root.join(&stored.key).is_file());
        assert_eq!(storage.root(), root.as_path());
    }

    #[tokio::test]
    async fn test_ensure_ready_is_idempotent_and_race_safe() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path().join("uploads")));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let storage = storage.clone();
                tokio::spawn(async move { storage.ensure_ready().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        storage.ensure_ready().await.unwrap();
        assert!(dir.path().join("uploads").is_dir());
    }

    #[tokio::test]
    async fn test_concurrent_stores_of_same_name_never_collide() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path()));

        let handles: Vec<_> = (0..32u8)
            .map(|i| {
                let storage = storage.clone();
                tokio::spawn(async move {
                    let mut reader = Cursor::new(vec![i; 128]);
                    storage.store("same.dat", &mut reader).await
                })
            })
            .collect();

        let mut keys = HashSet::new();
        for handle in handles {
            let stored = handle.await.unwrap().unwrap();
            assert_eq!(stored.size_bytes, 128);
            keys.insert(stored.key);
        }
        assert_eq!(keys.len(), 32);
        assert_eq!(file_names(dir.path()).len(), 32);
    }

    #[tokio::test]
    async fn test_empty_stream_stores_empty_file() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let mut reader = Cursor::new(Vec::new());
        let stored = storage.store("empty.txt", &mut reader).await.unwrap();

        assert_eq!(stored.size_bytes, 0);
        let meta = std::fs::metadata(dir.path().join(&stored.key)).unwrap();
        assert!(meta.is_file());
        assert_eq!(meta.len(), 0);
    }

    #[tokio::test]
    async fn test_interrupted_stream_leaves_nothing_behind() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"first chunk")),
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionAborted,
                "client went away",
            )),
        ];
        let mut reader = tokio_util::io::StreamReader::new(futures::stream::iter(chunks));

        let result = storage.store("aborted.bin", &mut reader).await;

        assert!(matches!(result, Err(StorageError::StreamInterrupted(_))));
        assert!(file_names(dir.path()).is_empty());
    }

    #[test]
    fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        for key in [
            "../../../etc/passwd",
            "/etc/passwd",
            "sub/dir.txt",
            "..\\win.ini",
            ".hidden.partial",
            "..",
            "",
        ] {
            assert!(
                matches!(storage.key_to_path(key), Err(StorageError::InvalidKey(_))),
                "{key:?}"
            );
        }

        let path = storage.key_to_path("report-0123.pdf").unwrap();
        assert_eq!(path, dir.path().join("report-0123.pdf"));
    }

    #[tokio::test]
    async fn test_failed_move_into_place_removes_partial() {
        let dir = tempdir().unwrap();
        let partial = dir.path().join(".report.pdf.partial");
        std::fs::write(&partial, b"complete upload").unwrap();
        // A directory squatting on the final name makes the rename fail.
        let target = dir.path().join("report.pdf");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep.txt"), b"untouched").unwrap();

        let result = LocalStorage::persist(&partial, &target).await;

        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
        assert!(!partial.exists());
        assert!(target.join("keep.txt").is_file());
        assert_eq!(file_names(dir.path()), vec!["report.pdf".to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unwritable_directory_fails_cleanly() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let root = dir.path().join("readonly");
        std::fs::create_dir(&root).unwrap();
        std::fs::set_permissions(&root, std::fs::Permissions::from_mode(0o555)).unwrap();

        // Root ignores permission bits; nothing to assert there.
        if std::fs::File::create(root.join("writable-check")).is_ok() {
            return;
        }

        let storage = LocalStorage::new(&root);
        let mut reader = Cursor::new(b"data".to_vec());
        let result = storage.store("x.txt", &mut reader).await;

        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
        assert!(file_names(&root).is_empty());
    }
}
