//! File-based storage backend for persistent storage.

use crate::backend::{validate_key, KeyValueBackend};
use crate::error::StorageResult;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A directory-backed key-value store.
///
/// Each key is stored as one file inside the root directory. Values
/// survive process restarts.
///
/// # Durability
///
/// `set` writes to a uniquely named temporary sibling file, syncs it, then
/// renames it over the target. A crash mid-write leaves the previous value
/// intact; a failed write removes its temporary file.
///
/// # Example
///
/// ```no_run
/// use locsync_storage::{FileBackend, KeyValueBackend};
/// use std::path::Path;
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let backend = FileBackend::open(Path::new("cache")).await.unwrap();
/// backend.set("localization-storage", b"{}".to_vec()).await.unwrap();
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Opens a backend rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn open(root: &Path) -> StorageResult<Self> {
        tokio::fs::create_dir_all(root).await?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the file path used for `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.root.join(format!(".{key}.{}.{n}.tmp", std::process::id()))
    }
}

async fn write_and_replace(temp: &Path, target: &Path, value: &[u8]) -> std::io::Result<()> {
    use tokio::io::AsyncWriteExt;

    let mut file = tokio::fs::File::create(temp).await?;
    file.write_all(value).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(temp, target).await
}

impl KeyValueBackend for FileBackend {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_key(key)?;
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> StorageResult<()> {
        validate_key(key)?;
        let target = self.path_for(key);
        let temp = self.temp_path_for(key);

        if let Err(e) = write_and_replace(&temp, &target, &value).await {
            if let Err(cleanup) = tokio::fs::remove_file(&temp).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(path = %temp.display(), error = %cleanup, "failed to remove temp file");
                }
            }
            return Err(e.into());
        }

        debug!(key, bytes = value.len(), "stored value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use tempfile::tempdir;

    fn temp_files(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter(|entry| {
                entry
                    .as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .ends_with(".tmp")
            })
            .count()
    }

    #[tokio::test]
    async fn file_creates_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nested").join("cache");

        let backend = FileBackend::open(&root).await.unwrap();
        assert!(root.is_dir());
        assert_eq!(backend.root(), root.as_path());
    }

    #[tokio::test]
    async fn file_set_and_get() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).await.unwrap();

        assert_eq!(backend.get("k").await.unwrap(), None);

        backend.set("k", b"hello".to_vec()).await.unwrap();
        assert_eq!(backend.get("k").await.unwrap(), Some(b"hello".to_vec()));
        assert_eq!(temp_files(dir.path()), 0);
    }

    #[tokio::test]
    async fn file_overwrite() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).await.unwrap();

        backend.set("k", b"a longer first value".to_vec()).await.unwrap();
        backend.set("k", b"short".to_vec()).await.unwrap();

        assert_eq!(backend.get("k").await.unwrap(), Some(b"short".to_vec()));
    }

    #[tokio::test]
    async fn file_concurrent_sets_do_not_collide() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).await.unwrap();

        let (a, b, c) = tokio::join!(
            backend.set("k", b"first".to_vec()),
            backend.set("k", b"second".to_vec()),
            backend.set("k", b"third".to_vec()),
        );
        a.unwrap();
        b.unwrap();
        c.unwrap();

        let stored = backend.get("k").await.unwrap().unwrap();
        assert!([&b"first"[..], b"second", b"third"].contains(&stored.as_slice()));
        assert_eq!(temp_files(dir.path()), 0);
    }

    #[tokio::test]
    async fn file_failed_set_removes_temp_file() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).await.unwrap();
        std::fs::create_dir(backend.path_for("k")).unwrap();
        std::fs::write(backend.path_for("k").join("inner"), b"x").unwrap();

        let result = backend.set("k", b"value".to_vec()).await;

        assert!(matches!(result, Err(StorageError::Io(_))));
        assert_eq!(temp_files(dir.path()), 0);
    }

    #[tokio::test]
    async fn file_persistence() {
        let dir = tempdir().unwrap();

        {
            let backend = FileBackend::open(dir.path()).await.unwrap();
            backend.set("k", b"persistent".to_vec()).await.unwrap();
        }

        let backend = FileBackend::open(dir.path()).await.unwrap();
        assert_eq!(backend.get("k").await.unwrap(), Some(b"persistent".to_vec()));
    }

    #[tokio::test]
    async fn file_remove() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).await.unwrap();

        backend.set("k", b"x".to_vec()).await.unwrap();
        backend.remove("k").await.unwrap();
        backend.remove("k").await.unwrap();

        assert_eq!(backend.get("k").await.unwrap(), None);
        assert!(!backend.path_for("k").exists());
    }

    #[tokio::test]
    async fn file_rejects_traversal() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).await.unwrap();

        let result = backend.get("../outside").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }
}
