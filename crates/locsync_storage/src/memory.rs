//! In-memory storage backend for testing.

use crate::backend::{validate_key, KeyValueBackend};
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// An in-memory key-value backend.
///
/// Suitable for:
/// - Unit tests
/// - Integration tests
/// - Hosts that only want a cache for the lifetime of the process
///
/// Reads and writes can be made to fail on demand, which lets callers
/// exercise their error paths without touching the file system.
///
/// # Example
///
/// ```rust
/// use locsync_storage::{InMemoryBackend, KeyValueBackend};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let backend = InMemoryBackend::new();
/// assert_eq!(backend.get("missing").await.unwrap(), None);
/// backend.set("key", vec![1, 2, 3]).await.unwrap();
/// assert_eq!(backend.write_count(), 1);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicU64,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-populated with a single entry.
    ///
    /// Useful for testing restore scenarios.
    #[must_use]
    pub fn with_entry(key: impl Into<String>, value: Vec<u8>) -> Self {
        let backend = Self::default();
        backend.entries.write().insert(key.into(), value);
        backend
    }

    /// Returns a copy of the value under `key` without going through the
    /// async interface.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.read().get(key).cloned()
    }

    /// Returns the number of successful `set` calls.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Makes subsequent reads fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent writes and removals fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".into()));
        }
        Ok(())
    }
}

impl KeyValueBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_key(key)?;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("reads disabled".into()));
        }
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> StorageResult<()> {
        validate_key(key)?;
        self.check_writable()?;
        self.entries.write().insert(key.to_string(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.check_writable()?;
        self.entries.write().remove(key);
        Ok(())
    }
}
