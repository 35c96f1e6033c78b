//! Storage backend trait definition.

use crate::error::StorageResult;
use std::future::Future;

/// An asynchronous key-value backend.
///
/// Values are **opaque bytes**. The backend never inspects them.
///
/// # Invariants
///
/// - `get` returns exactly the bytes last passed to `set` for that key
/// - `set` is durable once its future resolves successfully
/// - `remove` of a missing key is not an error
/// - Backends must be `Send + Sync` for shared access
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait KeyValueBackend: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or an I/O error occurs.
    fn get(&self, key: &str) -> impl Future<Output = StorageResult<Option<Vec<u8>>>> + Send;

    /// Replaces the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the write fails.
    fn set(&self, key: &str, value: Vec<u8>) -> impl Future<Output = StorageResult<()>> + Send;

    /// Deletes the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the delete fails.
    fn remove(&self, key: &str) -> impl Future<Output = StorageResult<()>> + Send;
}

/// Checks that a key can be used as a storage name.
///
/// Keys are restricted to ASCII alphanumerics, `-`, `_` and `.` and may
/// not start with a dot, so a key always maps to a single plain file name.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(crate::error::StorageError::InvalidKey(key.to_string()))
    }
}
