//! Persistence of the localization snapshot.

use crate::cache::PersistedSnapshot;
use crate::error::{SyncError, SyncResult};
use locsync_storage::KeyValueBackend;
use std::future::Future;

/// Key the snapshot is stored under.
pub const STORE_KEY: &str = "localization-storage";

/// Durable home of the persisted cache subset.
pub trait PersistentStateStore: Send + Sync {
    /// Restores the last saved snapshot, if any.
    fn load(&self) -> impl Future<Output = SyncResult<Option<PersistedSnapshot>>> + Send;

    /// Replaces the saved snapshot.
    fn save(&self, snapshot: &PersistedSnapshot) -> impl Future<Output = SyncResult<()>> + Send;

    /// Deletes the saved snapshot.
    fn clear(&self) -> impl Future<Output = SyncResult<()>> + Send;
}

/// Stores the snapshot as JSON in a [`KeyValueBackend`] under [`STORE_KEY`].
#[derive(Debug)]
pub struct BackendStateStore<B: KeyValueBackend> {
    backend: B,
}

impl<B: KeyValueBackend> BackendStateStore<B> {
    /// Wraps a backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: KeyValueBackend> PersistentStateStore for BackendStateStore<B> {
    async fn load(&self) -> SyncResult<Option<PersistedSnapshot>> {
        let Some(bytes) = self.backend.get(STORE_KEY).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| SyncError::Rehydration(format!("invalid stored snapshot: {e}")))
    }

    async fn save(&self, snapshot: &PersistedSnapshot) -> SyncResult<()> {
        let bytes = serde_json::to_vec(snapshot)
            .map_err(|e| SyncError::Protocol(format!("failed to encode snapshot: {e}")))?;
        self.backend.set(STORE_KEY, bytes).await?;
        Ok(())
    }

    async fn clear(&self) -> SyncResult<()> {
        self.backend.remove(STORE_KEY).await?;
        Ok(())
    }
}
