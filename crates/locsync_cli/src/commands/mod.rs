//! CLI command implementations.

pub mod clear;
pub mod inspect;
pub mod lookup;
pub mod sync;

use locsync_engine::{BackendStateStore, PersistedSnapshot, PersistentStateStore};
use locsync_storage::FileBackend;
use std::path::Path;

/// Opens the snapshot store rooted at `dir`.
pub(crate) async fn open_store(
    dir: &Path,
) -> Result<BackendStateStore<FileBackend>, Box<dyn std::error::Error>> {
    Ok(BackendStateStore::new(FileBackend::open(dir).await?))
}

/// Loads the snapshot, failing with a readable message when none exists.
pub(crate) async fn load_snapshot(
    dir: &Path,
) -> Result<PersistedSnapshot, Box<dyn std::error::Error>> {
    let store = open_store(dir).await?;
    store
        .load()
        .await?
        .ok_or_else(|| format!("No cached localization state at {:?}", dir).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn load_snapshot_round_trip() {
        let dir = tempdir().unwrap();
        let snapshot = PersistedSnapshot {
            current_lang: Some("ur".into()),
            is_rtl: true,
            translation_version: 2,
            ..Default::default()
        };
        open_store(dir.path()).await.unwrap().save(&snapshot).await.unwrap();

        assert_eq!(load_snapshot(dir.path()).await.unwrap(), snapshot);
    }

    #[tokio::test]
    async fn load_snapshot_reports_missing_cache() {
        let dir = tempdir().unwrap();
        let err = load_snapshot(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("No cached localization state"));
    }

    #[tokio::test]
    async fn clear_removes_snapshot() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path()).await.unwrap();
        store.save(&PersistedSnapshot::default()).await.unwrap();

        clear::run(dir.path()).await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
