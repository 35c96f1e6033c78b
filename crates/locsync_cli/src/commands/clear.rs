//! Clear command implementation.

use locsync_engine::PersistentStateStore;
use std::path::Path;
use tracing::info;

/// Deletes the persisted snapshot so the next sync starts fresh.
pub async fn run(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!("Clearing localization cache in {:?}", dir);

    let store = super::open_store(dir).await?;
    store.clear().await?;

    println!("✓ Localization cache cleared");
    Ok(())
}
