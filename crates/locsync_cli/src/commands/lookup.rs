//! Lookup command implementation.

use locsync_engine::LocalizationCache;
use std::path::Path;

/// Resolves each key against the persisted translations.
///
/// Missing keys print verbatim, matching what an app would render.
pub async fn run(dir: &Path, keys: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = super::load_snapshot(dir).await?;

    let mut cache = LocalizationCache::new();
    cache.restore(snapshot);

    for key in keys {
        println!("{key} = {}", cache.lookup(key));
    }

    Ok(())
}
