//! Sync and set-language commands.
//!
//! Both boot the engine the way an app does at startup: configure, restore
//! the snapshot through the rehydration gate, and reconcile once.

use crate::client::ReqwestClient;
use crate::ConnectionArgs;
use locsync_engine::{
    BackendStateStore, HttpTransport, LocalizationConfig, RehydrationGate, SyncEngine,
    SyncOutcome,
};
use locsync_storage::FileBackend;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

type CliEngine = SyncEngine<HttpTransport<ReqwestClient>, BackendStateStore<FileBackend>>;

fn config_from(args: &ConnectionArgs) -> LocalizationConfig {
    LocalizationConfig::new(&args.api_url, &args.api_key)
        .with_default_language(&args.default_language)
        .with_fetch_currencies(args.currencies)
        .with_request_timeout(Duration::from_secs(args.timeout))
}

async fn boot(
    dir: &Path,
    args: &ConnectionArgs,
) -> Result<CliEngine, Box<dyn std::error::Error>> {
    let config = config_from(args);
    let client = ReqwestClient::new(config.request_timeout)?;
    let store = super::open_store(dir).await?;
    let engine = SyncEngine::new(HttpTransport::new(client), store);

    engine.init(config).await?;

    let report = RehydrationGate::new().rehydrate(&engine).await?;
    if let Some(e) = &report.restore_error {
        warn!("Starting without cached state: {}", e);
    }
    info!("Restored cached state: {}", report.restored);

    match report.sync {
        Ok(outcome) => print_outcome(&engine, outcome),
        Err(e) => {
            println!("✗ Sync failed: {}", e);
            println!("  Cached content was kept ({} keys)", engine.translations().len());
        }
    }

    Ok(engine)
}

/// Rehydrates and reconciles.
pub async fn run(dir: &Path, args: &ConnectionArgs) -> Result<(), Box<dyn std::error::Error>> {
    let engine = boot(dir, args).await?;
    if engine.status() == locsync_engine::SyncStatus::Error {
        return Err("localization sync did not complete".into());
    }
    Ok(())
}

/// Rehydrates, then switches to `language`.
pub async fn set_language(
    dir: &Path,
    args: &ConnectionArgs,
    language: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = boot(dir, args).await?;

    match engine.set_language(language).await? {
        Some(outcome) => print_outcome(&engine, outcome),
        None => println!("✓ Language already set to {}", language),
    }

    Ok(())
}

fn print_outcome(engine: &CliEngine, outcome: SyncOutcome) {
    let language = engine.current_language().unwrap_or_default();
    match outcome {
        SyncOutcome::Refreshed {
            translation_version,
            currency_version,
            currencies_refreshed,
        } => {
            println!("✓ Downloaded translations for {}", language);
            println!("  Keys: {}", engine.translations().len());
            println!("  Translation version: {}", translation_version);
            println!("  Currency version: {}", currency_version);
            if currencies_refreshed {
                println!("  Currencies: {}", engine.cache().currencies.len());
            }
        }
        SyncOutcome::UpToDate => {
            println!(
                "✓ Cached translations for {} are current (version {})",
                language,
                engine.translation_version()
            );
        }
    }
    if engine.is_rtl() {
        println!("  Direction: rtl");
    }
}
