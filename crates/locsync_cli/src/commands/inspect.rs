//! Inspect command implementation.

use locsync_engine::PersistedSnapshot;
use std::path::Path;

/// Runs the inspect command.
pub async fn run(dir: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = super::load_snapshot(dir).await?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        _ => {
            print_text_output(dir, &snapshot);
        }
    }

    Ok(())
}

fn print_text_output(dir: &Path, snapshot: &PersistedSnapshot) {
    println!("Localization cache: {}", dir.display());
    println!();
    println!(
        "  Language:            {}",
        snapshot.current_lang.as_deref().unwrap_or("(unset)")
    );
    println!(
        "  Direction:           {}",
        if snapshot.is_rtl { "rtl" } else { "ltr" }
    );
    println!("  Translation version: {}", snapshot.translation_version);
    println!("  Currency version:    {}", snapshot.currency_version);
    println!("  Translations:        {}", snapshot.translations.len());
    println!("  Currencies:          {}", snapshot.currencies.len());

    if !snapshot.currencies.is_empty() {
        let codes: Vec<&str> = snapshot.currencies.keys().map(String::as_str).collect();
        println!("  Currency codes:      {}", codes.join(", "));
    }
}
