//! locsync CLI
//!
//! Command-line tools for a locsync localization cache.
//!
//! # Commands
//!
//! - `inspect` - Display the persisted snapshot
//! - `lookup` - Resolve keys against the persisted translations
//! - `clear` - Delete the persisted snapshot
//! - `sync` - Rehydrate and reconcile against the API
//! - `set-language` - Rehydrate, then switch language and reconcile

mod client;
mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// locsync command-line cache tools.
#[derive(Parser)]
#[command(name = "locsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the persisted cache
    #[arg(global = true, short, long, default_value = ".locsync")]
    store: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Connection settings shared by commands that talk to the API.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Base URL of the localization API
    #[arg(long, env = "LOCSYNC_API_URL")]
    pub api_url: String,

    /// API key sent as X-API-KEY
    #[arg(long, env = "LOCSYNC_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Language selected when nothing is cached yet
    #[arg(long, default_value = locsync_engine::DEFAULT_LANGUAGE)]
    pub default_language: String,

    /// Also fetch the currency dataset
    #[arg(long)]
    pub currencies: bool,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Display the persisted snapshot
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Resolve keys against the persisted translations
    Lookup {
        /// Translation keys, e.g. auth.welcome_message
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Delete the persisted snapshot
    Clear,

    /// Rehydrate and reconcile against the API
    Sync {
        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// Switch language and reconcile
    SetLanguage {
        /// Language code, e.g. ar or pt-BR
        language: String,

        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { format } => commands::inspect::run(&cli.store, &format).await?,
        Commands::Lookup { keys } => commands::lookup::run(&cli.store, &keys).await?,
        Commands::Clear => commands::clear::run(&cli.store).await?,
        Commands::Sync { connection } => commands::sync::run(&cli.store, &connection).await?,
        Commands::SetLanguage {
            language,
            connection,
        } => commands::sync::set_language(&cli.store, &connection, &language).await?,
    }

    Ok(())
}
