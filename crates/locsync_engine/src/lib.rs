//! # locsync Engine
//!
//! Keeps a persisted bundle of translations and currency data in sync
//! with a versioned remote API.
//!
//! This crate provides:
//! - The cache model and its persisted snapshot
//! - A sync state machine (idle → loading → ready | error)
//! - A rehydration gate that sequences restore before the first sync
//! - Transport traits with an HTTP/JSON implementation and a mock
//! - A consumption-side [`Localizer`] with key-fallback lookup
//!
//! ## Boot sequence
//!
//! 1. `SyncEngine::init` stores configuration and configures the transport
//! 2. `RehydrationGate::rehydrate` restores the snapshot, then reconciles once
//! 3. `SyncEngine::set_language` switches language and reconciles again
//!
//! ## Key Invariants
//!
//! - Translations always belong to the selected language
//! - Switching language clears translations and resets their version together
//! - At most one reconciliation is in flight
//! - A failed reconciliation leaves cached content untouched
//! - Status and configuration are never persisted

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod error;
mod gate;
mod http;
mod localizer;
mod state;
mod store;
mod transport;

pub use cache::{
    is_rtl_language, Currencies, LocalizationCache, PersistedSnapshot, SyncStatus, Translations,
    RTL_LANGUAGES,
};
pub use config::{LocalizationConfig, DEFAULT_LANGUAGE};
pub use error::{SyncError, SyncResult};
pub use gate::{RehydrationGate, RehydrationReport, RestoreSignal};
pub use http::{HttpClient, HttpResponse, HttpTransport, API_KEY_HEADER};
pub use localizer::{LocalizationView, Localizer};
pub use state::{SyncEngine, SyncOutcome, SyncStats};
pub use store::{BackendStateStore, PersistentStateStore, STORE_KEY};
pub use transport::{
    MockCalls, MockTransport, RemoteContentSource, RemoteVersionSource, RemoteVersions,
    SyncTransport,
};
