//! Transport layer abstraction for the remote localization API.

use crate::cache::{Currencies, Translations};
use crate::error::{SyncError, SyncResult};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Server-side dataset versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteVersions {
    /// Current translation dataset version.
    pub translation_version: u64,
    /// Current currency dataset version.
    pub currency_version: u64,
}

impl RemoteVersions {
    /// Creates a version pair.
    pub fn new(translation_version: u64, currency_version: u64) -> Self {
        Self {
            translation_version,
            currency_version,
        }
    }
}

/// Reports the versions the server currently holds.
pub trait RemoteVersionSource: Send + Sync {
    /// Fetches the current remote versions.
    fn get_versions(&self) -> impl Future<Output = SyncResult<RemoteVersions>> + Send;
}

/// Serves full datasets.
pub trait RemoteContentSource: Send + Sync {
    /// Fetches every translation for `lang`.
    fn get_translations(&self, lang: &str)
        -> impl Future<Output = SyncResult<Translations>> + Send;

    /// Fetches the full currency dataset.
    fn get_currencies(&self) -> impl Future<Output = SyncResult<Currencies>> + Send;
}

/// A transport handles network communication with the localization API.
///
/// This trait abstracts the network layer, allowing for different
/// implementations (HTTP, mock for testing, etc.).
pub trait SyncTransport: RemoteVersionSource + RemoteContentSource {
    /// Points the transport at an API endpoint with the given key.
    ///
    /// Called once by the engine during `init`.
    fn configure(&self, api_url: &str, api_key: &str) -> SyncResult<()>;

    /// Returns true once `configure` has succeeded.
    fn is_configured(&self) -> bool;
}

/// Per-endpoint request counts recorded by [`MockTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MockCalls {
    /// `configure` calls.
    pub configure: u64,
    /// Version requests.
    pub versions: u64,
    /// Translation requests.
    pub translations: u64,
    /// Currency requests.
    pub currencies: u64,
}

impl MockCalls {
    /// Total number of network requests (configure excluded).
    pub fn network(&self) -> u64 {
        self.versions + self.translations + self.currencies
    }
}

/// A scripted transport for testing.
#[derive(Debug, Default)]
pub struct MockTransport {
    versions: Mutex<Option<RemoteVersions>>,
    translations: Mutex<HashMap<String, Translations>>,
    currencies: Mutex<Option<Currencies>>,
    endpoint: Mutex<Option<(String, String)>>,
    requested_languages: Mutex<Vec<String>>,
    versions_hold: Mutex<Option<Arc<Notify>>>,
    fail_versions: AtomicBool,
    fail_translations: AtomicBool,
    fail_currencies: AtomicBool,
    configure_calls: AtomicU64,
    version_calls: AtomicU64,
    translation_calls: AtomicU64,
    currency_calls: AtomicU64,
}

impl MockTransport {
    /// Creates a new mock transport with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the versions response.
    pub fn set_versions(&self, translation_version: u64, currency_version: u64) {
        *self.versions.lock() = Some(RemoteVersions::new(translation_version, currency_version));
    }

    /// Sets the translations served for `lang`.
    pub fn set_translations<I, K, V>(&self, lang: &str, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.translations.lock().insert(lang.to_string(), map);
    }

    /// Sets the currency dataset.
    pub fn set_currencies(&self, currencies: Currencies) {
        *self.currencies.lock() = Some(currencies);
    }

    /// Makes version requests fail.
    pub fn set_fail_versions(&self, fail: bool) {
        self.fail_versions.store(fail, Ordering::SeqCst);
    }

    /// Makes translation requests fail.
    pub fn set_fail_translations(&self, fail: bool) {
        self.fail_translations.store(fail, Ordering::SeqCst);
    }

    /// Makes currency requests fail.
    pub fn set_fail_currencies(&self, fail: bool) {
        self.fail_currencies.store(fail, Ordering::SeqCst);
    }

    /// Holds the next version requests until the returned handle is
    /// notified, keeping a reconciliation in flight.
    pub fn hold_versions(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.versions_hold.lock() = Some(Arc::clone(&notify));
        notify
    }

    /// Returns the request counters.
    pub fn calls(&self) -> MockCalls {
        MockCalls {
            configure: self.configure_calls.load(Ordering::SeqCst),
            versions: self.version_calls.load(Ordering::SeqCst),
            translations: self.translation_calls.load(Ordering::SeqCst),
            currencies: self.currency_calls.load(Ordering::SeqCst),
        }
    }

    /// Returns the languages requested so far, in order.
    pub fn requested_languages(&self) -> Vec<String> {
        self.requested_languages.lock().clone()
    }

    /// Returns the configured `(api_url, api_key)`.
    pub fn endpoint(&self) -> Option<(String, String)> {
        self.endpoint.lock().clone()
    }
}

impl RemoteVersionSource for MockTransport {
    async fn get_versions(&self) -> SyncResult<RemoteVersions> {
        self.version_calls.fetch_add(1, Ordering::SeqCst);

        let hold = self.versions_hold.lock().take();
        if let Some(hold) = hold {
            hold.notified().await;
        }

        if self.fail_versions.load(Ordering::SeqCst) {
            return Err(SyncError::transport_retryable("mock version request failed"));
        }
        let versions = *self.versions.lock();
        versions.ok_or_else(|| SyncError::Protocol("no mock versions response set".into()))
    }
}

impl RemoteContentSource for MockTransport {
    async fn get_translations(&self, lang: &str) -> SyncResult<Translations> {
        self.translation_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_languages.lock().push(lang.to_string());

        if self.fail_translations.load(Ordering::SeqCst) {
            return Err(SyncError::transport_retryable(
                "mock translation request failed",
            ));
        }
        let translations = self.translations.lock().get(lang).cloned();
        translations
            .ok_or_else(|| SyncError::Protocol(format!("no mock translations set for {lang:?}")))
    }

    async fn get_currencies(&self) -> SyncResult<Currencies> {
        self.currency_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_currencies.load(Ordering::SeqCst) {
            return Err(SyncError::transport_retryable("mock currency request failed"));
        }
        let currencies = self.currencies.lock().clone();
        currencies.ok_or_else(|| SyncError::Protocol("no mock currencies set".into()))
    }
}

impl SyncTransport for MockTransport {
    fn configure(&self, api_url: &str, api_key: &str) -> SyncResult<()> {
        self.configure_calls.fetch_add(1, Ordering::SeqCst);
        *self.endpoint.lock() = Some((api_url.to_string(), api_key.to_string()));
        Ok(())
    }

    fn is_configured(&self) -> bool {
        self.endpoint.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_unscripted_responses_are_protocol_errors() {
        let transport = MockTransport::new();

        assert!(matches!(
            transport.get_versions().await,
            Err(SyncError::Protocol(_))
        ));
        assert!(matches!(
            transport.get_translations("en").await,
            Err(SyncError::Protocol(_))
        ));
        assert_eq!(transport.calls().network(), 2);
    }

    #[tokio::test]
    async fn mock_scripted_responses() {
        let transport = MockTransport::new();
        transport.set_versions(3, 1);
        transport.set_translations("en", [("home.title", "Home")]);

        assert_eq!(
            transport.get_versions().await.unwrap(),
            RemoteVersions::new(3, 1)
        );
        let translations = transport.get_translations("en").await.unwrap();
        assert_eq!(translations["home.title"], "Home");
        assert_eq!(transport.requested_languages(), ["en"]);
    }

    #[tokio::test]
    async fn mock_failure_injection() {
        let transport = MockTransport::new();
        transport.set_versions(1, 1);
        transport.set_fail_versions(true);

        let err = transport.get_versions().await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn mock_hold_releases_on_notify() {
        let transport = MockTransport::new();
        transport.set_versions(2, 0);
        let hold = transport.hold_versions();
        hold.notify_one();

        assert_eq!(transport.get_versions().await.unwrap().translation_version, 2);
    }

    #[test]
    fn mock_configure_records_endpoint() {
        let transport = MockTransport::new();
        assert!(!transport.is_configured());

        transport.configure("https://api.example.com", "key").unwrap();
        assert!(transport.is_configured());
        assert_eq!(
            transport.endpoint(),
            Some(("https://api.example.com".into(), "key".into()))
        );
        assert_eq!(transport.calls().configure, 1);
    }

    #[test]
    fn versions_decode_from_snake_case() {
        let versions: RemoteVersions =
            serde_json::from_str(r#"{"translation_version":4,"currency_version":2}"#).unwrap();
        assert_eq!(versions, RemoteVersions::new(4, 2));
    }
}
