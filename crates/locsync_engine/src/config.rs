//! Configuration for the localization engine.

use crate::error::{SyncError, SyncResult};
use std::fmt;
use std::time::Duration;

/// Language selected on first launch when the host supplies none.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Immutable engine configuration, supplied once through `init`.
///
/// Kept apart from the cached state: none of these fields are persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct LocalizationConfig {
    /// Base URL of the localization API (e.g. `https://api.example.com/api/v1`).
    pub api_url: String,
    /// Plain-text API key sent with every request.
    pub api_key: String,
    /// Language used when nothing was restored from storage.
    pub default_language: String,
    /// Whether reconciliation also refreshes the currency dataset.
    pub fetch_currencies: bool,
    /// Request timeout handed to HTTP clients that support one.
    pub request_timeout: Duration,
}

impl LocalizationConfig {
    /// Creates a configuration with default language and no currencies.
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            default_language: DEFAULT_LANGUAGE.to_string(),
            fetch_currencies: false,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Sets the default language.
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    /// Enables or disables currency fetching.
    pub fn with_fetch_currencies(mut self, enabled: bool) -> Self {
        self.fetch_currencies = enabled;
        self
    }

    /// Sets the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Checks that the connection settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Configuration`] if `api_url` or `api_key` is
    /// blank, or if the default language is blank.
    pub fn validate(&self) -> SyncResult<()> {
        if self.api_url.trim().is_empty() || self.api_key.trim().is_empty() {
            return Err(SyncError::Configuration(
                "apiUrl and apiKey must be provided".into(),
            ));
        }
        if self.default_language.trim().is_empty() {
            return Err(SyncError::Configuration(
                "defaultLanguage must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl Default for LocalizationConfig {
    fn default() -> Self {
        Self::new("", "")
    }
}

// The key never appears in logs.
impl fmt::Debug for LocalizationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalizationConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("default_language", &self.default_language)
            .field("fetch_currencies", &self.fetch_currencies)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
