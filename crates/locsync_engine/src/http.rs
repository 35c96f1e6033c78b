//! HTTP transport implementation.
//!
//! This module maps the transport traits onto the localization REST API:
//!
//! | call | request |
//! |---|---|
//! | versions | `GET {api_url}/sync` |
//! | translations | `GET {api_url}/translations?lang={lang}` |
//! | currencies | `GET {api_url}/currencies` |
//!
//! Every request carries `Accept: application/json` and the API key in
//! `X-API-KEY`. The actual HTTP client is abstracted via a trait so hosts
//! can plug in reqwest, hyper, or an in-process router.

use crate::cache::{Currencies, Translations};
use crate::error::{SyncError, SyncResult};
use crate::transport::{RemoteContentSource, RemoteVersionSource, RemoteVersions, SyncTransport};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::debug;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// A raw HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a `200 OK` response.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// Returns true for 2xx status codes.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client abstraction.
///
/// Implement this trait to provide the actual HTTP transport. Errors are
/// connection-level failures; non-2xx answers are returned as responses.
pub trait HttpClient: Send + Sync {
    /// Sends a GET request with the given headers.
    fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> impl Future<Output = Result<HttpResponse, String>> + Send;
}

#[derive(Debug, Clone)]
struct Endpoint {
    base_url: String,
    api_key: String,
}

/// HTTP-based transport using JSON bodies.
pub struct HttpTransport<C: HttpClient> {
    client: C,
    endpoint: RwLock<Option<Endpoint>>,
}

impl<C: HttpClient> HttpTransport<C> {
    /// Creates an unconfigured transport.
    pub fn new(client: C) -> Self {
        Self {
            client,
            endpoint: RwLock::new(None),
        }
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> Option<String> {
        self.endpoint.read().as_ref().map(|e| e.base_url.clone())
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> SyncResult<T> {
        let endpoint = self
            .endpoint
            .read()
            .clone()
            .ok_or_else(|| SyncError::transport_fatal("transport is not configured"))?;

        let url = format!("{}{}", endpoint.base_url, path);
        let headers = [
            ("Accept", "application/json"),
            (API_KEY_HEADER, endpoint.api_key.as_str()),
        ];

        debug!(%url, "requesting");
        let response = self
            .client
            .get(&url, &headers)
            .await
            .map_err(SyncError::transport_retryable)?;

        if !response.is_success() {
            let message = format!("GET {path} returned status {}", response.status);
            // Client errors will not fix themselves on retry.
            return Err(if response.status == 429 || response.status >= 500 {
                SyncError::transport_retryable(message)
            } else {
                SyncError::transport_fatal(message)
            });
        }

        serde_json::from_slice(&response.body)
            .map_err(|e| SyncError::Protocol(format!("failed to decode {path}: {e}")))
    }
}

impl<C: HttpClient> RemoteVersionSource for HttpTransport<C> {
    async fn get_versions(&self) -> SyncResult<RemoteVersions> {
        self.get_json("/sync").await
    }
}

impl<C: HttpClient> RemoteContentSource for HttpTransport<C> {
    async fn get_translations(&self, lang: &str) -> SyncResult<Translations> {
        self.get_json(&format!("/translations?lang={}", urlencoding::encode(lang)))
            .await
    }

    async fn get_currencies(&self) -> SyncResult<Currencies> {
        self.get_json("/currencies").await
    }
}

impl<C: HttpClient> SyncTransport for HttpTransport<C> {
    fn configure(&self, api_url: &str, api_key: &str) -> SyncResult<()> {
        let mut endpoint = self.endpoint.write();
        if endpoint.is_some() {
            return Err(SyncError::Configuration(
                "transport is already configured".into(),
            ));
        }
        *endpoint = Some(Endpoint {
            base_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        });
        Ok(())
    }

    fn is_configured(&self) -> bool {
        self.endpoint.read().is_some()
    }
}
