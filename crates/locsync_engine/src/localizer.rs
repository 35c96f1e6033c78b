//! Consumption-side binding over an engine.

use crate::cache::{lookup, SyncStatus, Translations};
use crate::error::SyncResult;
use crate::state::{SyncEngine, SyncOutcome};
use crate::store::PersistentStateStore;
use crate::transport::SyncTransport;
use std::sync::Arc;
use tokio::sync::watch;

/// Point-in-time view of what a UI needs to render.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalizationView {
    /// Translations for `current_lang`.
    pub translations: Translations,
    /// Selected language.
    pub current_lang: Option<String>,
    /// Lifecycle phase.
    pub status: SyncStatus,
    /// Whether `current_lang` is right to left.
    pub is_rtl: bool,
}

impl LocalizationView {
    /// Translates `key`, or returns it verbatim when missing.
    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        lookup(&self.translations, key)
    }
}

/// Cheap, cloneable handle handed to UI code.
///
/// ```rust
/// use locsync_engine::{
///     BackendStateStore, LocalizationConfig, Localizer, MockTransport, SyncEngine,
/// };
/// use locsync_storage::InMemoryBackend;
/// use std::sync::Arc;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let transport = MockTransport::new();
/// transport.set_versions(1, 0);
/// transport.set_translations("en", [("auth.welcome", "Welcome!")]);
///
/// let engine = Arc::new(SyncEngine::new(
///     transport,
///     BackendStateStore::new(InMemoryBackend::new()),
/// ));
/// engine
///     .init(LocalizationConfig::new("https://api.example.com", "key"))
///     .await
///     .unwrap();
/// engine.fetch_and_sync().await.unwrap();
///
/// let localizer = Localizer::new(engine);
/// assert_eq!(localizer.t("auth.welcome"), "Welcome!");
/// assert_eq!(localizer.t("auth.unknown"), "auth.unknown");
/// # });
/// ```
pub struct Localizer<T: SyncTransport, S: PersistentStateStore> {
    engine: Arc<SyncEngine<T, S>>,
}

impl<T: SyncTransport, S: PersistentStateStore> Localizer<T, S> {
    /// Wraps a shared engine.
    pub fn new(engine: Arc<SyncEngine<T, S>>) -> Self {
        Self { engine }
    }

    /// Returns the underlying engine.
    pub fn engine(&self) -> &Arc<SyncEngine<T, S>> {
        &self.engine
    }

    /// Translates `key`, or returns it verbatim when missing.
    pub fn t(&self, key: &str) -> String {
        self.engine.lookup(key)
    }

    /// Captures the current state.
    pub fn view(&self) -> LocalizationView {
        let cache = self.engine.cache();
        LocalizationView {
            translations: cache.translations,
            current_lang: cache.current_lang,
            status: cache.status,
            is_rtl: cache.is_rtl,
        }
    }

    /// Switches language. See [`SyncEngine::set_language`].
    pub async fn set_language(&self, lang: &str) -> SyncResult<Option<SyncOutcome>> {
        self.engine.set_language(lang).await
    }

    /// Subscribes to status changes, e.g. to re-render on `ready`.
    pub fn status_changes(&self) -> watch::Receiver<SyncStatus> {
        self.engine.subscribe()
    }
}

impl<T: SyncTransport, S: PersistentStateStore> Clone for Localizer<T, S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocalizationConfig;
    use crate::store::BackendStateStore;
    use crate::transport::MockTransport;
    use locsync_storage::InMemoryBackend;

    async fn ready_localizer() -> Localizer<MockTransport, BackendStateStore<InMemoryBackend>> {
        let transport = MockTransport::new();
        transport.set_versions(2, 0);
        transport.set_translations("en", [("nav.home", "Home"), ("nav.empty", "")]);
        transport.set_translations("he", [("nav.home", "בית")]);

        let engine = Arc::new(SyncEngine::new(
            transport,
            BackendStateStore::new(InMemoryBackend::new()),
        ));
        engine
            .init(LocalizationConfig::new("https://api.example.com", "key"))
            .await
            .unwrap();
        engine.fetch_and_sync().await.unwrap();
        Localizer::new(engine)
    }

    #[tokio::test]
    async fn lookup_and_fallback() {
        let localizer = ready_localizer().await;

        assert_eq!(localizer.t("nav.home"), "Home");
        assert_eq!(localizer.t("nav.missing"), "nav.missing");
        assert_eq!(localizer.t("nav.empty"), "nav.empty");
    }

    #[tokio::test]
    async fn view_reflects_language_switch() {
        let localizer = ready_localizer().await;
        let other = localizer.clone();

        other.set_language("he").await.unwrap();
        let view = localizer.view();

        assert_eq!(view.current_lang.as_deref(), Some("he"));
        assert!(view.is_rtl);
        assert_eq!(view.status, SyncStatus::Ready);
        assert_eq!(view.t("nav.home"), "בית");
        assert_eq!(view.t("nav.missing"), "nav.missing");
    }

    #[tokio::test]
    async fn lookup_before_any_sync_returns_keys() {
        let engine = Arc::new(SyncEngine::new(
            MockTransport::new(),
            BackendStateStore::new(InMemoryBackend::new()),
        ));
        let localizer = Localizer::new(engine);

        assert_eq!(localizer.t("nav.home"), "nav.home");
        assert_eq!(localizer.view().status, SyncStatus::Idle);
        assert_eq!(*localizer.status_changes().borrow(), SyncStatus::Idle);
    }
}
