//! Localization sync state machine.

use crate::cache::{lookup, LocalizationCache, PersistedSnapshot, SyncStatus, Translations};
use crate::config::LocalizationConfig;
use crate::error::{SyncError, SyncResult};
use crate::store::PersistentStateStore;
use crate::transport::SyncTransport;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tokio::sync::{watch, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

/// Result of a completed reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The cache was stale and new content was installed.
    Refreshed {
        /// Translation version now cached.
        translation_version: u64,
        /// Currency version now cached.
        currency_version: u64,
        /// Whether the currency dataset was fetched too.
        currencies_refreshed: bool,
    },
    /// The cached content was already current.
    UpToDate,
}

/// Statistics about reconciliations.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Reconciliations that ended in `ready`.
    pub cycles_completed: u64,
    /// Reconciliations that downloaded content.
    pub content_fetches: u64,
    /// Reconciliations that ended in `error`.
    pub failures: u64,
    /// Time of the last successful reconciliation.
    pub last_sync_time: Option<Instant>,
    /// Last error message.
    pub last_error: Option<String>,
}

/// Held for the duration of a reconciliation or a restore.
type InFlight<'a> = MutexGuard<'a, ()>;

/// The engine keeps a persisted localization cache in sync with the
/// remote API.
///
/// It is the only writer of the cache. At most one reconciliation runs at
/// a time: [`SyncEngine::fetch_and_sync`] claims an in-flight lock and
/// rejects overlapping calls with [`SyncError::SyncInProgress`].
/// [`SyncEngine::restore`] waits for that lock instead.
///
/// Saves to the store are suppressed until [`SyncEngine::mark_rehydrated`]
/// has been called (normally by [`crate::RehydrationGate`]), so defaults
/// never overwrite a snapshot that has not been read yet.
pub struct SyncEngine<T: SyncTransport, S: PersistentStateStore> {
    transport: Arc<T>,
    store: Arc<S>,
    config: OnceLock<LocalizationConfig>,
    cache: RwLock<LocalizationCache>,
    status_tx: watch::Sender<SyncStatus>,
    stats: RwLock<SyncStats>,
    in_flight: Mutex<()>,
    rehydrated: AtomicBool,
}

impl<T: SyncTransport, S: PersistentStateStore> SyncEngine<T, S> {
    /// Creates an engine with an empty cache in `idle`.
    pub fn new(transport: T, store: S) -> Self {
        Self::with_shared(Arc::new(transport), Arc::new(store))
    }

    /// Creates an engine over shared collaborators.
    pub fn with_shared(transport: Arc<T>, store: Arc<S>) -> Self {
        let (status_tx, _) = watch::channel(SyncStatus::Idle);
        Self {
            transport,
            store,
            config: OnceLock::new(),
            cache: RwLock::new(LocalizationCache::new()),
            status_tx,
            stats: RwLock::new(SyncStats::default()),
            in_flight: Mutex::new(()),
            rehydrated: AtomicBool::new(false),
        }
    }

    /// Returns the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the configuration once `init` has succeeded.
    pub fn config(&self) -> Option<&LocalizationConfig> {
        self.config.get()
    }

    /// Gets the current status.
    pub fn status(&self) -> SyncStatus {
        self.cache.read().status
    }

    /// Gets the selected language.
    pub fn current_language(&self) -> Option<String> {
        self.cache.read().current_lang.clone()
    }

    /// Returns true if the selected language is right to left.
    pub fn is_rtl(&self) -> bool {
        self.cache.read().is_rtl
    }

    /// Gets the cached translation version.
    pub fn translation_version(&self) -> u64 {
        self.cache.read().translation_version
    }

    /// Gets the cached currency version.
    pub fn currency_version(&self) -> u64 {
        self.cache.read().currency_version
    }

    /// Returns a copy of the cached translations.
    pub fn translations(&self) -> Translations {
        self.cache.read().translations.clone()
    }

    /// Returns a copy of the whole cache.
    pub fn cache(&self) -> LocalizationCache {
        self.cache.read().clone()
    }

    /// Returns the persisted subset of the cache.
    pub fn snapshot(&self) -> PersistedSnapshot {
        self.cache.read().snapshot()
    }

    /// Gets the current stats.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Subscribes to status changes.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status_tx.subscribe()
    }

    /// Returns true while a reconciliation or restore is in flight.
    pub fn is_syncing(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Returns true once persisted state has been restored (or found
    /// absent) and saves are enabled.
    pub fn is_rehydrated(&self) -> bool {
        self.rehydrated.load(Ordering::Acquire)
    }

    /// Resolves `key` against the cached translations, returning the key
    /// itself when no translation is cached.
    pub fn lookup(&self, key: &str) -> String {
        lookup(&self.cache.read().translations, key).to_string()
    }

    /// Configures the engine. Does not fetch anything.
    ///
    /// Selects `default_language` only when no language was restored.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Configuration`] and moves to `error` when the
    /// API URL or key is missing. A second successful `init` is rejected
    /// without changing any state.
    pub async fn init(&self, config: LocalizationConfig) -> SyncResult<()> {
        if let Err(e) = config.validate() {
            error!(error = %e, "localization misconfigured");
            self.fail(&e);
            return Err(e);
        }

        if self.config.get().is_some() {
            warn!("localization engine already initialised");
            return Err(SyncError::Configuration(
                "engine is already initialised".into(),
            ));
        }

        if let Err(e) = self.transport.configure(&config.api_url, &config.api_key) {
            error!(error = %e, "failed to configure transport");
            self.fail(&e);
            return Err(e);
        }

        let default_language = config.default_language.clone();
        info!(
            api_url = %config.api_url,
            fetch_currencies = config.fetch_currencies,
            "localization engine configured"
        );
        if self.config.set(config).is_err() {
            return Err(SyncError::Configuration(
                "engine is already initialised".into(),
            ));
        }

        let selected = {
            let mut cache = self.cache.write();
            if cache.current_lang.is_none() {
                cache.select_language(&default_language);
                true
            } else {
                false
            }
        };
        if selected {
            debug!(language = %default_language, "selected default language");
            self.persist().await;
        }

        Ok(())
    }

    /// Applies a restored snapshot. Status is left as is.
    ///
    /// Waits for a running reconciliation to finish first; whatever it
    /// committed is then replaced by the snapshot.
    pub async fn restore(&self, snapshot: PersistedSnapshot) {
        let _guard = self.in_flight.lock().await;

        let mut cache = self.cache.write();
        cache.restore(snapshot);
        debug!(
            language = ?cache.current_lang,
            translation_version = cache.translation_version,
            currency_version = cache.currency_version,
            keys = cache.translations.len(),
            "restored persisted localization state"
        );
    }

    /// Enables saving to the store.
    pub fn mark_rehydrated(&self) {
        self.rehydrated.store(true, Ordering::Release);
    }

    /// Reconciles the cache with the remote versions.
    ///
    /// Fetches content when the remote translation version is newer or no
    /// translations are cached, otherwise trusts the cache. Failures leave
    /// the cached content untouched and move to `error`.
    ///
    /// # Errors
    ///
    /// - [`SyncError::SyncInProgress`] if another reconciliation is running;
    ///   nothing is changed in that case
    /// - [`SyncError::NoLanguage`] if no language is selected
    /// - transport, protocol and decode failures from the remote
    pub async fn fetch_and_sync(&self) -> SyncResult<SyncOutcome> {
        let Ok(guard) = self.in_flight.try_lock() else {
            debug!("sync already in flight");
            return Err(SyncError::SyncInProgress);
        };
        self.sync_claimed(guard).await
    }

    /// Switches language and reconciles for it.
    ///
    /// Returns `Ok(None)` without side effects when `lang` is already
    /// selected or a reconciliation is in flight.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NoLanguage`] for a blank code, otherwise the
    /// errors of [`SyncEngine::fetch_and_sync`].
    pub async fn set_language(&self, lang: &str) -> SyncResult<Option<SyncOutcome>> {
        let lang = lang.trim();
        if lang.is_empty() {
            return Err(SyncError::NoLanguage);
        }

        let Ok(guard) = self.in_flight.try_lock() else {
            debug!(language = lang, "ignoring language change while syncing");
            return Ok(None);
        };

        let is_rtl = {
            let mut cache = self.cache.write();
            if cache.status.is_loading() || cache.current_lang.as_deref() == Some(lang) {
                return Ok(None);
            }
            cache.select_language(lang);
            cache.is_rtl
        };
        info!(language = lang, rtl = is_rtl, "switched language");
        self.persist().await;

        self.sync_claimed(guard).await.map(Some)
    }

    async fn sync_claimed(&self, _guard: InFlight<'_>) -> SyncResult<SyncOutcome> {
        let Some(lang) = self.current_language() else {
            let e = SyncError::NoLanguage;
            error!("no language available to fetch");
            self.fail(&e);
            return Err(e);
        };
        let fetch_currencies = self.config.get().is_some_and(|c| c.fetch_currencies);

        self.set_status(SyncStatus::Loading);
        match self.reconcile(&lang, fetch_currencies).await {
            Ok(outcome) => {
                let mut stats = self.stats.write();
                stats.cycles_completed += 1;
                if matches!(outcome, SyncOutcome::Refreshed { .. }) {
                    stats.content_fetches += 1;
                }
                stats.last_sync_time = Some(Instant::now());
                stats.last_error = None;
                Ok(outcome)
            }
            Err(e) => {
                error!(language = %lang, error = %e, "failed to sync localization");
                self.fail(&e);
                Err(e)
            }
        }
    }

    async fn reconcile(&self, lang: &str, fetch_currencies: bool) -> SyncResult<SyncOutcome> {
        let remote = self.transport.get_versions().await?;

        let (local_version, cache_empty) = {
            let cache = self.cache.read();
            (cache.translation_version, cache.translations.is_empty())
        };
        let needs_fetch = remote.translation_version > local_version || cache_empty;

        if !needs_fetch {
            debug!(
                language = lang,
                translation_version = local_version,
                "localization cache is current"
            );
            self.set_status(SyncStatus::Ready);
            return Ok(SyncOutcome::UpToDate);
        }

        let translations = self.transport.get_translations(lang).await?;
        let currencies = if fetch_currencies {
            Some(self.transport.get_currencies().await?)
        } else {
            None
        };
        let currencies_refreshed = currencies.is_some();

        let outcome = {
            let mut cache = self.cache.write();
            cache.commit_fetch(
                translations,
                currencies,
                remote.translation_version,
                remote.currency_version,
            );
            cache.status = SyncStatus::Ready;
            SyncOutcome::Refreshed {
                translation_version: cache.translation_version,
                currency_version: cache.currency_version,
                currencies_refreshed,
            }
        };
        self.status_tx.send_replace(SyncStatus::Ready);

        info!(
            language = lang,
            translation_version = remote.translation_version,
            currency_version = remote.currency_version,
            currencies_refreshed,
            "localization content refreshed"
        );
        self.persist().await;

        Ok(outcome)
    }

    fn set_status(&self, status: SyncStatus) {
        self.cache.write().status = status;
        self.status_tx.send_replace(status);
    }

    fn fail(&self, error: &SyncError) {
        self.set_status(SyncStatus::Error);
        let mut stats = self.stats.write();
        stats.failures += 1;
        stats.last_error = Some(error.to_string());
    }

    async fn persist(&self) {
        if !self.is_rehydrated() {
            debug!("skipping save before rehydration");
            return;
        }
        let snapshot = self.snapshot();
        if let Err(e) = self.store.save(&snapshot).await {
            warn!(error = %e, "failed to persist localization state");
        }
    }
}
