//! In-memory localization cache and its persisted snapshot.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Translated strings keyed by dotted key (e.g. `auth.welcome_message`).
pub type Translations = BTreeMap<String, String>;

/// Currency metadata keyed by currency code.
pub type Currencies = BTreeMap<String, serde_json::Value>;

/// Languages written right to left.
pub const RTL_LANGUAGES: &[&str] = &["ar", "ur", "he", "fa", "yi"];

/// Returns true if `code` names a right-to-left language.
///
/// Only the primary subtag is considered, so `ar-EG` and `fa_IR` are RTL.
pub fn is_rtl_language(code: &str) -> bool {
    let primary = code.split(['-', '_']).next().unwrap_or_default();
    RTL_LANGUAGES
        .iter()
        .any(|rtl| rtl.eq_ignore_ascii_case(primary))
}

/// Lifecycle phase of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Nothing has been reconciled yet.
    #[default]
    Idle,
    /// A reconciliation is in flight.
    Loading,
    /// The cache is valid for the current language.
    Ready,
    /// The last init or reconciliation failed.
    Error,
}

impl SyncStatus {
    /// Returns true while a reconciliation is running.
    pub fn is_loading(&self) -> bool {
        matches!(self, SyncStatus::Loading)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncStatus::Idle => "idle",
            SyncStatus::Loading => "loading",
            SyncStatus::Ready => "ready",
            SyncStatus::Error => "error",
        };
        f.write_str(name)
    }
}

/// The persisted subset of [`LocalizationCache`].
///
/// Serialized as JSON with the field names below. Missing fields take
/// their defaults so snapshots written by older builds still load.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedSnapshot {
    /// Cached translations for `current_lang`.
    pub translations: Translations,
    /// Cached currency dataset.
    pub currencies: Currencies,
    /// Selected language.
    pub current_lang: Option<String>,
    /// Direction flag derived from `current_lang`.
    #[serde(rename = "isRTL")]
    pub is_rtl: bool,
    /// Last synced translation version.
    pub translation_version: u64,
    /// Last synced currency version.
    pub currency_version: u64,
}

/// The engine's mutable state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocalizationCache {
    /// Lifecycle phase. Never persisted.
    pub status: SyncStatus,
    /// Selected language, unset until init or restore provides one.
    pub current_lang: Option<String>,
    /// Translations for `current_lang` only.
    pub translations: Translations,
    /// Currency dataset.
    pub currencies: Currencies,
    /// Whether `current_lang` is right to left.
    pub is_rtl: bool,
    /// Last synced translation version.
    pub translation_version: u64,
    /// Last synced currency version.
    pub currency_version: u64,
}

impl LocalizationCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the persisted subset.
    pub fn snapshot(&self) -> PersistedSnapshot {
        PersistedSnapshot {
            translations: self.translations.clone(),
            currencies: self.currencies.clone(),
            current_lang: self.current_lang.clone(),
            is_rtl: self.is_rtl,
            translation_version: self.translation_version,
            currency_version: self.currency_version,
        }
    }

    /// Overwrites the persisted fields from a snapshot. Status is untouched.
    ///
    /// A snapshot without a language keeps the current one, and its
    /// translations are dropped since they cannot belong to any language.
    pub fn restore(&mut self, snapshot: PersistedSnapshot) {
        self.currencies = snapshot.currencies;
        self.currency_version = snapshot.currency_version;

        match snapshot.current_lang {
            Some(lang) => {
                self.is_rtl = is_rtl_language(&lang);
                self.current_lang = Some(lang);
                self.translations = snapshot.translations;
                self.translation_version = snapshot.translation_version;
            }
            None => {
                self.translations.clear();
                self.translation_version = 0;
            }
        }
    }

    /// Switches to `lang`, clearing translations and resetting the
    /// translation version in the same step.
    pub fn select_language(&mut self, lang: &str) {
        self.current_lang = Some(lang.to_string());
        self.is_rtl = is_rtl_language(lang);
        self.translations.clear();
        self.translation_version = 0;
    }

    /// Installs freshly fetched content. Versions never move backwards.
    pub fn commit_fetch(
        &mut self,
        translations: Translations,
        currencies: Option<Currencies>,
        translation_version: u64,
        currency_version: u64,
    ) {
        self.translations = translations;
        if let Some(currencies) = currencies {
            self.currencies = currencies;
        }
        self.translation_version = self.translation_version.max(translation_version);
        self.currency_version = self.currency_version.max(currency_version);
    }

    /// Resolves `key`, falling back to the key itself when it is missing
    /// or maps to an empty string.
    pub fn lookup<'a>(&'a self, key: &'a str) -> &'a str {
        lookup(&self.translations, key)
    }
}

pub(crate) fn lookup<'a>(translations: &'a Translations, key: &'a str) -> &'a str {
    match translations.get(key) {
        Some(value) if !value.is_empty() => value,
        _ => key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translations(pairs: &[(&str, &str)]) -> Translations {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn rtl_detection() {
        for code in ["ar", "ur", "he", "fa", "yi", "AR", "ar-EG", "fa_IR"] {
            assert!(is_rtl_language(code), "{code} should be rtl");
        }
        for code in ["en", "fr", "arn", "", "en-AR"] {
            assert!(!is_rtl_language(code), "{code} should be ltr");
        }
    }

    #[test]
    fn select_language_resets_translation_state() {
        let mut cache = LocalizationCache::new();
        cache.select_language("en");
        cache.commit_fetch(translations(&[("a", "A")]), None, 4, 2);

        cache.select_language("he");

        assert_eq!(cache.current_lang.as_deref(), Some("he"));
        assert!(cache.is_rtl);
        assert!(cache.translations.is_empty());
        assert_eq!(cache.translation_version, 0);
        assert_eq!(cache.currency_version, 2);
    }

    #[test]
    fn commit_keeps_currencies_when_not_fetched() {
        let mut cache = LocalizationCache::new();
        cache.currencies.insert("USD".into(), serde_json::json!({"symbol": "$"}));

        cache.commit_fetch(translations(&[("a", "A")]), None, 1, 1);
        assert!(cache.currencies.contains_key("USD"));

        cache.commit_fetch(translations(&[("a", "A")]), Some(Currencies::new()), 1, 1);
        assert!(cache.currencies.is_empty());
    }

    #[test]
    fn commit_never_lowers_versions() {
        let mut cache = LocalizationCache::new();
        cache.commit_fetch(Translations::new(), None, 7, 3);
        cache.commit_fetch(Translations::new(), None, 5, 1);

        assert_eq!(cache.translation_version, 7);
        assert_eq!(cache.currency_version, 3);
    }

    #[test]
    fn lookup_falls_back_to_key() {
        let mut cache = LocalizationCache::new();
        cache.translations = translations(&[("auth.welcome", "Welcome"), ("auth.blank", "")]);

        assert_eq!(cache.lookup("auth.welcome"), "Welcome");
        assert_eq!(cache.lookup("auth.missing"), "auth.missing");
        assert_eq!(cache.lookup("auth.blank"), "auth.blank");
    }

    #[test]
    fn snapshot_json_shape() {
        let mut cache = LocalizationCache::new();
        cache.select_language("ar");
        cache.commit_fetch(translations(&[("k", "v")]), None, 3, 1);
        cache.status = SyncStatus::Ready;

        let json = serde_json::to_value(cache.snapshot()).unwrap();
        let object = json.as_object().unwrap();

        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            [
                "currencies",
                "currencyVersion",
                "currentLang",
                "isRTL",
                "translationVersion",
                "translations"
            ]
        );
        assert_eq!(object["isRTL"], serde_json::Value::Bool(true));
    }

    #[test]
    fn snapshot_round_trip_through_fresh_cache() {
        let mut persisted = LocalizationCache::new();
        persisted.select_language("fa");
        persisted.commit_fetch(
            translations(&[("home.title", "خانه")]),
            Some(Currencies::from([(
                "IRR".to_string(),
                serde_json::json!({"decimals": 0}),
            )])),
            9,
            4,
        );

        let bytes = serde_json::to_vec(&persisted.snapshot()).unwrap();
        let decoded: PersistedSnapshot = serde_json::from_slice(&bytes).unwrap();

        let mut fresh = LocalizationCache::new();
        fresh.restore(decoded);

        assert_eq!(fresh.snapshot(), persisted.snapshot());
        assert_eq!(fresh.status, SyncStatus::Idle);
    }

    #[test]
    fn snapshot_tolerates_missing_fields() {
        let decoded: PersistedSnapshot =
            serde_json::from_str(r#"{"currentLang":"en","translationVersion":2}"#).unwrap();

        assert_eq!(decoded.current_lang.as_deref(), Some("en"));
        assert_eq!(decoded.translation_version, 2);
        assert!(decoded.translations.is_empty());
        assert_eq!(decoded.currency_version, 0);
    }

    #[test]
    fn restore_without_language_keeps_current() {
        let mut cache = LocalizationCache::new();
        cache.select_language("en");

        cache.restore(PersistedSnapshot {
            translations: translations(&[("orphan", "x")]),
            translation_version: 5,
            currency_version: 2,
            ..Default::default()
        });

        assert_eq!(cache.current_lang.as_deref(), Some("en"));
        assert!(cache.translations.is_empty());
        assert_eq!(cache.translation_version, 0);
        assert_eq!(cache.currency_version, 2);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SyncStatus::Loading).unwrap(),
            "\"loading\""
        );
        assert_eq!(SyncStatus::Error.to_string(), "error");
    }
}
