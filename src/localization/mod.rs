//! Translation store: key → string lookup for the selected language.
//!
//! Language selection lives in `gamelang.env`; each language's strings live
//! in `game.<code>.json`. The store keeps exactly one active mapping and
//! rebuilds it wholesale when the language changes.
//!
//! The store has two meaningful states:
//! - **initialized**: a language file was loaded successfully
//! - **uninitialized**: nothing loaded yet; every lookup falls back to the key
//!
//! A failed [`TranslationStore::switch_language`] never drops the mapping
//! that is already active.

use crate::config::{ConfigManager, is_valid_language_code};
use crate::metrics::Metrics;
use crate::models::{DEFAULT_LANGUAGE_CODE, LanguageConfig, LanguageFile};
use indexmap::IndexMap;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;

/// Notifications raised by the translation store
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LanguageEvent {
    /// A different language is now active; displayed text should refresh
    Changed { code: String },
}

/// Why a language file could not become the active mapping
#[derive(Error, Debug)]
pub enum LanguageError {
    #[error("Invalid language code {0:?}")]
    InvalidCode(String),

    #[error("Language file for '{0}' not found")]
    NotFound(String),

    #[error("Failed to load language '{code}': {source:#}")]
    Parse {
        code: String,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Debug, Default)]
struct TranslationState {
    config: LanguageConfig,
    current_language: Option<String>,
    mapping: IndexMap<String, String>,
}

/// Shared, cloneable translation store.
///
/// Clones share the same mapping and notification channel, so the settings
/// store and the UI layer can each hold one.
#[derive(Clone)]
pub struct TranslationStore {
    config_manager: ConfigManager,
    state: Arc<RwLock<TranslationState>>,
    events_tx: broadcast::Sender<LanguageEvent>,
    metrics: Arc<Metrics>,
}

impl TranslationStore {
    /// Create an uninitialized store with the default language config.
    pub fn new(config_manager: ConfigManager, metrics: Arc<Metrics>) -> Self {
        let (events_tx, _) = broadcast::channel(100);
        Self {
            config_manager,
            state: Arc::new(RwLock::new(TranslationState::default())),
            events_tx,
            metrics,
        }
    }

    /// Create a store, read `gamelang.env` and load the selected language.
    ///
    /// If the selected language cannot be loaded the default language is
    /// tried once more, since a missing file triggers bootstrapping of the
    /// default language file. The store is returned either way; an
    /// uninitialized store still answers every lookup.
    pub fn initialize(config_manager: ConfigManager, metrics: Arc<Metrics>) -> Self {
        let store = Self::new(config_manager, metrics);
        let config = store.load_config();

        if !store.load_language(&config.selected) && config.selected != DEFAULT_LANGUAGE_CODE {
            tracing::warn!(
                "Falling back to default language '{}' after '{}' failed to load",
                DEFAULT_LANGUAGE_CODE,
                config.selected
            );
            store.load_language(DEFAULT_LANGUAGE_CODE);
        } else if !store.is_initialized() {
            store.load_language(DEFAULT_LANGUAGE_CODE);
        }

        if store.is_initialized() {
            tracing::info!(
                "Translations ready: language={}, entries={}",
                store.current_language().unwrap_or_default(),
                store.len()
            );
        } else {
            tracing::warn!("No translations loaded; lookups will return keys");
        }

        store
    }

    /// Read `gamelang.env` into the store.
    ///
    /// A missing or unreadable file yields the default config (selected
    /// `en`, available `[en]`).
    pub fn load_config(&self) -> LanguageConfig {
        let config = match self.config_manager.load_language_config() {
            Ok(Some(config)) => config,
            Ok(None) => {
                tracing::warn!(
                    "Language config not found at {}, using defaults",
                    self.config_manager.language_config_path()
                );
                LanguageConfig::default()
            }
            Err(e) => {
                tracing::warn!("{:#}, using default language config", e);
                LanguageConfig::default()
            }
        };

        tracing::debug!(
            "Language config: selected={}, available={:?}",
            config.selected,
            config.available
        );
        self.write(|state| state.config = config.clone());
        config
    }

    /// Load `game.<code>.json` as the active mapping.
    ///
    /// - Missing file: writes a default `gamelang.env` and default language
    ///   file if those are absent, then reports failure.
    /// - Parse failure: the active mapping is cleared and the store becomes
    ///   uninitialized.
    pub fn load_language(&self, code: &str) -> bool {
        let code = code.trim();
        match self.read_mapping(code) {
            Ok(mapping) => {
                self.commit(code, mapping);
                true
            }
            Err(e @ LanguageError::Parse { .. }) => {
                tracing::error!("{}", e);
                self.metrics.record_language_failure();
                self.write(|state| {
                    state.mapping.clear();
                    state.current_language = None;
                });
                false
            }
            Err(e) => {
                self.handle_load_failure(e);
                false
            }
        }
    }

    /// Make `code` the active language.
    ///
    /// Succeeds immediately if `code` is already active. On success the new
    /// selection is written to `gamelang.env` and [`LanguageEvent::Changed`]
    /// is broadcast. On failure the previous mapping stays active.
    pub fn switch_language(&self, code: &str) -> bool {
        let code = code.trim();
        if self.read(|state| state.current_language.as_deref() == Some(code)) {
            return true;
        }

        if !self.read(|state| state.config.is_available(code)) {
            tracing::warn!("Language '{}' is not listed as available, trying anyway", code);
        }

        match self.read_mapping(code) {
            Ok(mapping) => {
                self.commit(code, mapping);
                self.persist_selection();

                // Ignore send errors - it's OK if no one is listening
                let _ = self.events_tx.send(LanguageEvent::Changed {
                    code: code.to_string(),
                });
                true
            }
            Err(e) => {
                self.handle_load_failure(e);
                false
            }
        }
    }

    /// Translated text for `key`, or the key itself when missing.
    pub fn get(&self, key: &str) -> String {
        self.lookup(key, None)
    }

    /// Translated text for `key`, or `default` when missing.
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.lookup(key, Some(default))
    }

    fn lookup(&self, key: &str, default: Option<&str>) -> String {
        if let Some(value) = self.read(|state| state.mapping.get(key).cloned()) {
            return value;
        }

        self.metrics.record_missing_key();
        tracing::warn!(
            "Translation key '{}' not found for language '{}'",
            key,
            self.current_language().unwrap_or_default()
        );
        default.unwrap_or(key).to_string()
    }

    /// Language whose mapping is active, if any loaded successfully.
    pub fn current_language(&self) -> Option<String> {
        self.read(|state| state.current_language.clone())
    }

    /// Language named by `gamelang.env` (or the last successful switch).
    pub fn selected_language(&self) -> String {
        self.read(|state| state.config.selected.clone())
    }

    pub fn available_languages(&self) -> Vec<String> {
        self.read(|state| state.config.available.clone())
    }

    pub fn is_initialized(&self) -> bool {
        self.read(|state| state.current_language.is_some())
    }

    /// Number of entries in the active mapping.
    pub fn len(&self) -> usize {
        self.read(|state| state.mapping.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Subscribe to language change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<LanguageEvent> {
        self.events_tx.subscribe()
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Parse a language file into a fresh mapping without touching the
    /// active one.
    fn read_mapping(&self, code: &str) -> Result<IndexMap<String, String>, LanguageError> {
        if !is_valid_language_code(code) {
            return Err(LanguageError::InvalidCode(code.to_string()));
        }

        let file = self
            .config_manager
            .load_language_file(code)
            .map_err(|source| LanguageError::Parse {
                code: code.to_string(),
                source,
            })?
            .ok_or_else(|| LanguageError::NotFound(code.to_string()))?;

        let mut mapping = IndexMap::with_capacity(file.entries.len());
        for (index, entry) in file.entries.into_iter().enumerate() {
            if entry.key.trim().is_empty() {
                tracing::warn!(
                    "Skipping entry {} with empty key in language '{}'",
                    index,
                    code
                );
                continue;
            }
            // Later duplicates overwrite earlier ones
            mapping.insert(entry.key, entry.value);
        }

        Ok(mapping)
    }

    fn commit(&self, code: &str, mapping: IndexMap<String, String>) {
        let entries = mapping.len();
        self.write(|state| {
            state.mapping = mapping;
            state.current_language = Some(code.to_string());
            state.config.selected = code.to_string();
            if !state.config.is_available(code) {
                state.config.available.push(code.to_string());
            }
        });
        self.metrics.record_language_loaded();
        tracing::info!("Loaded language '{}' ({} entries)", code, entries);
    }

    fn handle_load_failure(&self, error: LanguageError) {
        self.metrics.record_language_failure();
        match error {
            LanguageError::NotFound(code) => {
                tracing::error!(
                    "Language file for '{}' not found in {}",
                    code,
                    self.config_manager.data_dir()
                );
                self.bootstrap_defaults();
            }
            other => tracing::error!("{}", other),
        }
    }

    /// Write a default `gamelang.env` and default language file where they
    /// are missing, so the next start has something to load.
    fn bootstrap_defaults(&self) {
        if !self.config_manager.language_config_path().exists() {
            match self
                .config_manager
                .save_language_config(&LanguageConfig::default())
            {
                Ok(()) => tracing::info!(
                    "Created default language config at {}",
                    self.config_manager.language_config_path()
                ),
                Err(e) => tracing::error!("Could not create default language config: {:#}", e),
            }
        }

        let default_file_exists = self
            .config_manager
            .language_file_path(DEFAULT_LANGUAGE_CODE)
            .map(|path| path.exists())
            .unwrap_or(false);

        if !default_file_exists {
            match self
                .config_manager
                .save_language_file(DEFAULT_LANGUAGE_CODE, &LanguageFile::bootstrap())
            {
                Ok(()) => tracing::info!(
                    "Created default language file for '{}'",
                    DEFAULT_LANGUAGE_CODE
                ),
                Err(e) => tracing::error!("Could not create default language file: {:#}", e),
            }
        }
    }

    /// Write the selection while holding the state lock so concurrent
    /// switches land on disk in the order they were committed.
    fn persist_selection(&self) {
        let state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = self.config_manager.save_language_config(&state.config) {
            tracing::error!("Failed to save language selection: {:#}", e);
        }
    }

    fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&TranslationState) -> R,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    fn write<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut TranslationState) -> R,
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TranslationEntry;
    use camino::Utf8PathBuf;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_store() -> (TranslationStore, ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let manager = ConfigManager::new(&path).unwrap();
        let store = TranslationStore::new(manager.clone(), Arc::new(Metrics::new()));
        (store, manager, temp_dir)
    }

    fn language_file(pairs: &[(&str, &str)]) -> LanguageFile {
        LanguageFile {
            entries: pairs
                .iter()
                .map(|(key, value)| TranslationEntry {
                    key: key.to_string(),
                    value: value.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_uninitialized_returns_key() {
        let (store, _manager, _temp_dir) = create_test_store();

        assert!(!store.is_initialized());
        assert_eq!(store.get("menu_play"), "menu_play");
        assert_eq!(store.get_or("menu_play", "Play"), "Play");
    }

    #[test]
    fn test_load_language_builds_mapping() {
        let (store, manager, _temp_dir) = create_test_store();
        manager
            .save_language_file("tr", &language_file(&[("hello", "Merhaba")]))
            .unwrap();

        assert!(store.load_language("tr"));
        assert!(store.is_initialized());
        assert_eq!(store.current_language().as_deref(), Some("tr"));
        assert_eq!(store.get("hello"), "Merhaba");
        assert_eq!(store.get("missing"), "missing");
    }

    #[test]
    fn test_duplicate_keys_last_write_wins() {
        let (store, manager, _temp_dir) = create_test_store();
        manager
            .save_language_file("en", &language_file(&[("a", "first"), ("b", "x"), ("a", "second")]))
            .unwrap();

        assert!(store.load_language("en"));
        assert_eq!(store.get("a"), "second");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_empty_keys_skipped() {
        let (store, manager, _temp_dir) = create_test_store();
        fs::write(
            manager.language_file_path("en").unwrap(),
            r#"{"entries":[{"key":"","value":"x"},{"value":"y"},{"key":"ok","value":"z"}]}"#,
        )
        .unwrap();

        assert!(store.load_language("en"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("ok"), "z");
    }

    #[test]
    fn test_missing_file_bootstraps_defaults() {
        let (store, manager, _temp_dir) = create_test_store();

        assert!(!store.load_language("de"));
        assert!(!store.is_initialized());
        assert!(manager.language_config_path().exists());
        assert!(manager.language_file_path("en").unwrap().exists());
        assert!(!manager.language_file_path("de").unwrap().exists());
    }

    #[test]
    fn test_parse_failure_clears_mapping() {
        let (store, manager, _temp_dir) = create_test_store();
        manager
            .save_language_file("en", &language_file(&[("hello", "Hello")]))
            .unwrap();
        assert!(store.load_language("en"));

        fs::write(manager.language_file_path("en").unwrap(), "{ broken").unwrap();

        assert!(!store.load_language("en"));
        assert!(store.is_empty());
        assert!(!store.is_initialized());
    }

    #[test]
    fn test_failed_switch_keeps_previous_mapping() {
        let (store, manager, _temp_dir) = create_test_store();
        manager
            .save_language_file("en", &language_file(&[("hello", "Hello")]))
            .unwrap();
        fs::write(manager.language_file_path("xx").unwrap(), "not json").unwrap();
        assert!(store.load_language("en"));

        assert!(!store.switch_language("xx"));
        assert!(!store.switch_language("../etc"));

        assert_eq!(store.current_language().as_deref(), Some("en"));
        assert_eq!(store.get("hello"), "Hello");
    }

    #[test]
    fn test_switch_to_active_language_is_noop() {
        let (store, manager, _temp_dir) = create_test_store();
        manager
            .save_language_file("en", &language_file(&[("hello", "Hello")]))
            .unwrap();
        assert!(store.load_language("en"));
        let mut rx = store.subscribe();

        assert!(store.switch_language("en"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_switch_broadcasts_and_persists_selection() {
        let (store, manager, _temp_dir) = create_test_store();
        manager
            .save_language_file("en", &language_file(&[("hello", "Hello")]))
            .unwrap();
        manager
            .save_language_file("tr", &language_file(&[("hello", "Merhaba")]))
            .unwrap();
        manager
            .save_language_config(&LanguageConfig {
                selected: "en".to_string(),
                available: vec!["en".to_string(), "tr".to_string()],
            })
            .unwrap();
        store.load_config();
        assert!(store.load_language("en"));
        let mut rx = store.subscribe();

        assert!(store.switch_language("tr"));

        assert_eq!(
            rx.try_recv().unwrap(),
            LanguageEvent::Changed {
                code: "tr".to_string()
            }
        );
        assert_eq!(store.get("hello"), "Merhaba");
        let saved = manager.load_language_config().unwrap().unwrap();
        assert_eq!(saved.selected, "tr");
        assert_eq!(saved.available, vec!["en", "tr"]);
    }

    #[test]
    fn test_initialize_on_empty_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let manager = ConfigManager::new(&path).unwrap();

        let store = TranslationStore::initialize(manager.clone(), Arc::new(Metrics::new()));

        assert!(store.is_initialized());
        assert_eq!(store.current_language().as_deref(), Some("en"));
        assert_eq!(store.get("menu_play"), "Play");
        assert_eq!(store.available_languages(), vec!["en"]);
    }
}
