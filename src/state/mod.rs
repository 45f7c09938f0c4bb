// Settings state management
//
// SettingsStore owns the single live Settings record. Every setter follows
// the same path: validate, compare, mutate, apply the one field, persist the
// whole record, emit change events.

pub mod apply;
pub mod changes;

pub use apply::{apply_engine_field, default_settings, sync_from_preset};
pub use changes::{SettingField, SettingsChange, detect_changes};

use crate::config::ConfigManager;
use crate::engine::{AudioMixer, DisplayBackend, EngineError};
use crate::localization::TranslationStore;
use crate::metrics::Metrics;
use crate::models::{
    DEFAULT_LANGUAGE_CODE, MAX_TEXTURE_QUALITY, Settings, WindowMode, clamp_volume,
    is_valid_anti_aliasing,
};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use thiserror::Error;
use tokio::sync::broadcast;

/// Reasons a setter refused a value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("Anti-aliasing level {0} is not one of 0, 2, 4, 8")]
    InvalidAntiAliasing(u8),

    #[error("Quality preset {index} out of range (have {count})")]
    InvalidQualityPreset { index: usize, count: usize },

    #[error("Invalid resolution {width}x{height}@{refresh_rate}")]
    InvalidResolution {
        width: u32,
        height: u32,
        refresh_rate: u32,
    },

    #[error("Volume must be a number, got {0}")]
    InvalidVolume(f32),

    #[error("Language code must not be empty")]
    EmptyLanguageCode,

    #[error("Could not switch to language '{requested}', '{active}' remains active")]
    LanguageSwitchFailed { requested: String, active: String },

    #[error("Engine rejected setting: {0}")]
    Engine(#[from] EngineError),
}

/// Outcome of a setter: the events emitted, empty when the value was unchanged
pub type SettingsResult = Result<Vec<SettingsChange>, SettingsError>;

/// Persisted settings with apply-on-change semantics
///
/// This is the central settings component that:
/// - Loads `gamesettings.json` (or engine-derived defaults) and applies every
///   field once during [`initialize()`](Self::initialize)
/// - Validates and clamps setter input, ignoring values equal to the current one
/// - Applies each changed field to the engine and persists the whole record
/// - Emits [`SettingsChange`] events to subscribers
///
/// Persistence failures are logged and swallowed; the in-memory record stays
/// authoritative for the rest of the session.
///
/// The store is cheap to clone; clones share the same record.
#[derive(Clone)]
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    config_manager: ConfigManager,
    translations: TranslationStore,
    display: Arc<dyn DisplayBackend + Send + Sync>,
    mixer: Arc<dyn AudioMixer + Send + Sync>,
    changes_tx: broadcast::Sender<SettingsChange>,
    metrics: Arc<Metrics>,
}

impl SettingsStore {
    /// Load the record and apply it to the engine.
    ///
    /// The returned store is fully initialized; UI code can register its
    /// listeners right away.
    pub fn initialize(
        config_manager: ConfigManager,
        translations: TranslationStore,
        display: Arc<dyn DisplayBackend + Send + Sync>,
        mixer: Arc<dyn AudioMixer + Send + Sync>,
    ) -> Self {
        let settings = load_settings(&config_manager, &translations, display.as_ref());
        let metrics = Arc::clone(translations.metrics());
        let (changes_tx, _) = broadcast::channel(100);

        let store = Self {
            settings: Arc::new(RwLock::new(settings)),
            config_manager,
            translations,
            display,
            mixer,
            changes_tx,
            metrics,
        };

        store.apply_all();

        tracing::info!(
            "Settings initialized: {}x{}@{} {}, preset={}, language={}",
            store.read(|s| s.resolution_width),
            store.read(|s| s.resolution_height),
            store.read(|s| s.refresh_rate),
            store.read(|s| s.window_mode),
            store.read(|s| s.quality_preset_index),
            store.read(|s| s.selected_language_code.clone())
        );

        store
    }

    /// Read the persisted record, falling back to defaults when the file is
    /// missing or cannot be parsed. Does not modify the live record.
    pub fn load(&self) -> Settings {
        load_settings(&self.config_manager, &self.translations, self.display.as_ref())
    }

    /// Defaults derived from the engine's current state.
    pub fn defaults(&self) -> Settings {
        default_settings(
            self.display.as_ref(),
            &self.translations.selected_language(),
        )
    }

    /// Push every field of the live record to the engine.
    ///
    /// Fields are applied in [`SettingField::APPLY_ORDER`]. A field the engine
    /// rejects is logged and skipped; the rest are still applied. Because a
    /// quality preset overwrites vsync, anti-aliasing and texture limits, those
    /// are pushed again afterwards if the engine no longer matches the record.
    pub fn apply_all(&self) {
        let mut settings = self.write_lock();
        self.apply_fields(&mut settings);
    }

    /// Write the live record to `gamesettings.json`.
    ///
    /// # Returns
    /// `false` if the write failed (the failure is logged, not propagated)
    pub fn save(&self) -> bool {
        let settings = self.write_lock();
        self.persist(&settings)
    }

    /// Replace the record with defaults, apply everything and persist.
    pub fn reset_to_defaults(&self) -> Vec<SettingsChange> {
        let defaults = self.defaults();
        let mut settings = self.write_lock();
        let old = std::mem::replace(&mut *settings, defaults);

        self.apply_fields(&mut settings);
        self.persist(&settings);

        let mut changes = detect_changes(&old, &settings);
        changes.push(SettingsChange::SettingsReset);
        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.changes_tx.send(change.clone());
        }

        tracing::info!("Settings reset to defaults");
        changes
    }

    // Setters

    pub fn set_vsync(&self, enabled: bool) -> SettingsResult {
        self.update_field(SettingField::VSync, |s| s.vsync_enabled = enabled)
    }

    /// Set the anti-aliasing sample count; only 0, 2, 4 and 8 are accepted.
    pub fn set_anti_aliasing(&self, level: u8) -> SettingsResult {
        if !is_valid_anti_aliasing(level) {
            tracing::warn!("Rejecting anti-aliasing level {}", level);
            return Err(SettingsError::InvalidAntiAliasing(level));
        }
        self.update_field(SettingField::AntiAliasing, |s| s.anti_aliasing_level = level)
    }

    /// Set the texture mipmap limit, clamped to `0..=3`.
    pub fn set_texture_quality(&self, quality: u8) -> SettingsResult {
        let quality = quality.min(MAX_TEXTURE_QUALITY);
        self.update_field(SettingField::TextureQuality, |s| s.texture_quality = quality)
    }

    /// Apply a quality preset by index into [`quality_preset_names()`](Self::quality_preset_names).
    ///
    /// The values the preset changes (vsync, anti-aliasing, texture quality)
    /// are read back into the record.
    pub fn set_quality_preset(&self, index: usize) -> SettingsResult {
        let count = self.display.quality_preset_names().len();
        if index >= count {
            tracing::warn!("Rejecting quality preset {} (have {})", index, count);
            return Err(SettingsError::InvalidQualityPreset { index, count });
        }
        self.update_field(SettingField::QualityPreset, |s| {
            s.quality_preset_index = index
        })
    }

    pub fn set_resolution(&self, width: u32, height: u32, refresh_rate: u32) -> SettingsResult {
        if width == 0 || height == 0 || refresh_rate == 0 {
            return Err(SettingsError::InvalidResolution {
                width,
                height,
                refresh_rate,
            });
        }
        self.update_field(SettingField::DisplayMode, |s| {
            s.resolution_width = width;
            s.resolution_height = height;
            s.refresh_rate = refresh_rate;
        })
    }

    pub fn set_window_mode(&self, mode: WindowMode) -> SettingsResult {
        self.update_field(SettingField::DisplayMode, |s| s.window_mode = mode)
    }

    /// Set the master volume, clamped to `[0, 1]`.
    pub fn set_master_volume(&self, volume: f32) -> SettingsResult {
        let volume = clamp_volume(volume).ok_or(SettingsError::InvalidVolume(volume))?;
        self.update_field(SettingField::MasterVolume, |s| s.master_volume = volume)
    }

    /// Set the music volume, clamped to `[0, 1]`.
    pub fn set_music_volume(&self, volume: f32) -> SettingsResult {
        let volume = clamp_volume(volume).ok_or(SettingsError::InvalidVolume(volume))?;
        self.update_field(SettingField::MusicVolume, |s| s.music_volume = volume)
    }

    /// Set the SFX volume, clamped to `[0, 1]`.
    pub fn set_sfx_volume(&self, volume: f32) -> SettingsResult {
        let volume = clamp_volume(volume).ok_or(SettingsError::InvalidVolume(volume))?;
        self.update_field(SettingField::SfxVolume, |s| s.sfx_volume = volume)
    }

    /// Switch the UI language.
    ///
    /// If the translation store cannot switch, the stored code follows
    /// whatever language the translation store actually has active, and the
    /// record is only persisted if that differs from the previous code.
    pub fn set_language(&self, code: &str) -> SettingsResult {
        let code = code.trim();
        if code.is_empty() {
            return Err(SettingsError::EmptyLanguageCode);
        }

        let previous = self.read(|s| s.selected_language_code.clone());
        if previous == code {
            return Ok(Vec::new());
        }

        let switched = self.translations.switch_language(code);
        let effective = if switched {
            self.metrics.record_field_applied();
            code.to_string()
        } else {
            self.metrics.record_apply_failure();
            self.translations
                .current_language()
                .unwrap_or_else(|| previous.clone())
        };

        let changes = if effective != previous {
            let mut settings = self.write_lock();
            let old = settings.clone();
            settings.selected_language_code = effective.clone();
            self.finish_update(&old, &settings)
        } else {
            Vec::new()
        };

        if switched {
            Ok(changes)
        } else {
            tracing::warn!(
                "Language switch to '{}' failed, keeping '{}'",
                code,
                effective
            );
            Err(SettingsError::LanguageSwitchFailed {
                requested: code.to_string(),
                active: effective,
            })
        }
    }

    // Getters

    pub fn vsync_enabled(&self) -> bool {
        self.read(|s| s.vsync_enabled)
    }

    pub fn anti_aliasing_level(&self) -> u8 {
        self.read(|s| s.anti_aliasing_level)
    }

    pub fn texture_quality(&self) -> u8 {
        self.read(|s| s.texture_quality)
    }

    pub fn quality_preset_index(&self) -> usize {
        self.read(|s| s.quality_preset_index)
    }

    /// Width, height and refresh rate.
    pub fn resolution(&self) -> (u32, u32, u32) {
        self.read(|s| (s.resolution_width, s.resolution_height, s.refresh_rate))
    }

    pub fn window_mode(&self) -> WindowMode {
        self.read(|s| s.window_mode)
    }

    pub fn master_volume(&self) -> f32 {
        self.read(|s| s.master_volume)
    }

    pub fn music_volume(&self) -> f32 {
        self.read(|s| s.music_volume)
    }

    pub fn sfx_volume(&self) -> f32 {
        self.read(|s| s.sfx_volume)
    }

    pub fn language_code(&self) -> String {
        self.read(|s| s.selected_language_code.clone())
    }

    pub fn quality_preset_names(&self) -> Vec<String> {
        self.display.quality_preset_names()
    }

    pub fn available_languages(&self) -> Vec<String> {
        self.translations.available_languages()
    }

    /// Get a copy of the live record
    pub fn snapshot(&self) -> Settings {
        self.read(Settings::clone)
    }

    /// Execute a function with read access to the record
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Settings) -> R,
    {
        let settings = self.settings.read().unwrap_or_else(PoisonError::into_inner);
        f(&settings)
    }

    /// Subscribe to settings change events
    pub fn subscribe(&self) -> broadcast::Receiver<SettingsChange> {
        self.changes_tx.subscribe()
    }

    pub fn translations(&self) -> &TranslationStore {
        &self.translations
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn config_manager(&self) -> &ConfigManager {
        &self.config_manager
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, Settings> {
        self.settings.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate, apply the one field, persist and emit events.
    ///
    /// The write lock is held until the record is on disk, so concurrent
    /// setters persist in the order they mutate. If the engine rejects the
    /// new value the record is restored.
    fn update_field<F>(&self, field: SettingField, mutate: F) -> SettingsResult
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.write_lock();
        let old = settings.clone();
        mutate(&mut settings);

        if *settings == old {
            return Ok(Vec::new());
        }

        if let Err(e) =
            apply_engine_field(field, &settings, self.display.as_ref(), self.mixer.as_ref())
        {
            tracing::warn!("Engine rejected {:?}: {}", field, e);
            self.metrics.record_apply_failure();
            *settings = old;
            return Err(SettingsError::Engine(e));
        }
        self.metrics.record_field_applied();

        if field == SettingField::QualityPreset {
            sync_from_preset(&mut settings, self.display.as_ref());
        }

        Ok(self.finish_update(&old, &settings))
    }

    /// Persist `new` and emit events; callers hold the write lock.
    fn finish_update(&self, old: &Settings, new: &Settings) -> Vec<SettingsChange> {
        self.persist(new);

        let changes = detect_changes(old, new);
        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.changes_tx.send(change.clone());
        }
        changes
    }

    fn persist(&self, settings: &Settings) -> bool {
        match self.config_manager.save_settings(settings) {
            Ok(()) => {
                self.metrics.record_settings_saved();
                true
            }
            Err(e) => {
                self.metrics.record_save_failure();
                tracing::error!("Failed to persist settings: {:#}", e);
                false
            }
        }
    }

    fn apply_fields(&self, settings: &mut Settings) {
        for field in SettingField::APPLY_ORDER {
            match field {
                SettingField::Language => self.apply_language(settings),
                SettingField::QualityPreset => {
                    self.apply_field_logged(field, settings);
                    self.restore_preset_overrides(settings);
                }
                _ => self.apply_field_logged(field, settings),
            }
        }
    }

    fn apply_field_logged(&self, field: SettingField, settings: &Settings) {
        match apply_engine_field(field, settings, self.display.as_ref(), self.mixer.as_ref()) {
            Ok(()) => self.metrics.record_field_applied(),
            Err(e) => {
                self.metrics.record_apply_failure();
                tracing::warn!("Skipping {:?} during apply: {}", field, e);
            }
        }
    }

    fn restore_preset_overrides(&self, settings: &Settings) {
        let display = self.display.as_ref();

        if (display.vsync_count() > 0) != settings.vsync_enabled {
            self.apply_field_logged(SettingField::VSync, settings);
        }
        if display.anti_aliasing() != settings.anti_aliasing_level {
            self.apply_field_logged(SettingField::AntiAliasing, settings);
        }
        if display.texture_mipmap_limit() != settings.texture_quality {
            self.apply_field_logged(SettingField::TextureQuality, settings);
        }
    }

    fn apply_language(&self, settings: &mut Settings) {
        let requested = settings.selected_language_code.clone();
        if self.translations.switch_language(&requested) {
            self.metrics.record_field_applied();
            return;
        }

        self.metrics.record_apply_failure();
        if let Some(active) = self.translations.current_language() {
            tracing::warn!(
                "Language '{}' unavailable, settings now follow '{}'",
                requested,
                active
            );
            settings.selected_language_code = active;
        } else {
            tracing::warn!("Language '{}' unavailable and no translations loaded", requested);
        }
    }
}

/// Read `gamesettings.json`, or build defaults if it is missing or corrupt.
fn load_settings(
    config_manager: &ConfigManager,
    translations: &TranslationStore,
    display: &dyn DisplayBackend,
) -> Settings {
    let fallback_language = || {
        let selected = translations.selected_language();
        if selected.trim().is_empty() {
            DEFAULT_LANGUAGE_CODE.to_string()
        } else {
            selected
        }
    };

    match config_manager.load_settings() {
        Ok(Some(mut settings)) => {
            if settings.selected_language_code.trim().is_empty() {
                settings.selected_language_code = fallback_language();
            }
            if settings.clamp_to_ranges() {
                tracing::warn!(
                    "Out-of-range values in {} were clamped",
                    config_manager.settings_path()
                );
            }
            tracing::info!("Loaded settings from {}", config_manager.settings_path());
            settings
        }
        Ok(None) => {
            tracing::info!(
                "Settings file not found at {}, using defaults",
                config_manager.settings_path()
            );
            default_settings(display, &fallback_language())
        }
        Err(e) => {
            tracing::warn!("{:#}, using defaults", e);
            default_settings(display, &fallback_language())
        }
    }
}
