// Store metrics
//
// Lightweight counters for what the stores actually pushed to the engine and
// to disk. Logged on shutdown; tests use them to check that no-op setters
// neither re-apply nor re-save.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters shared by [`crate::state::SettingsStore`] and
/// [`crate::localization::TranslationStore`].
///
/// Uses relaxed atomics; values are diagnostic, not synchronization.
#[derive(Debug)]
pub struct Metrics {
    /// Settings fields pushed to the engine successfully
    pub fields_applied: AtomicU64,

    /// Engine calls that were rejected or skipped
    pub apply_failures: AtomicU64,

    /// Successful writes of `gamesettings.json`
    pub settings_saved: AtomicU64,

    /// Failed writes of `gamesettings.json`
    pub save_failures: AtomicU64,

    /// Successful language loads (initial load and switches)
    pub languages_loaded: AtomicU64,

    /// Failed language loads
    pub language_failures: AtomicU64,

    /// Translation lookups that fell back to a default or the key
    pub missing_keys: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            fields_applied: AtomicU64::new(0),
            apply_failures: AtomicU64::new(0),
            settings_saved: AtomicU64::new(0),
            save_failures: AtomicU64::new(0),
            languages_loaded: AtomicU64::new(0),
            language_failures: AtomicU64::new(0),
            missing_keys: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_field_applied(&self) {
        self.fields_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_apply_failure(&self) {
        self.apply_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_settings_saved(&self) {
        self.settings_saved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_save_failure(&self) {
        self.save_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_language_loaded(&self) {
        self.languages_loaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_language_failure(&self) {
        self.language_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_missing_key(&self) {
        self.missing_keys.fetch_add(1, Ordering::Relaxed);
    }

    pub fn saves(&self) -> u64 {
        self.settings_saved.load(Ordering::Relaxed)
    }

    pub fn applies(&self) -> u64 {
        self.fields_applied.load(Ordering::Relaxed)
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Settings Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Fields applied: {}, apply failures: {}",
            self.fields_applied.load(Ordering::Relaxed),
            self.apply_failures.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Settings saved: {}, save failures: {}",
            self.settings_saved.load(Ordering::Relaxed),
            self.save_failures.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Languages loaded: {}, failures: {}, missing keys: {}",
            self.languages_loaded.load(Ordering::Relaxed),
            self.language_failures.load(Ordering::Relaxed),
            self.missing_keys.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
