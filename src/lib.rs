// fps-settings - Persisted display, audio and language preferences
//
// This is the library crate containing the settings and translation stores.
// The binary crate (main.rs) is the composition root that wires them to the
// engine backends.

pub mod config;
pub mod engine;
pub mod localization;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod state;

// Re-export commonly used types for convenience
pub use config::{AppConfig, ConfigManager};
pub use engine::{AudioMixer, DisplayBackend, EngineError, HeadlessDisplay, HeadlessMixer};
pub use localization::{LanguageEvent, TranslationStore};
pub use metrics::Metrics;
pub use models::{DisplayMode, LanguageConfig, LanguageFile, Settings, WindowMode};
pub use state::{SettingsChange, SettingsError, SettingsStore};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
