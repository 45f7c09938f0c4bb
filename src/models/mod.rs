//! Data models for the settings and translation stores.
//!
//! - [`Settings`]: the persisted graphics/audio/language record (`gamesettings.json`)
//! - [`WindowMode`] / [`DisplayMode`]: display state exchanged with the display backend
//! - [`LanguageConfig`]: selected and available language codes (`gamelang.env`)
//! - [`LanguageFile`]: one language's `{key, value}` entries (`game.<code>.json`)
//!
//! All file-backed structs derive `Serialize`/`Deserialize`; the stores in
//! [`crate::state`] and [`crate::localization`] own the live instances.

pub mod language;
pub mod settings;

pub use language::{LanguageConfig, LanguageFile, TranslationEntry};
pub use settings::{
    ANTI_ALIASING_LEVELS, DEFAULT_LANGUAGE_CODE, DEFAULT_MASTER_VOLUME, DEFAULT_MUSIC_VOLUME,
    DEFAULT_SFX_VOLUME, DisplayMode, MAX_TEXTURE_QUALITY, Settings, WindowMode, clamp_volume,
    is_valid_anti_aliasing,
};
