//! Engine collaborators the stores push settings into.
//!
//! The stores never talk to a renderer or audio device directly. They go
//! through two narrow traits:
//!
//! - [`DisplayBackend`]: quality presets, vsync, anti-aliasing, texture
//!   mipmap limit and the display mode (resolution, refresh rate, window mode)
//! - [`AudioMixer`]: named float parameters, in decibels
//!
//! [`headless`] provides in-process implementations that record every call.
//! The binary uses them when no renderer is attached, and the tests use them
//! to observe what was applied.

pub mod audio;
pub mod headless;

pub use audio::{
    MASTER_VOLUME_PARAM, MIN_AUDIBLE_VOLUME, MUSIC_VOLUME_PARAM, SFX_VOLUME_PARAM, SILENCE_DB,
    linear_to_db,
};
pub use headless::{EngineCall, HeadlessDisplay, HeadlessMixer, QualityPreset};

use crate::models::DisplayMode;
use thiserror::Error;

/// Errors reported by engine collaborators
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Quality preset index {index} out of range (have {count})")]
    PresetOutOfRange { index: usize, count: usize },

    #[error("Unsupported anti-aliasing level {0}")]
    UnsupportedAntiAliasing(u8),

    #[error("Unsupported texture mipmap limit {0}")]
    UnsupportedTextureLimit(u8),

    #[error("Unsupported display mode {width}x{height}@{refresh_rate}")]
    UnsupportedDisplayMode {
        width: u32,
        height: u32,
        refresh_rate: u32,
    },

    #[error("Unknown mixer parameter {0}")]
    UnknownParameter(String),

    #[error("Engine backend error: {0}")]
    Backend(String),
}

/// Display and quality mutators.
///
/// Getters report the engine's current state and are used to derive default
/// settings and to resynchronize the record after a quality preset changes
/// several values at once.
#[cfg_attr(test, mockall::automock)]
pub trait DisplayBackend {
    fn quality_preset_names(&self) -> Vec<String>;
    fn current_quality_preset(&self) -> usize;

    /// Apply a quality preset. Presets may change vsync, anti-aliasing and
    /// the texture mipmap limit as a side effect.
    fn set_quality_preset(&self, index: usize) -> Result<(), EngineError>;

    fn vsync_count(&self) -> u32;
    fn set_vsync_count(&self, count: u32) -> Result<(), EngineError>;

    fn anti_aliasing(&self) -> u8;
    fn set_anti_aliasing(&self, samples: u8) -> Result<(), EngineError>;

    fn texture_mipmap_limit(&self) -> u8;
    fn set_texture_mipmap_limit(&self, limit: u8) -> Result<(), EngineError>;

    fn current_display_mode(&self) -> DisplayMode;
    fn set_display_mode(&self, mode: DisplayMode) -> Result<(), EngineError>;
}

/// Audio mixer with exposed float parameters.
#[cfg_attr(test, mockall::automock)]
pub trait AudioMixer {
    fn set_float(&self, parameter: &str, value: f32) -> Result<(), EngineError>;
}
