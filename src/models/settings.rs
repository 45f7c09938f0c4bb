use serde::{Deserialize, Serialize};
use std::fmt;

/// Anti-aliasing sample counts the engine accepts.
pub const ANTI_ALIASING_LEVELS: [u8; 4] = [0, 2, 4, 8];

/// Highest texture mipmap limit (0 = full resolution, 3 = eighth resolution).
pub const MAX_TEXTURE_QUALITY: u8 = 3;

pub const DEFAULT_MASTER_VOLUME: f32 = 0.8;
pub const DEFAULT_MUSIC_VOLUME: f32 = 0.7;
pub const DEFAULT_SFX_VOLUME: f32 = 0.75;

/// Language used when neither the settings file nor the language config names one.
pub const DEFAULT_LANGUAGE_CODE: &str = "en";

/// How the game window occupies the display.
///
/// Serialized as the engine's integer ordering (0 = exclusive full screen
/// through 3 = windowed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WindowMode {
    ExclusiveFullScreen,
    FullScreenWindow,
    MaximizedWindow,
    Windowed,
}

impl WindowMode {
    pub const ALL: [WindowMode; 4] = [
        WindowMode::ExclusiveFullScreen,
        WindowMode::FullScreenWindow,
        WindowMode::MaximizedWindow,
        WindowMode::Windowed,
    ];
}

impl From<WindowMode> for u8 {
    fn from(mode: WindowMode) -> Self {
        match mode {
            WindowMode::ExclusiveFullScreen => 0,
            WindowMode::FullScreenWindow => 1,
            WindowMode::MaximizedWindow => 2,
            WindowMode::Windowed => 3,
        }
    }
}

impl TryFrom<u8> for WindowMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(WindowMode::ExclusiveFullScreen),
            1 => Ok(WindowMode::FullScreenWindow),
            2 => Ok(WindowMode::MaximizedWindow),
            3 => Ok(WindowMode::Windowed),
            other => Err(format!("invalid window mode {}", other)),
        }
    }
}

impl fmt::Display for WindowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WindowMode::ExclusiveFullScreen => "exclusive fullscreen",
            WindowMode::FullScreenWindow => "fullscreen window",
            WindowMode::MaximizedWindow => "maximized window",
            WindowMode::Windowed => "windowed",
        };
        f.write_str(name)
    }
}

/// A display mode as reported by (or pushed to) the display backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayMode {
    pub width: u32,
    pub height: u32,
    pub refresh_rate: u32,
    pub window_mode: WindowMode,
}

/// The persisted graphics, audio and language preferences.
///
/// Mirrors `gamesettings.json` field for field. Exactly one live instance is
/// owned by [`crate::state::SettingsStore`]; everything else works on snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    // Graphics
    pub vsync_enabled: bool,
    pub anti_aliasing_level: u8,
    pub texture_quality: u8,
    pub resolution_width: u32,
    pub resolution_height: u32,
    pub refresh_rate: u32,
    pub window_mode: WindowMode,
    pub quality_preset_index: usize,

    // Audio
    pub master_volume: f32,
    pub music_volume: f32,
    pub sfx_volume: f32,

    // Language
    pub selected_language_code: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            vsync_enabled: true,
            anti_aliasing_level: 2,
            texture_quality: 0,
            resolution_width: 1920,
            resolution_height: 1080,
            refresh_rate: 60,
            window_mode: WindowMode::FullScreenWindow,
            quality_preset_index: 2,
            master_volume: DEFAULT_MASTER_VOLUME,
            music_volume: DEFAULT_MUSIC_VOLUME,
            sfx_volume: DEFAULT_SFX_VOLUME,
            selected_language_code: DEFAULT_LANGUAGE_CODE.to_string(),
        }
    }
}

impl Settings {
    /// Current display mode described by the record.
    pub fn display_mode(&self) -> DisplayMode {
        DisplayMode {
            width: self.resolution_width,
            height: self.resolution_height,
            refresh_rate: self.refresh_rate,
            window_mode: self.window_mode,
        }
    }

    /// Pull values read from disk back into their valid ranges.
    ///
    /// Volumes are clamped to `[0, 1]` (NaN becomes the default) and texture
    /// quality is capped at [`MAX_TEXTURE_QUALITY`]. Anti-aliasing is left
    /// alone; an unsupported level is rejected when applied.
    ///
    /// # Returns
    /// `true` if any field was changed
    pub fn clamp_to_ranges(&mut self) -> bool {
        let before = self.clone();

        self.master_volume = clamp_volume(self.master_volume).unwrap_or(DEFAULT_MASTER_VOLUME);
        self.music_volume = clamp_volume(self.music_volume).unwrap_or(DEFAULT_MUSIC_VOLUME);
        self.sfx_volume = clamp_volume(self.sfx_volume).unwrap_or(DEFAULT_SFX_VOLUME);
        self.texture_quality = self.texture_quality.min(MAX_TEXTURE_QUALITY);

        *self != before
    }
}

/// Returns true if `level` is a sample count the engine supports.
pub fn is_valid_anti_aliasing(level: u8) -> bool {
    ANTI_ALIASING_LEVELS.contains(&level)
}

/// Clamp a linear volume into `[0, 1]`.
///
/// Returns `None` for NaN, which has no meaningful clamp.
pub fn clamp_volume(volume: f32) -> Option<f32> {
    if volume.is_nan() {
        None
    } else {
        Some(volume.clamp(0.0, 1.0))
    }
}
