// In-process engine backends
//
// Used when the settings stores run without a renderer or audio device
// attached. Every mutation is validated the way the real engine validates it
// and recorded so callers can inspect what was applied.

use super::{
    AudioMixer, DisplayBackend, EngineError, MASTER_VOLUME_PARAM, MUSIC_VOLUME_PARAM,
    SFX_VOLUME_PARAM,
};
use crate::models::{DisplayMode, MAX_TEXTURE_QUALITY, WindowMode, is_valid_anti_aliasing};
use indexmap::IndexMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A single recorded engine mutation
#[derive(Clone, Debug, PartialEq)]
pub enum EngineCall {
    QualityPreset(usize),
    VSyncCount(u32),
    AntiAliasing(u8),
    TextureMipmapLimit(u8),
    DisplayMode(DisplayMode),
    MixerFloat { parameter: String, value: f32 },
}

/// A named bundle of quality values applied together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QualityPreset {
    pub name: String,
    pub vsync_count: u32,
    pub anti_aliasing: u8,
    pub texture_mipmap_limit: u8,
}

impl QualityPreset {
    pub fn new(name: &str, vsync_count: u32, anti_aliasing: u8, texture_mipmap_limit: u8) -> Self {
        Self {
            name: name.to_string(),
            vsync_count,
            anti_aliasing,
            texture_mipmap_limit,
        }
    }

    /// The engine's stock preset ladder.
    pub fn standard_presets() -> Vec<QualityPreset> {
        vec![
            QualityPreset::new("Very Low", 0, 0, 3),
            QualityPreset::new("Low", 0, 0, 2),
            QualityPreset::new("Medium", 1, 0, 1),
            QualityPreset::new("High", 1, 2, 0),
            QualityPreset::new("Very High", 1, 4, 0),
            QualityPreset::new("Ultra", 1, 8, 0),
        ]
    }
}

#[derive(Debug)]
struct DisplayState {
    presets: Vec<QualityPreset>,
    quality_preset: usize,
    vsync_count: u32,
    anti_aliasing: u8,
    texture_mipmap_limit: u8,
    display_mode: DisplayMode,
    calls: Vec<EngineCall>,
}

/// Display backend that keeps its state in memory.
#[derive(Debug)]
pub struct HeadlessDisplay {
    state: Mutex<DisplayState>,
}

impl HeadlessDisplay {
    /// Create a display with the standard presets, starting on "Medium" at
    /// 1920x1080@60 in a fullscreen window.
    pub fn new() -> Self {
        let display_mode = DisplayMode {
            width: 1920,
            height: 1080,
            refresh_rate: 60,
            window_mode: WindowMode::FullScreenWindow,
        };
        Self::with_presets(QualityPreset::standard_presets(), 2, display_mode)
    }

    /// Create a display with custom presets, starting on `initial_preset`.
    pub fn with_presets(
        presets: Vec<QualityPreset>,
        initial_preset: usize,
        display_mode: DisplayMode,
    ) -> Self {
        let initial = presets.get(initial_preset).cloned();
        let state = DisplayState {
            quality_preset: initial.as_ref().map(|_| initial_preset).unwrap_or(0),
            vsync_count: initial.as_ref().map(|p| p.vsync_count).unwrap_or(1),
            anti_aliasing: initial.as_ref().map(|p| p.anti_aliasing).unwrap_or(0),
            texture_mipmap_limit: initial.as_ref().map(|p| p.texture_mipmap_limit).unwrap_or(0),
            presets,
            display_mode,
            calls: Vec::new(),
        };
        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DisplayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All mutations recorded so far, oldest first.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }
}

impl Default for HeadlessDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayBackend for HeadlessDisplay {
    fn quality_preset_names(&self) -> Vec<String> {
        self.lock().presets.iter().map(|p| p.name.clone()).collect()
    }

    fn current_quality_preset(&self) -> usize {
        self.lock().quality_preset
    }

    fn set_quality_preset(&self, index: usize) -> Result<(), EngineError> {
        let mut state = self.lock();
        let preset = state
            .presets
            .get(index)
            .cloned()
            .ok_or(EngineError::PresetOutOfRange {
                index,
                count: state.presets.len(),
            })?;

        state.quality_preset = index;
        state.vsync_count = preset.vsync_count;
        state.anti_aliasing = preset.anti_aliasing;
        state.texture_mipmap_limit = preset.texture_mipmap_limit;
        state.calls.push(EngineCall::QualityPreset(index));
        Ok(())
    }

    fn vsync_count(&self) -> u32 {
        self.lock().vsync_count
    }

    fn set_vsync_count(&self, count: u32) -> Result<(), EngineError> {
        let mut state = self.lock();
        state.vsync_count = count;
        state.calls.push(EngineCall::VSyncCount(count));
        Ok(())
    }

    fn anti_aliasing(&self) -> u8 {
        self.lock().anti_aliasing
    }

    fn set_anti_aliasing(&self, samples: u8) -> Result<(), EngineError> {
        if !is_valid_anti_aliasing(samples) {
            return Err(EngineError::UnsupportedAntiAliasing(samples));
        }
        let mut state = self.lock();
        state.anti_aliasing = samples;
        state.calls.push(EngineCall::AntiAliasing(samples));
        Ok(())
    }

    fn texture_mipmap_limit(&self) -> u8 {
        self.lock().texture_mipmap_limit
    }

    fn set_texture_mipmap_limit(&self, limit: u8) -> Result<(), EngineError> {
        if limit > MAX_TEXTURE_QUALITY {
            return Err(EngineError::UnsupportedTextureLimit(limit));
        }
        let mut state = self.lock();
        state.texture_mipmap_limit = limit;
        state.calls.push(EngineCall::TextureMipmapLimit(limit));
        Ok(())
    }

    fn current_display_mode(&self) -> DisplayMode {
        self.lock().display_mode
    }

    fn set_display_mode(&self, mode: DisplayMode) -> Result<(), EngineError> {
        if mode.width == 0 || mode.height == 0 || mode.refresh_rate == 0 {
            return Err(EngineError::UnsupportedDisplayMode {
                width: mode.width,
                height: mode.height,
                refresh_rate: mode.refresh_rate,
            });
        }
        let mut state = self.lock();
        state.display_mode = mode;
        state.calls.push(EngineCall::DisplayMode(mode));
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MixerState {
    parameters: IndexMap<String, f32>,
    calls: Vec<EngineCall>,
}

/// Audio mixer exposing the master, music and SFX volume parameters.
#[derive(Debug)]
pub struct HeadlessMixer {
    state: Mutex<MixerState>,
}

impl HeadlessMixer {
    pub fn new() -> Self {
        let mut parameters = IndexMap::new();
        for parameter in [MASTER_VOLUME_PARAM, MUSIC_VOLUME_PARAM, SFX_VOLUME_PARAM] {
            parameters.insert(parameter.to_string(), 0.0);
        }
        Self {
            state: Mutex::new(MixerState {
                parameters,
                calls: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MixerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current value of an exposed parameter, in decibels.
    pub fn get_float(&self, parameter: &str) -> Option<f32> {
        self.lock().parameters.get(parameter).copied()
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }
}

impl Default for HeadlessMixer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioMixer for HeadlessMixer {
    fn set_float(&self, parameter: &str, value: f32) -> Result<(), EngineError> {
        let mut state = self.lock();
        match state.parameters.get_mut(parameter) {
            Some(slot) => *slot = value,
            None => return Err(EngineError::UnknownParameter(parameter.to_string())),
        }
        state.calls.push(EngineCall::MixerFloat {
            parameter: parameter.to_string(),
            value,
        });
        Ok(())
    }
}
