use super::changes::SettingField;
use crate::engine::{
    AudioMixer, DisplayBackend, EngineError, MASTER_VOLUME_PARAM, MUSIC_VOLUME_PARAM,
    SFX_VOLUME_PARAM, audio::apply_volume,
};
use crate::models::{
    DEFAULT_LANGUAGE_CODE, DEFAULT_MASTER_VOLUME, DEFAULT_MUSIC_VOLUME, DEFAULT_SFX_VOLUME,
    MAX_TEXTURE_QUALITY, Settings, is_valid_anti_aliasing,
};

/// Push one engine-backed field of `settings` to the display or mixer.
///
/// Values the engine cannot accept are rejected here, before any call is
/// made. [`SettingField::Language`] is not an engine field and is a no-op.
pub fn apply_engine_field(
    field: SettingField,
    settings: &Settings,
    display: &dyn DisplayBackend,
    mixer: &dyn AudioMixer,
) -> Result<(), EngineError> {
    match field {
        SettingField::VSync => display.set_vsync_count(u32::from(settings.vsync_enabled)),
        SettingField::AntiAliasing => {
            if !is_valid_anti_aliasing(settings.anti_aliasing_level) {
                return Err(EngineError::UnsupportedAntiAliasing(
                    settings.anti_aliasing_level,
                ));
            }
            display.set_anti_aliasing(settings.anti_aliasing_level)
        }
        SettingField::TextureQuality => {
            if settings.texture_quality > MAX_TEXTURE_QUALITY {
                return Err(EngineError::UnsupportedTextureLimit(settings.texture_quality));
            }
            display.set_texture_mipmap_limit(settings.texture_quality)
        }
        SettingField::QualityPreset => {
            let count = display.quality_preset_names().len();
            if settings.quality_preset_index >= count {
                return Err(EngineError::PresetOutOfRange {
                    index: settings.quality_preset_index,
                    count,
                });
            }
            display.set_quality_preset(settings.quality_preset_index)
        }
        SettingField::DisplayMode => display.set_display_mode(settings.display_mode()),
        SettingField::MasterVolume => {
            apply_volume(mixer, MASTER_VOLUME_PARAM, settings.master_volume)
        }
        SettingField::MusicVolume => apply_volume(mixer, MUSIC_VOLUME_PARAM, settings.music_volume),
        SettingField::SfxVolume => apply_volume(mixer, SFX_VOLUME_PARAM, settings.sfx_volume),
        SettingField::Language => Ok(()),
    }
}

/// Copy the values a quality preset controls back from the engine.
///
/// Presets change vsync, anti-aliasing and texture limits as a bundle; the
/// record follows so the settings screen shows what is actually active.
pub fn sync_from_preset(settings: &mut Settings, display: &dyn DisplayBackend) {
    settings.vsync_enabled = display.vsync_count() > 0;

    let anti_aliasing = display.anti_aliasing();
    if is_valid_anti_aliasing(anti_aliasing) {
        settings.anti_aliasing_level = anti_aliasing;
    }

    settings.texture_quality = display.texture_mipmap_limit().min(MAX_TEXTURE_QUALITY);
}

/// Build a default record from the engine's current state plus the fixed
/// audio and language defaults.
pub fn default_settings(display: &dyn DisplayBackend, language_code: &str) -> Settings {
    let fallback = Settings::default();
    let mode = display.current_display_mode();

    let anti_aliasing = display.anti_aliasing();
    let preset_count = display.quality_preset_names().len();
    let current_preset = display.current_quality_preset();

    let language_code = if language_code.trim().is_empty() {
        DEFAULT_LANGUAGE_CODE.to_string()
    } else {
        language_code.trim().to_string()
    };

    Settings {
        vsync_enabled: display.vsync_count() > 0,
        anti_aliasing_level: if is_valid_anti_aliasing(anti_aliasing) {
            anti_aliasing
        } else {
            0
        },
        texture_quality: display.texture_mipmap_limit().min(MAX_TEXTURE_QUALITY),
        resolution_width: if mode.width > 0 {
            mode.width
        } else {
            fallback.resolution_width
        },
        resolution_height: if mode.height > 0 {
            mode.height
        } else {
            fallback.resolution_height
        },
        refresh_rate: if mode.refresh_rate > 0 {
            mode.refresh_rate
        } else {
            fallback.refresh_rate
        },
        window_mode: mode.window_mode,
        quality_preset_index: if current_preset < preset_count {
            current_preset
        } else {
            0
        },
        master_volume: DEFAULT_MASTER_VOLUME,
        music_volume: DEFAULT_MUSIC_VOLUME,
        sfx_volume: DEFAULT_SFX_VOLUME,
        selected_language_code: language_code,
    }
}
