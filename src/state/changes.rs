use crate::models::{DisplayMode, Settings};

/// The independently applied parts of the settings record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SettingField {
    VSync,
    AntiAliasing,
    TextureQuality,
    QualityPreset,
    /// Resolution, refresh rate and window mode, applied together
    DisplayMode,
    MasterVolume,
    MusicVolume,
    SfxVolume,
    Language,
}

impl SettingField {
    /// Order in which a full apply pushes fields to the engine.
    pub const APPLY_ORDER: [SettingField; 9] = [
        SettingField::VSync,
        SettingField::AntiAliasing,
        SettingField::TextureQuality,
        SettingField::QualityPreset,
        SettingField::DisplayMode,
        SettingField::MasterVolume,
        SettingField::MusicVolume,
        SettingField::SfxVolume,
        SettingField::Language,
    ];
}

/// Change events emitted when the settings record is modified
///
/// Each event carries the new value so listeners (typically the settings
/// screen) can refresh a single widget without reading the whole record.
#[derive(Clone, Debug, PartialEq)]
pub enum SettingsChange {
    VSyncChanged(bool),
    AntiAliasingChanged(u8),
    TextureQualityChanged(u8),
    QualityPresetChanged(usize),
    DisplayModeChanged(DisplayMode),
    MasterVolumeChanged(f32),
    MusicVolumeChanged(f32),
    SfxVolumeChanged(f32),
    LanguageChanged(String),

    /// The whole record was replaced by defaults
    SettingsReset,
}

/// Detect what changed between two records and generate events, in apply order.
pub fn detect_changes(old: &Settings, new: &Settings) -> Vec<SettingsChange> {
    let mut changes = Vec::new();

    if old.vsync_enabled != new.vsync_enabled {
        changes.push(SettingsChange::VSyncChanged(new.vsync_enabled));
    }
    if old.anti_aliasing_level != new.anti_aliasing_level {
        changes.push(SettingsChange::AntiAliasingChanged(new.anti_aliasing_level));
    }
    if old.texture_quality != new.texture_quality {
        changes.push(SettingsChange::TextureQualityChanged(new.texture_quality));
    }
    if old.quality_preset_index != new.quality_preset_index {
        changes.push(SettingsChange::QualityPresetChanged(new.quality_preset_index));
    }
    if old.display_mode() != new.display_mode() {
        changes.push(SettingsChange::DisplayModeChanged(new.display_mode()));
    }
    if old.master_volume != new.master_volume {
        changes.push(SettingsChange::MasterVolumeChanged(new.master_volume));
    }
    if old.music_volume != new.music_volume {
        changes.push(SettingsChange::MusicVolumeChanged(new.music_volume));
    }
    if old.sfx_volume != new.sfx_volume {
        changes.push(SettingsChange::SfxVolumeChanged(new.sfx_volume));
    }
    if old.selected_language_code != new.selected_language_code {
        changes.push(SettingsChange::LanguageChanged(
            new.selected_language_code.clone(),
        ));
    }

    changes
}
