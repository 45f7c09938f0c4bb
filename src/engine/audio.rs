use super::{AudioMixer, EngineError};

pub const MASTER_VOLUME_PARAM: &str = "MasterVolume";
pub const MUSIC_VOLUME_PARAM: &str = "MusicVolume";
pub const SFX_VOLUME_PARAM: &str = "SFXVolume";

/// Mixer floor used for silence.
pub const SILENCE_DB: f32 = -80.0;

/// Linear volumes at or below this are treated as silence.
pub const MIN_AUDIBLE_VOLUME: f32 = 0.0001;

/// Convert a linear `[0, 1]` volume into mixer decibels.
pub fn linear_to_db(volume: f32) -> f32 {
    if volume > MIN_AUDIBLE_VOLUME {
        20.0 * volume.log10()
    } else {
        SILENCE_DB
    }
}

/// Push a linear volume to `parameter` on `mixer`.
pub fn apply_volume(
    mixer: &dyn AudioMixer,
    parameter: &str,
    volume: f32,
) -> Result<(), EngineError> {
    let db = linear_to_db(volume);
    tracing::debug!("Setting mixer {} to {:.2} dB (linear {:.3})", parameter, db, volume);
    mixer.set_float(parameter, db)
}
