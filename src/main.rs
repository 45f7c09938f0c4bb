//! fps-settings - composition root for the settings and translation stores.
//!
//! # Execution Flow
//!
//! 1. Load [`AppConfig`] (defaults → `fps-settings.toml` → `FPS_SETTINGS_*`)
//! 2. Initialize logging → `<log_dir>/fps-settings.<date>`
//! 3. Create the [`ConfigManager`] for the data directory
//! 4. Initialize the [`TranslationStore`] (reads `gamelang.env`, loads
//!    `game.<code>.json`, bootstraps defaults when missing)
//! 5. Initialize the [`SettingsStore`] (reads `gamesettings.json` or derives
//!    defaults, applies every field to the engine)
//! 6. Report the active state and shut down
//!
//! Without a renderer attached the headless engine backends are used; a game
//! front end passes its own [`fps_settings::DisplayBackend`] and
//! [`fps_settings::AudioMixer`] implementations instead.

use anyhow::Result;
use fps_settings::{
    APP_NAME, AppConfig, ConfigManager, HeadlessDisplay, HeadlessMixer, Metrics, SettingsStore,
    TranslationStore, VERSION,
};
use std::sync::Arc;

fn main() -> Result<()> {
    let app_config = AppConfig::load()?;

    let _guard = fps_settings::logging::setup_logging(
        &app_config.log_dir,
        APP_NAME,
        app_config.debug,
        app_config.console_log,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let config_manager = ConfigManager::new(&app_config.data_dir)?;
    tracing::info!("Using data directory {}", config_manager.data_dir());

    let metrics = Arc::new(Metrics::new());
    let translations = TranslationStore::initialize(config_manager.clone(), Arc::clone(&metrics));

    let display = Arc::new(HeadlessDisplay::new());
    let mixer = Arc::new(HeadlessMixer::new());
    let settings = SettingsStore::initialize(config_manager, translations, display, mixer);

    let snapshot = settings.snapshot();
    tracing::info!(
        "Active settings: {}x{}@{} {}, preset '{}', AA x{}, vsync {}, volumes {:.2}/{:.2}/{:.2}",
        snapshot.resolution_width,
        snapshot.resolution_height,
        snapshot.refresh_rate,
        snapshot.window_mode,
        settings
            .quality_preset_names()
            .get(snapshot.quality_preset_index)
            .cloned()
            .unwrap_or_default(),
        snapshot.anti_aliasing_level,
        snapshot.vsync_enabled,
        snapshot.master_volume,
        snapshot.music_volume,
        snapshot.sfx_volume
    );
    tracing::info!(
        "Language '{}' of {:?}: {}",
        settings.language_code(),
        settings.available_languages(),
        settings.translations().get_or("menu_play", "Play")
    );

    // Make sure a settings file exists for the next start
    if !settings.config_manager().settings_path().exists() {
        settings.save();
    }

    metrics.log_summary();
    tracing::info!("Shutdown complete");

    Ok(())
}
