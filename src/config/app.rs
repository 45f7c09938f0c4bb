use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use config::{Config, Environment, File};
use serde::Deserialize;

/// Environment variable prefix, e.g. `FPS_SETTINGS_DATA_DIR`.
pub const ENV_PREFIX: &str = "FPS_SETTINGS";

/// Optional config file looked up in the working directory (extension inferred).
pub const APP_CONFIG_NAME: &str = "fps-settings";

/// Process-level configuration for the binary.
///
/// Layered lowest to highest: built-in defaults, `fps-settings.{toml,yaml,json}`
/// in the working directory, then `FPS_SETTINGS_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// User-writable directory holding the settings and language files
    pub data_dir: Utf8PathBuf,

    /// Directory for rotating log files
    pub log_dir: Utf8PathBuf,

    pub debug: bool,
    pub console_log: bool,
}

impl AppConfig {
    /// Load from the default locations.
    pub fn load() -> Result<Self> {
        Self::load_from(APP_CONFIG_NAME)
    }

    /// Load using `config_name` as the (extension-less) config file name.
    pub fn load_from(config_name: &str) -> Result<Self> {
        let config = Config::builder()
            .set_default("data_dir", "GameData")?
            .set_default("log_dir", "logs")?
            .set_default("debug", false)?
            .set_default("console_log", true)?
            .add_source(File::with_name(config_name).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("Failed to build app config from {}", config_name))?;

        config
            .try_deserialize()
            .context("Failed to deserialize app config")
    }
}
