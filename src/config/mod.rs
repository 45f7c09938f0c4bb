use crate::models::{LanguageConfig, LanguageFile, Settings};
use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::fs;
use std::sync::LazyLock;

pub mod app;

pub use app::AppConfig;

pub const SETTINGS_FILE_NAME: &str = "gamesettings.json";
pub const LANGUAGE_CONFIG_FILE_NAME: &str = "gamelang.env";

const SELECTED_LANGUAGE_KEY: &str = "SELECTED_LANGUAGE";
const AVAILABLE_LANGUAGES_KEY: &str = "AVAILABLE_LANGUAGES";

/// Language codes end up in file names, so only plain identifiers are allowed.
static LANGUAGE_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid language code regex"));

/// Returns true if `code` can be used to name a `game.<code>.json` file.
pub fn is_valid_language_code(code: &str) -> bool {
    LANGUAGE_CODE_PATTERN.is_match(code)
}

/// Replace `path` by writing a sibling `.tmp` file and renaming it over the
/// target, so a reader never sees a partially written file.
fn write_replacing(path: &Utf8Path, contents: &str) -> std::io::Result<()> {
    let tmp = Utf8PathBuf::from(format!("{}.tmp", path));
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path).inspect_err(|_| {
        let _ = fs::remove_file(&tmp);
    })
}

/// File layer for everything persisted in the user data directory.
///
/// Manages three kinds of files:
/// - `gamesettings.json`: the [`Settings`] record
/// - `gamelang.env`: selected and available language codes
/// - `game.<code>.json`: one [`LanguageFile`] per language
///
/// Missing files are reported as `Ok(None)`; read, parse and write failures
/// are errors with the offending path attached. Deciding what to fall back to
/// is left to the stores.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    data_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
    language_config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager rooted at `data_dir`.
    ///
    /// # Arguments
    /// * `data_dir` - The user-writable data directory (created if missing)
    pub fn new<P: AsRef<Utf8Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();

        if !data_dir.exists() {
            fs::create_dir_all(&data_dir)
                .with_context(|| format!("Failed to create data directory: {}", data_dir))?;
        }

        Ok(Self {
            settings_path: data_dir.join(SETTINGS_FILE_NAME),
            language_config_path: data_dir.join(LANGUAGE_CONFIG_FILE_NAME),
            data_dir,
        })
    }

    /// Load the settings record.
    ///
    /// # Returns
    /// `None` if `gamesettings.json` does not exist
    pub fn load_settings(&self) -> Result<Option<Settings>> {
        if !self.settings_path.exists() {
            return Ok(None);
        }

        let file_contents = fs::read_to_string(&self.settings_path)
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?;

        let settings: Settings = serde_json::from_str(&file_contents)
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        tracing::debug!("Loaded settings from {}", self.settings_path);
        Ok(Some(settings))
    }

    /// Overwrite `gamesettings.json` with the whole record.
    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        let json =
            serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

        write_replacing(&self.settings_path, &json)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::debug!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    /// Load `gamelang.env`.
    ///
    /// Blank lines and `#` comments are ignored, as are keys other than
    /// `SELECTED_LANGUAGE` and `AVAILABLE_LANGUAGES`. Malformed lines are
    /// skipped with a warning.
    ///
    /// # Returns
    /// The normalized config, or `None` if the file does not exist
    pub fn load_language_config(&self) -> Result<Option<LanguageConfig>> {
        if !self.language_config_path.exists() {
            return Ok(None);
        }

        let entries = dotenv::from_path_iter(&self.language_config_path).with_context(|| {
            format!(
                "Failed to read language config: {}",
                self.language_config_path
            )
        })?;

        let mut selected = None;
        let mut available = Vec::new();

        for entry in entries {
            match entry {
                Ok((key, value)) => match key.as_str() {
                    SELECTED_LANGUAGE_KEY => selected = Some(value),
                    AVAILABLE_LANGUAGES_KEY => {
                        available = value.split(',').map(str::to_string).collect();
                    }
                    other => tracing::debug!("Ignoring unknown language config key {}", other),
                },
                Err(e) => {
                    tracing::warn!(
                        "Skipping malformed line in {}: {}",
                        self.language_config_path,
                        e
                    );
                }
            }
        }

        Ok(Some(LanguageConfig::normalized(selected, available)))
    }

    /// Overwrite `gamelang.env`.
    pub fn save_language_config(&self, config: &LanguageConfig) -> Result<()> {
        write_replacing(&self.language_config_path, &config.to_env_string()).with_context(|| {
            format!(
                "Failed to write language config: {}",
                self.language_config_path
            )
        })?;

        tracing::debug!("Saved language config to {}", self.language_config_path);
        Ok(())
    }

    /// Load the language file for `code`.
    ///
    /// # Returns
    /// `None` if `game.<code>.json` does not exist
    pub fn load_language_file(&self, code: &str) -> Result<Option<LanguageFile>> {
        let path = self.language_file_path(code)?;
        if !path.exists() {
            return Ok(None);
        }

        let file_contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read language file: {}", path))?;

        let file: LanguageFile = serde_json::from_str(&file_contents)
            .with_context(|| format!("Failed to parse language file: {}", path))?;

        Ok(Some(file))
    }

    /// Overwrite the language file for `code`.
    pub fn save_language_file(&self, code: &str, file: &LanguageFile) -> Result<()> {
        let path = self.language_file_path(code)?;
        let json =
            serde_json::to_string_pretty(file).context("Failed to serialize language file")?;

        write_replacing(&path, &json)
            .with_context(|| format!("Failed to write language file: {}", path))?;

        tracing::debug!("Saved language file to {}", path);
        Ok(())
    }

    /// Path of `game.<code>.json`, rejecting codes that are not plain identifiers.
    pub fn language_file_path(&self, code: &str) -> Result<Utf8PathBuf> {
        if !is_valid_language_code(code) {
            bail!("Invalid language code: {:?}", code);
        }
        Ok(self.data_dir.join(format!("game.{}.json", code)))
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> &Utf8Path {
        &self.data_dir
    }

    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }

    pub fn language_config_path(&self) -> &Utf8Path {
        &self.language_config_path
    }
}
