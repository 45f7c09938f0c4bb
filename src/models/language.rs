use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::settings::DEFAULT_LANGUAGE_CODE;

/// Selected and available language codes from `gamelang.env`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    pub selected: String,
    pub available: Vec<String>,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            selected: DEFAULT_LANGUAGE_CODE.to_string(),
            available: vec![DEFAULT_LANGUAGE_CODE.to_string()],
        }
    }
}

impl LanguageConfig {
    /// Build a config from the raw values found in the file.
    ///
    /// - An empty available list becomes `[selected]`.
    /// - A selected code missing from a non-empty available list falls back
    ///   to the first available code.
    /// - An empty selected code takes the first available code, or the
    ///   default language when nothing is available either.
    pub fn normalized(selected: Option<String>, available: Vec<String>) -> Self {
        let mut selected = selected.unwrap_or_default().trim().to_string();
        let mut available: Vec<String> = available
            .into_iter()
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();

        if selected.is_empty() {
            selected = available
                .first()
                .cloned()
                .unwrap_or_else(|| DEFAULT_LANGUAGE_CODE.to_string());
        } else if !available.is_empty() && !available.contains(&selected) {
            tracing::warn!(
                "Selected language '{}' is not in available languages {:?}, using '{}'",
                selected,
                available,
                available[0]
            );
            selected = available[0].clone();
        }

        if available.is_empty() {
            available.push(selected.clone());
        }

        Self { selected, available }
    }

    pub fn is_available(&self, code: &str) -> bool {
        self.available.iter().any(|c| c == code)
    }

    /// Render the config in `gamelang.env` form.
    pub fn to_env_string(&self) -> String {
        format!(
            "# Language configuration\nSELECTED_LANGUAGE={}\nAVAILABLE_LANGUAGES={}\n",
            self.selected,
            self.available.join(",")
        )
    }
}

/// One `{key, value}` pair of a `game.<code>.json` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationEntry {
    #[serde(default)]
    pub key: String,

    #[serde(default)]
    pub value: String,
}

/// Contents of a `game.<code>.json` language file.
///
/// Entries are kept as an ordered list rather than a map so that the file
/// format matches what translators already edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageFile {
    #[serde(default)]
    pub entries: Vec<TranslationEntry>,
}

impl LanguageFile {
    /// The minimal file written when no language file exists at all.
    pub fn bootstrap() -> Self {
        let entries = [
            ("menu_play", "Play"),
            ("menu_settings", "Settings"),
            ("menu_exit", "Exit"),
            ("settings_apply", "Apply"),
            ("settings_back", "Back"),
            ("exit_confirm", "Are you sure you want to exit?"),
            ("yes", "Yes"),
            ("no", "No"),
            ("loading", "Loading..."),
        ]
        .into_iter()
        .map(|(key, value)| TranslationEntry {
            key: key.to_string(),
            value: value.to_string(),
        })
        .collect();

        Self { entries }
    }
}
