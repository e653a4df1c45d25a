//! Persistent user settings. Only the UI theme is stored today; the file keeps
//! a `[Settings]` section so it stays readable when edited by hand.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Theme written to a freshly created settings file.
pub const DEFAULT_THEME: &str = "darkly";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(rename = "Settings", default)]
    settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: default_theme(),
        }
    }
}

impl Settings {
    /// Read the settings file, creating it with defaults on first run.
    pub fn load_or_create(path: &Path) -> Result<Self, SettingsError> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let file: SettingsFile = toml::from_str(&contents)?;
                Ok(file.settings)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let settings = Settings::default();
                settings.save(path)?;
                info!(path = %path.display(), "created default settings file");
                Ok(settings)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Change the theme and write the whole file back.
    pub fn set_theme(&mut self, theme: impl Into<String>, path: &Path) -> Result<(), SettingsError> {
        self.theme = theme.into();
        self.save(path)
    }

    fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(&SettingsFile {
            settings: self.clone(),
        })?;
        fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_layout_uses_settings_section() {
        let contents = toml::to_string_pretty(&SettingsFile {
            settings: Settings::default(),
        })
        .unwrap();
        assert!(contents.contains("[Settings]"));
        assert!(contents.contains("theme = \"darkly\""));
    }

    #[test]
    fn missing_key_falls_back_to_default_theme() {
        let file: SettingsFile = toml::from_str("[Settings]\n").unwrap();
        assert_eq!(file.settings.theme, DEFAULT_THEME);
    }

    #[test]
    fn missing_section_falls_back_to_defaults() {
        let file: SettingsFile = toml::from_str("").unwrap();
        assert_eq!(file.settings, Settings::default());
    }
}
