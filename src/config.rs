//! Settings for the editing session.
//!
//! Settings are stored in TOML format in the platform config directory and
//! carry the UI sizing constants exposed through the store plus the default
//! key-name locale.

use crate::locales::DEFAULT_LOCALE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// UI sizing constants used by the keyboard renderer.
///
/// These are kept by [`ConfigureStore::reset`](crate::state::ConfigureStore::reset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Padding around the keyboard backdrop, in pixels
    #[serde(default = "default_backdrop_padding")]
    pub backdrop_padding: u32,
    /// Pixels per key unit
    #[serde(default = "default_size_factor")]
    pub size_factor: u32,
    /// Pixels per LED unit
    #[serde(default = "default_led_factor")]
    pub led_factor: u32,
}

const fn default_backdrop_padding() -> u32 {
    20
}

const fn default_size_factor() -> u32 {
    16
}

const fn default_led_factor() -> u32 {
    17
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            backdrop_padding: default_backdrop_padding(),
            size_factor: default_size_factor(),
            led_factor: default_led_factor(),
        }
    }
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

/// Session settings.
///
/// # File Location
///
/// - Linux: `~/.config/kllconf/settings.toml`
/// - macOS: `~/Library/Application Support/kllconf/settings.toml`
/// - Windows: `%APPDATA%\kllconf\settings.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Key-name locale used when loading configs
    #[serde(default = "default_locale")]
    pub locale: String,
    /// UI sizing constants
    #[serde(default)]
    pub ui: UiConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            ui: UiConfig::default(),
        }
    }
}

impl Settings {
    /// Gets the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join("kllconf");

        Ok(config_dir)
    }

    /// Gets the full path to the settings file.
    pub fn settings_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("settings.toml"))
    }

    /// Loads settings from the platform settings file.
    ///
    /// If the file doesn't exist, returns default settings.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::settings_file_path()?)
    }

    /// Loads settings from `path`, or defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Saves settings to the platform settings file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_file_path()?)
    }

    /// Saves settings to `path`, creating parent directories.
    ///
    /// Writes to a temp file first and renames it into place.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;

        let temp_path = path.with_extension("toml.tmp");
        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write settings file: {}", temp_path.display()))?;
        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to replace settings file: {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_ui_constants() {
        let ui = UiConfig::default();
        assert_eq!(ui.backdrop_padding, 20);
        assert_eq!(ui.size_factor, 16);
        assert_eq!(ui.led_factor, 17);
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&temp_dir.path().join("missing.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.locale, "en-us");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("settings.toml");

        let mut settings = Settings::default();
        settings.locale = "de-de".to_string();
        settings.ui.size_factor = 24;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");
        fs::write(&path, "[ui]\nled_factor = 9\n").unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.locale, "en-us");
        assert_eq!(settings.ui.led_factor, 9);
        assert_eq!(settings.ui.size_factor, 16);
    }

    #[test]
    fn test_invalid_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");
        fs::write(&path, "locale = [").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse settings file"));
    }
}
