/// Application settings
///
/// Settings are stored as JSON in the user's config directory:
/// - Linux: ~/.config/image-to-text/settings.json
/// - macOS: ~/Library/Application Support/image-to-text/settings.json
/// - Windows: %APPDATA%\image-to-text\settings.json
///
/// A missing file means "use defaults". The file is never written by the app,
/// it only exists if the user creates it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ocr::SessionConfig;

/// Environment variable that overrides the configured OCR language
pub const LANGUAGE_ENV: &str = "IMAGE_TO_TEXT_LANG";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// OCR settings read once at startup
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Tesseract language pack (e.g. "eng", "deu")
    pub language: String,

    /// Concurrency hint handed to the OCR engine
    pub workers: usize,

    /// Resolution hint for tesseract. `None` lets the engine pick.
    pub dpi: Option<i32>,

    /// Page segmentation mode (tesseract `--psm`)
    pub psm: Option<i32>,

    /// OCR engine mode (tesseract `--oem`)
    pub oem: Option<i32>,

    /// Upscale small images before recognition
    pub upscale_small_images: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            workers: 1,
            dpi: None,
            psm: Some(3),
            oem: Some(3),
            upscale_small_images: true,
        }
    }
}

impl Settings {
    /// Load settings from the default location, falling back to defaults.
    ///
    /// Never fails: a broken file is logged and ignored so the app still starts.
    pub fn load() -> Self {
        let mut settings = match Self::path() {
            Some(path) => match Self::load_from(&path) {
                Ok(Some(settings)) => {
                    log::info!("⚙️  Loaded settings from {}", path.display());
                    settings
                }
                Ok(None) => Self::default(),
                Err(e) => {
                    log::warn!("⚠️  {} ({}), using defaults", e, path.display());
                    Self::default()
                }
            },
            None => Self::default(),
        };

        if let Ok(language) = std::env::var(LANGUAGE_ENV) {
            settings.apply_language_override(&language);
        }

        settings
    }

    /// Read settings from a specific file. `Ok(None)` if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, SettingsError> {
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(path)?;
        Ok(Some(Self::from_json(&json)?))
    }

    /// Path where the settings file is expected
    pub fn path() -> Option<PathBuf> {
        let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
        path.push("image-to-text");
        path.push("settings.json");
        Some(path)
    }

    /// Parse from JSON string. Missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Replace the language unless the override is blank
    pub fn apply_language_override(&mut self, language: &str) {
        let language = language.trim();
        if !language.is_empty() {
            self.language = language.to_string();
        }
    }

    /// Session parameters for one recognition job
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            language: self.language.clone(),
            workers: self.workers.max(1),
        }
    }
}
