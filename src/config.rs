//! Configuration: a small JSON file in the XDG config directory.
//!
//! The only persisted setting today is the selected theme; a missing or
//! unreadable config file silently yields the defaults.

use crate::theme::ThemeKey;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: ThemeKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "config I/O error: {}", e),
            ConfigError::ParseError(e) => write!(f, "config parse error: {}", e),
            ConfigError::SerializeError(e) => write!(f, "config serialize error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load from the default location, falling back to defaults when the
    /// file is missing or malformed.
    pub fn load() -> Self {
        let path = config_path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }
        std::fs::write(path.as_ref(), contents).map_err(|e| ConfigError::IoError(e.to_string()))
    }

}

/// `$XDG_CONFIG_HOME/codefolio/config.json`
/// (typically `~/.config/codefolio/config.json`).
pub fn config_path() -> PathBuf {
    let base = dirs::config_dir()
        .unwrap_or_else(|| std::env::temp_dir().join("codefolio-config"));
    base.join("codefolio").join("config.json")
}
