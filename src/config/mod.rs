//! Configuration management module.
//!
//! Handles loading and saving the default path, encoding and output format
//! from a JSON file next to the executable.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::report::OutputFormat;
use crate::error::{CheckError, Result};

pub const CONFIG_FILE_NAME: &str = "encoding_check_config.json";
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub path: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default)]
    pub output: OutputFormat,
    #[serde(skip)]
    pub config_file: String,
}

fn default_encoding() -> String {
    DEFAULT_ENCODING.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: String::new(),
            encoding: default_encoding(),
            output: OutputFormat::Text,
            config_file: String::new(),
        }
    }
}

/// Configuration manager for loading/saving config.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::with_path(Self::get_exe_directory().join(CONFIG_FILE_NAME))
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self { config_path: config_path.into() }
    }

    /// Get the directory containing the executable.
    fn get_exe_directory() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn get_config_file_path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration from file. A missing file yields defaults; a file
    /// that exists but cannot be read or parsed is an error.
    pub fn load(&self) -> Result<Config> {
        let mut config = if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path).map_err(|source| CheckError::Io {
                path: self.config_path.clone(),
                source,
            })?;
            serde_json::from_str(&content).map_err(|source| CheckError::Config {
                path: self.config_path.clone(),
                source,
            })?
        } else {
            tracing::debug!(path = %self.config_path.display(), "no config file, using defaults");
            Config::default()
        };

        config.config_file = self.config_path.to_string_lossy().into_owned();
        if config.encoding.trim().is_empty() {
            config.encoding = default_encoding();
        }

        Ok(config)
    }

    /// Save configuration to file.
    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_path, json).map_err(|source| CheckError::Io {
            path: self.config_path.clone(),
            source,
        })
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
