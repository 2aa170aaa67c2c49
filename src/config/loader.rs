// src/config/loader.rs
//! Configuration loader for the fusion core

use crate::config::SystemConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "SPIRO_CONFIG";

/// Default configuration file names probed in the working directory
const DEFAULT_CONFIG_NAMES: &[&str] = &["spiro.toml", "config/spiro.toml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Configuration parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Loads system configuration from TOML files with sane fallbacks
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader probing the default locations plus `SPIRO_CONFIG`
    pub fn new() -> Self {
        Self {
            config_paths: Self::discover_config_paths(),
        }
    }

    /// Create a loader with explicit paths
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self { config_paths: paths }
    }

    /// Load and validate the first configuration file that exists.
    ///
    /// Falls back to `SystemConfig::default()` when no file is present;
    /// a file that exists but fails to parse or validate is an error.
    pub fn load_system_config(&self) -> Result<SystemConfig, ConfigError> {
        for path in &self.config_paths {
            if path.exists() {
                let config = Self::load_file(path)?;
                config
                    .validate_consistency()
                    .map_err(ConfigError::Validation)?;
                return Ok(config);
            }
        }

        Ok(SystemConfig::default())
    }

    /// Parse a single configuration file
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<SystemConfig, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: SystemConfig = toml::from_str(&content)?;
        Ok(config)
    }

    fn discover_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
            paths.push(PathBuf::from(explicit));
        }

        for name in DEFAULT_CONFIG_NAMES {
            paths.push(PathBuf::from(name));
        }

        paths
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
