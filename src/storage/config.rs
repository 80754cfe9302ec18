//! Configuration handling
//!
//! Configuration is read from `config.toml` in the platform config
//! directory (e.g. `~/.config/tasklist/config.toml`) or from an explicit
//! path. Every field is optional.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::FilterMode;

use super::FileStore;

/// Storage key used when none is configured
pub const DEFAULT_STORAGE_KEY: &str = "todos";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// User configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding stored values (defaults to the platform data dir)
    pub storage_dir: Option<PathBuf>,

    /// Key the task list is stored under
    pub storage_key: String,

    /// Filter used by `list` when none is given
    pub default_filter: FilterMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_filter: FilterMode::All,
        }
    }
}

impl Config {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("dev", "tasklist", "tasklist")
    }

    /// Returns the default config file location
    pub fn default_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Returns the default storage directory
    pub fn default_storage_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Loads configuration from `path`, or from the default location
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to load config: {}", config_path.display()))
    }

    /// Parses and validates configuration text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        super::backend::validate_key(&self.storage_key)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Resolves the storage directory, preferring `override_dir`
    pub fn resolve_storage_dir(&self, override_dir: Option<&Path>) -> Result<PathBuf> {
        override_dir
            .map(Path::to_path_buf)
            .or_else(|| self.storage_dir.clone())
            .or_else(Self::default_storage_dir)
            .ok_or_else(|| anyhow::anyhow!("Could not determine storage directory; pass --store"))
    }

    /// Opens the file store this configuration points at
    pub fn file_store(&self, override_dir: Option<&Path>) -> Result<FileStore> {
        Ok(FileStore::new(self.resolve_storage_dir(override_dir)?))
    }
}
