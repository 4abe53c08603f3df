//! Configuration loading
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument or environment variable (merged by the binary's
//!    argument parser and passed in as [`ConfigOverrides`])
//! 2. TOML config file (explicit path, else the per-user default location)
//! 3. Compiled default
//!
//! A missing default config file is not an error; the service starts on
//! compiled defaults. An explicitly named file that is missing or malformed
//! is an error.

use crate::validation::is_valid_link;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://musiclib.db?mode=rwc";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_METADATA_URL: &str = "http://127.0.0.1:8081";
pub const DEFAULT_METADATA_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// sqlx connection URL for the song database
    pub database_url: String,
    /// HTTP listen port
    pub port: u16,
    /// Base URL of the metadata enrichment service
    pub metadata_url: String,
    /// Upper bound on a single enrichment request
    pub metadata_timeout_secs: u64,
    /// Drop and recreate the schema at startup
    pub reload_schema: bool,
    /// Default tracing level when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            port: DEFAULT_PORT,
            metadata_url: DEFAULT_METADATA_URL.to_string(),
            metadata_timeout_secs: DEFAULT_METADATA_TIMEOUT_SECS,
            reload_schema: false,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// On-disk TOML layout; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub database_url: Option<String>,
    pub port: Option<u16>,
    pub metadata_url: Option<String>,
    pub metadata_timeout_secs: Option<u64>,
    pub reload_schema: Option<bool>,
    pub log_level: Option<String>,
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub port: Option<u16>,
    pub metadata_url: Option<String>,
    pub metadata_timeout_secs: Option<u64>,
    pub reload_schema: Option<bool>,
    pub log_level: Option<String>,
}

impl ServiceConfig {
    /// Resolve configuration from overrides, the TOML file and defaults
    pub fn resolve(overrides: ConfigOverrides, config_path: Option<&Path>) -> Result<Self> {
        let file = match config_path {
            Some(path) => load_toml_config(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => load_toml_config(&path)?,
                _ => TomlConfig::default(),
            },
        };

        let defaults = Self::default();
        let config = Self {
            database_url: overrides
                .database_url
                .or(file.database_url)
                .unwrap_or(defaults.database_url),
            port: overrides.port.or(file.port).unwrap_or(defaults.port),
            metadata_url: overrides
                .metadata_url
                .or(file.metadata_url)
                .unwrap_or(defaults.metadata_url),
            metadata_timeout_secs: overrides
                .metadata_timeout_secs
                .or(file.metadata_timeout_secs)
                .unwrap_or(defaults.metadata_timeout_secs),
            reload_schema: overrides
                .reload_schema
                .or(file.reload_schema)
                .unwrap_or(defaults.reload_schema),
            log_level: overrides
                .log_level
                .or(file.log_level)
                .unwrap_or(defaults.log_level),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the service cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            return Err(Error::Config("database_url must not be empty".to_string()));
        }
        if !is_valid_link(&self.metadata_url) {
            return Err(Error::Config(format!(
                "metadata_url is not an absolute URL: {}",
                self.metadata_url
            )));
        }
        if self.metadata_timeout_secs == 0 {
            return Err(Error::Config(
                "metadata_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
    })?;

    let config = toml::from_str::<TomlConfig>(&content).map_err(|e| {
        warn!("Malformed config file {}: {}", path.display(), e);
        Error::Config(format!("Invalid config file {}: {}", path.display(), e))
    })?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Per-user config location, e.g. `~/.config/musiclib/config.toml` on Linux
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("musiclib").join("config.toml"))
}
