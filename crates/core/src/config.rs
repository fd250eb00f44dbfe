//! Configuration management
//!
//! This module handles loading, saving, and migrating the xfer configuration file.
//! The configuration file is stored in TOML format at ~/.config/xfer/config.toml,
//! or under `$XFER_CONFIG_DIR` when that variable is set.
//!
//! Changes to schema_version require migration support.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Current configuration schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "XFER_CONFIG_DIR";

/// Default output format
const DEFAULT_OUTPUT: &str = "human";

/// Default color setting
const DEFAULT_COLOR: &str = "auto";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Default settings
    #[serde(default)]
    pub defaults: Defaults,

    /// Object store connection settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Default settings for CLI behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    /// Output format: "human" or "json"
    #[serde(default = "default_output")]
    pub output: String,

    /// Color mode: "auto", "always", or "never"
    #[serde(default = "default_color")]
    pub color: String,

    /// Show progress spinners
    #[serde(default = "default_true")]
    pub progress: bool,
}

/// Connection settings for the S3-compatible service.
///
/// Credentials are not stored here; the SDK default provider chain supplies them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Custom endpoint URL (e.g. a local S3-compatible server)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Region override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Use path-style addressing instead of virtual-hosted buckets
    #[serde(default)]
    pub force_path_style: bool,
}

impl StorageConfig {
    /// Check that the endpoint, if any, is an absolute http(s) URL
    pub fn validate(&self) -> Result<()> {
        if let Some(endpoint) = &self.endpoint {
            let url = url::Url::parse(endpoint)?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::Config(format!(
                    "endpoint '{endpoint}' must use http or https"
                )));
            }
        }
        Ok(())
    }

    /// Overlay command-line values on top of the file values
    pub fn merge(mut self, endpoint: Option<String>, region: Option<String>) -> Self {
        if endpoint.is_some() {
            self.endpoint = endpoint;
        }
        if region.is_some() {
            self.region = region;
        }
        self
    }
}

fn default_output() -> String {
    DEFAULT_OUTPUT.to_string()
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            progress: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
            storage: StorageConfig::default(),
        }
    }
}

/// Configuration manager handles loading and saving config
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path
    pub fn new() -> Result<Self> {
        let config_dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::config_dir()
                .ok_or_else(|| Error::Config("Could not determine config directory".into()))?
                .join("xfer"),
        };
        Ok(Self {
            config_path: config_dir.join("config.toml"),
        })
    }

    /// Create a ConfigManager with a custom path (useful for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from disk
    ///
    /// If the configuration file doesn't exist, returns a default configuration.
    /// If the schema version doesn't match, attempts migration.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        if config.schema_version < SCHEMA_VERSION {
            config = self.migrate(config)?;
        } else if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}. Please upgrade xfer.",
                config.schema_version, SCHEMA_VERSION
            )));
        }

        config.storage.validate()?;
        Ok(config)
    }

    /// Save configuration to disk
    ///
    /// Creates parent directories if they don't exist.
    /// Sets file permissions to 600 (owner read/write only).
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.config_path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.config_path, permissions)?;
        }

        Ok(())
    }

    /// Migrate configuration from older schema version
    fn migrate(&self, mut config: Config) -> Result<Config> {
        // Version 0 files predate the [storage] table, which serde defaults.
        config.schema_version = SCHEMA_VERSION;
        Ok(config)
    }
}
