//! core::config
//!
//! Client configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags and environment (applied via [`Config::with_overrides`])
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. `$OBS_ORIGIN_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/obs-origin/config.toml`
//! 3. `~/.obs-origin/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use obs_origin::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("API: {}", config.api_url());
//! println!("Retries: {}", config.connection_retries());
//! ```

pub mod schema;

pub use schema::ClientConfig;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default build service API.
pub const DEFAULT_API_URL: &str = "https://api.opensuse.org";

/// Default number of connection retries.
pub const DEFAULT_CONNECTION_RETRIES: u32 = 5;

/// Default pause between connection attempts, in seconds.
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

/// Default request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "OBS_ORIGIN_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("config file '{0}' does not exist")]
    NotFound(PathBuf),

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Command-line or environment values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// API URL override
    pub api_url: Option<String>,
    /// Username override
    pub username: Option<String>,
    /// Password override
    pub password: Option<String>,
}

/// Loaded configuration with defaults applied by the accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Values read from the config file (or defaults)
    pub client: ClientConfig,
    /// Path to the config file (if loaded)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration.
    ///
    /// An `explicit` path must exist. Without one, the standard locations
    /// are searched and defaults are used when none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed
    /// or validated.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) if path.exists() => Some(path.to_path_buf()),
            Some(path) => return Err(ConfigError::NotFound(path.to_path_buf())),
            None => Self::find_config_file(),
        };

        let client = match &path {
            Some(path) => Self::read_config(path)?,
            None => ClientConfig::default(),
        };
        client.validate()?;

        Ok(Self { client, path })
    }

    /// Search the standard locations for a config file.
    fn find_config_file() -> Option<PathBuf> {
        // 1. Check $OBS_ORIGIN_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/obs-origin/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("obs-origin/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.obs-origin/config.toml
        dirs::home_dir()
            .map(|home| home.join(".obs-origin/config.toml"))
            .filter(|path| path.exists())
    }

    /// Read and parse a config file.
    pub fn read_config(path: &Path) -> Result<ClientConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Apply CLI/environment overrides on top of the file values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if an override is invalid.
    pub fn with_overrides(mut self, overrides: Overrides) -> Result<Self, ConfigError> {
        if let Some(url) = overrides.api_url {
            self.client.api_url = Some(url);
        }
        if let Some(username) = overrides.username {
            self.client.username = Some(username);
        }
        if let Some(password) = overrides.password {
            self.client.password = Some(password);
        }
        self.client.validate()?;
        Ok(self)
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Get the API URL, without a trailing slash.
    ///
    /// Defaults to [`DEFAULT_API_URL`] if not configured.
    pub fn api_url(&self) -> &str {
        self.client
            .api_url
            .as_deref()
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
    }

    /// Get the configured username.
    pub fn username(&self) -> Option<&str> {
        self.client.username.as_deref()
    }

    /// Get the configured password.
    pub fn password(&self) -> Option<&str> {
        self.client.password.as_deref()
    }

    /// Number of times a failed connection is retried.
    pub fn connection_retries(&self) -> u32 {
        self.client
            .connection_retries
            .unwrap_or(DEFAULT_CONNECTION_RETRIES)
    }

    /// Pause between connection attempts.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(
            self.client
                .retry_delay_secs
                .unwrap_or(DEFAULT_RETRY_DELAY_SECS),
        )
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.client.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Get the path to the loaded config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
