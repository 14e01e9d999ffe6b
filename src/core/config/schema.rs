//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Client Config
//!
//! Located at (in order of precedence):
//! 1. `$OBS_ORIGIN_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/obs-origin/config.toml`
//! 3. `~/.obs-origin/config.toml`
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., the API URL must be an http(s) URL).

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Upper bound for `connection_retries`.
pub const MAX_CONNECTION_RETRIES: u32 = 20;

/// Build service client configuration.
///
/// # Example
///
/// ```toml
/// api_url = "https://api.opensuse.org"
/// username = "maintenance-bot"
/// password = "hunter2"
/// connection_retries = 5
/// retry_delay_secs = 5
/// timeout_secs = 300
/// ```
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Build service API URL
    pub api_url: Option<String>,

    /// Account name for HTTP basic authentication
    pub username: Option<String>,

    /// Account password
    pub password: Option<String>,

    /// How often a failed connection is retried
    pub connection_retries: Option<u32>,

    /// Pause between connection attempts
    pub retry_delay_secs: Option<u64>,

    /// Per-request timeout
    pub timeout_secs: Option<u64>,
}

// Custom Debug to avoid exposing the password
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("username", &self.username)
            .field("has_password", &self.password.is_some())
            .field("connection_retries", &self.connection_retries)
            .field("retry_delay_secs", &self.retry_delay_secs)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ClientConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.api_url {
            validate_api_url(url)?;
        }

        if let Some(username) = &self.username {
            if username.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "username cannot be empty".to_string(),
                ));
            }
        }

        if let Some(retries) = self.connection_retries {
            if retries > MAX_CONNECTION_RETRIES {
                return Err(ConfigError::InvalidValue(format!(
                    "connection_retries must be at most {}, got {}",
                    MAX_CONNECTION_RETRIES, retries
                )));
            }
        }

        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "timeout_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Check that `url` looks like a build service API endpoint.
pub fn validate_api_url(url: &str) -> Result<(), ConfigError> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| ConfigError::InvalidValue(format!("invalid api_url '{}': {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidValue(format!(
            "invalid api_url '{}': unsupported scheme '{}'",
            url, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(ClientConfig::default().validate().is_ok());
    }

    #[test]
    fn parse_full_config() {
        let config: ClientConfig = toml::from_str(
            r#"
            api_url = "https://api.example.org"
            username = "bot"
            password = "secret"
            connection_retries = 2
            retry_delay_secs = 1
            timeout_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.api_url.as_deref(), Some("https://api.example.org"));
        assert_eq!(config.username.as_deref(), Some("bot"));
        assert_eq!(config.connection_retries, Some(2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_fields_rejected() {
        let result: Result<ClientConfig, _> = toml::from_str("apiurl = \"https://x\"");
        assert!(result.is_err());
    }

    #[test]
    fn non_http_url_rejected() {
        let config = ClientConfig {
            api_url: Some("ftp://api.example.org".into()),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(msg)) if msg.contains("unsupported scheme")
        ));
    }

    #[test]
    fn garbage_url_rejected() {
        assert!(validate_api_url("not a url").is_err());
    }

    #[test]
    fn too_many_retries_rejected() {
        let config = ClientConfig {
            connection_retries: Some(MAX_CONNECTION_RETRIES + 1),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = ClientConfig {
            timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let config = ClientConfig {
            username: Some("bot".into()),
            password: Some("super-secret".into()),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("has_password: true"));
    }
}
