//! origin::config
//!
//! Per-project origin configuration.
//!
//! The configuration lives in the `OSRT:OriginConfig` attribute of a
//! project as a YAML document:
//!
//! ```yaml
//! origins:
//! - <devel>: {}
//! - SUSE:SLE-15*:Update:
//!     maintainer_review_initial: false
//! - openSUSE:Factory:
//!     pending_submission_allow: true
//! - '*~': {}
//! fallback-group: origin-reviewers-maintenance
//! ```
//!
//! Each list item maps an origin name or pattern to policy flags. The flags
//! are kept as decoded and are not interpreted by the resolver.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use super::OriginError;
use crate::service::BuildService;

/// Attribute holding the origin configuration of a project.
pub const ORIGIN_CONFIG_ATTRIBUTE: &str = "OSRT:OriginConfig";

/// One configured origin with its policy flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OriginEntry {
    /// Project name, marker or wildcard pattern
    pub name: String,
    /// Policy flags as written in the configuration
    pub flags: Value,
}

impl OriginEntry {
    /// Look up a boolean policy flag.
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.flags.get(name).and_then(Value::as_bool)
    }
}

/// Decoded origin configuration of a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OriginConfig {
    /// Origins in configured order
    pub origins: Vec<OriginEntry>,
    /// Review group used when no origin applies
    #[serde(rename = "fallback-group", skip_serializing_if = "Option::is_none")]
    pub fallback_group: Option<String>,
}

/// Document layout before the origin items are flattened.
#[derive(Debug, Deserialize)]
struct RawOriginConfig {
    origins: Vec<Mapping>,
    #[serde(rename = "fallback-group", default)]
    fallback_group: Option<String>,
}

impl OriginConfig {
    /// Decode the YAML document of `project`'s origin configuration.
    ///
    /// # Errors
    ///
    /// Returns `OriginError::MalformedConfig` if the text is not valid YAML,
    /// has no `origins` list, or uses a non-string origin name.
    ///
    /// # Example
    ///
    /// ```
    /// use obs_origin::origin::config::OriginConfig;
    ///
    /// let config = OriginConfig::from_yaml(
    ///     "openSUSE:Leap:15.2:Update",
    ///     "origins:\n- <devel>: {}\n- openSUSE:Factory: {pending_submission_allow: true}\n",
    /// )
    /// .unwrap();
    /// assert_eq!(config.names().collect::<Vec<_>>(), ["<devel>", "openSUSE:Factory"]);
    /// assert_eq!(config.origins[1].flag("pending_submission_allow"), Some(true));
    /// ```
    pub fn from_yaml(project: &str, text: &str) -> Result<Self, OriginError> {
        let malformed = |source| OriginError::MalformedConfig {
            project: project.to_string(),
            source,
        };

        let raw: RawOriginConfig = serde_yaml::from_str(text).map_err(malformed)?;

        let mut origins = Vec::new();
        for item in raw.origins {
            for (key, flags) in item {
                let name: String = serde_yaml::from_value(key).map_err(malformed)?;
                origins.push(OriginEntry { name, flags });
            }
        }

        Ok(Self {
            origins,
            fallback_group: raw.fallback_group,
        })
    }

    /// Origin names and patterns in configured order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.origins.iter().map(|o| o.name.as_str())
    }
}

/// Fetch and decode the origin configuration of `project`.
///
/// # Errors
///
/// - `OriginError::MissingConfig` if the project has no configuration
/// - `OriginError::MalformedConfig` if it cannot be decoded
/// - `OriginError::Service` if the attribute cannot be read
pub async fn fetch_origin_config(
    service: &dyn BuildService,
    project: &str,
) -> Result<OriginConfig, OriginError> {
    tracing::debug!("Fetching origin configuration of {}", project);

    let text = service
        .get_attribute(project, ORIGIN_CONFIG_ATTRIBUTE)
        .await?
        .ok_or_else(|| OriginError::MissingConfig {
            project: project.to_string(),
        })?;

    OriginConfig::from_yaml(project, &text)
}
