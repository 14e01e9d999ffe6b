//! origin
//!
//! Origin resolution for packages of maintained projects.
//!
//! # Architecture
//!
//! Leaf first:
//!
//! - [`family`]: numeric ordering of project family names
//! - [`config`]: the per-project origin configuration
//! - [`expand`]: wildcard expansion into ordered candidate lists
//! - [`devel`]: lazy development project lookup
//! - [`matrix`]: lazy package matrix of candidate origins
//! - [`resolver`]: [`OriginResolver`], which combines all of the above
//!
//! Every lookup is a read-through cache owned by the resolver. Nothing is
//! invalidated while the resolver lives.

pub mod config;
pub mod devel;
pub mod expand;
pub mod family;
pub mod matrix;
pub mod resolver;

pub use config::{OriginConfig, OriginEntry, ORIGIN_CONFIG_ATTRIBUTE};
pub use expand::DEVEL_MARKER;
pub use resolver::{OriginResolver, PackageOrigin};

use thiserror::Error;

use crate::service::ServiceError;

/// Errors from origin resolution.
#[derive(Debug, Error)]
pub enum OriginError {
    /// A build service operation failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The project has no origin configuration.
    #[error("project '{project}' has no origin configuration")]
    MissingConfig { project: String },

    /// The origin configuration could not be decoded.
    #[error("malformed origin configuration of '{project}': {source}")]
    MalformedConfig {
        project: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The project is not an origin-configured project.
    #[error("'{0}' is not an origin project")]
    NotOriginProject(String),
}
