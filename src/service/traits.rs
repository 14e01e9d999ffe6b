//! service::traits
//!
//! The build service operations the origin resolver depends on.
//!
//! # Design
//!
//! The `BuildService` trait is async because every operation is a network
//! round trip. Queries are typed ([`ProjectQuery`], [`RequestQuery`]) rather
//! than raw xpath strings: the HTTP client renders them into the search
//! syntax of the build service, while the mock evaluates them directly.
//!
//! No method retries on behalf of the caller beyond what the transport does
//! for connection failures. Errors are returned untranslated.
//!
//! # Example
//!
//! ```ignore
//! use obs_origin::service::{BuildService, ProjectQuery};
//!
//! async fn configured(service: &dyn BuildService) -> Result<Vec<String>, ServiceError> {
//!     service
//!         .search_projects(&ProjectQuery::WithAttribute("OSRT:OriginConfig".into()))
//!         .await
//! }
//! ```

use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors from build service operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Authentication is required but no credentials are configured.
    #[error("authentication required")]
    AuthRequired,

    /// The credentials were rejected.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The account lacks permission for the resource.
    #[error("permission denied: {0}")]
    Forbidden(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error summary from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The response body could not be decoded.
    #[error("failed to parse response: {0}")]
    Parse(String),
}

/// Project search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectQuery {
    /// Projects carrying the attribute `NAMESPACE:Name`.
    WithAttribute(String),
    /// Projects whose name starts with `prefix` and, if given, contains
    /// `:suffix`.
    NameFamily {
        /// Required name prefix
        prefix: String,
        /// Optional colon-delimited component the name must contain
        suffix: Option<String>,
    },
}

impl ProjectQuery {
    /// Render the query in the build service search syntax.
    pub fn to_xpath(&self) -> String {
        match self {
            ProjectQuery::WithAttribute(name) => format!("attribute/@name='{}'", name),
            ProjectQuery::NameFamily { prefix, suffix } => {
                let mut xpath = format!("starts-with(@name, '{}')", prefix);
                if let Some(suffix) = suffix {
                    xpath.push_str(&format!(" and contains(@name, ':{}')", suffix));
                }
                xpath
            }
        }
    }

    /// Evaluate the name-based part of the query against a project name.
    ///
    /// Attribute queries cannot be evaluated from the name alone and
    /// always return `false`.
    pub fn matches_name(&self, name: &str) -> bool {
        match self {
            ProjectQuery::WithAttribute(_) => false,
            ProjectQuery::NameFamily { prefix, suffix } => {
                name.starts_with(prefix.as_str())
                    && suffix
                        .as_ref()
                        .map_or(true, |s| name.contains(&format!(":{}", s)))
            }
        }
    }
}

/// Request search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestQuery {
    /// Accepted `change_devel` requests targeting any of the projects.
    AcceptedChangeDevel {
        /// Target projects
        targets: Vec<String>,
    },
    /// Accepted requests with an action targeting the package.
    AcceptedTargeting {
        /// Target project
        project: String,
        /// Target package
        package: String,
    },
}

impl RequestQuery {
    /// Render the query in the build service search syntax.
    pub fn to_xpath(&self) -> String {
        match self {
            RequestQuery::AcceptedChangeDevel { targets } => {
                let projects = targets
                    .iter()
                    .map(|p| format!("action/target/@project='{}'", p))
                    .collect::<Vec<_>>()
                    .join(" or ");
                format!(
                    "state/@name='accepted' and action/@type='change_devel' and ({})",
                    projects
                )
            }
            RequestQuery::AcceptedTargeting { project, package } => format!(
                "action/target/@project='{}' and action/target/@package='{}' \
                 and state/@name='accepted'",
                project, package
            ),
        }
    }

    /// Evaluate the query against a request record.
    pub fn matches(&self, request: &BsRequest) -> bool {
        if request.state.name != "accepted" {
            return false;
        }
        match self {
            RequestQuery::AcceptedChangeDevel { targets } => {
                request.actions.iter().any(|a| a.kind == "change_devel")
                    && request.actions.iter().any(|a| {
                        a.target
                            .as_ref()
                            .is_some_and(|t| targets.iter().any(|p| *p == t.project))
                    })
            }
            RequestQuery::AcceptedTargeting { project, package } => {
                request.actions.iter().any(|a| a.targets(project, package))
            }
        }
    }
}

/// A project/package pair referenced by a request action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRef {
    /// Project name
    pub project: String,
    /// Package name (absent for project-wide actions)
    pub package: Option<String>,
}

impl PackageRef {
    /// Create a reference to a package.
    pub fn new(project: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            package: Some(package.into()),
        }
    }
}

/// One action of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestAction {
    /// Action type (e.g. `submit`, `change_devel`, `maintenance_release`)
    pub kind: String,
    /// Source of the action
    pub source: Option<PackageRef>,
    /// Target of the action
    pub target: Option<PackageRef>,
}

impl RequestAction {
    /// Whether this action targets `package` in `project`.
    pub fn targets(&self, project: &str, package: &str) -> bool {
        self.target
            .as_ref()
            .is_some_and(|t| t.project == project && t.package.as_deref() == Some(package))
    }
}

/// Current state of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestState {
    /// State name (e.g. `accepted`, `declined`)
    pub name: String,
    /// When the request entered this state
    pub when: Option<NaiveDateTime>,
}

/// A build service request ("BsRequest").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BsRequest {
    /// Request ID
    pub id: u64,
    /// Current state
    pub state: RequestState,
    /// Actions in document order
    pub actions: Vec<RequestAction>,
}

/// One entry of a project directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Package name
    pub name: String,
    /// Project that actually holds the package, when the listing expands
    /// inherited packages
    pub origin_project: Option<String>,
}

impl DirectoryEntry {
    /// Create an entry for a package native to the listed project.
    pub fn native(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin_project: None,
        }
    }

    /// Create an entry for a package inherited from `origin_project`.
    pub fn inherited(name: impl Into<String>, origin_project: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin_project: Some(origin_project.into()),
        }
    }
}

/// One element of a package's link chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedPackage {
    /// Linked project
    pub project: String,
    /// Linked package
    pub package: String,
}

/// The build service operations used by the origin resolver.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, ServiceError>`; the resolver propagates
/// these untouched.
#[async_trait]
pub trait BuildService: Send + Sync {
    /// Get the service name (e.g., "obs", "mock").
    fn name(&self) -> &'static str;

    /// Read the first value of a project attribute.
    ///
    /// `attribute` is given as `NAMESPACE:Name`. Returns `None` when the
    /// project does not carry the attribute or the attribute has no value.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the project does not exist
    async fn get_attribute(
        &self,
        project: &str,
        attribute: &str,
    ) -> Result<Option<String>, ServiceError>;

    /// Search project names.
    async fn search_projects(&self, query: &ProjectQuery) -> Result<Vec<String>, ServiceError>;

    /// Search requests.
    async fn search_requests(&self, query: &RequestQuery)
        -> Result<Vec<BsRequest>, ServiceError>;

    /// List the packages of a project.
    ///
    /// With `expand`, packages inherited from other projects are included
    /// and carry their `origin_project`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the project does not exist
    async fn list_project_files(
        &self,
        project: &str,
        expand: bool,
    ) -> Result<Vec<DirectoryEntry>, ServiceError>;

    /// Return the link chain of a package, in document order.
    ///
    /// An empty chain means the package is not linked.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the package does not exist
    async fn list_package_links(
        &self,
        project: &str,
        package: &str,
    ) -> Result<Vec<LinkedPackage>, ServiceError>;
}
