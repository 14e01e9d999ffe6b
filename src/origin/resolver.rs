//! origin::resolver
//!
//! Resolution of the origin project of packages.
//!
//! # Algorithm
//!
//! For a package in a project:
//!
//! 1. `patchinfo*` packages and linked incidents (`name.N` whose `name` is
//!    provided by a candidate origin) have no origin.
//! 2. Optionally, the project is replaced by the project the package is
//!    inherited from (last element of its link chain).
//! 3. If the project lists `<devel>` as an origin and the package has a
//!    development project, that project is the origin.
//! 4. Otherwise the candidates are tried in configured order. The first
//!    candidate providing the package decides: its inheritance chain is
//!    walked from the most original end and the first element is returned
//!    that is a source of an accepted submission to the package, or any
//!    element if the package never received a submission from a candidate.
//!
//! A package without a matching candidate has no origin. That is a normal
//! result, not an error.
//!
//! # Caching
//!
//! The resolver owns every cache (discovery searches, configurations,
//! expansions, development projects, package matrix) and never invalidates
//! them; call [`OriginResolver::clear_caches`] to start over. All methods
//! take `&mut self`, so one resolver serves one task at a time.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use obs_origin::origin::OriginResolver;
//! use obs_origin::service::obs::ObsClient;
//!
//! let client = ObsClient::new("https://api.opensuse.org", None, None)?;
//! let mut resolver = OriginResolver::new(Arc::new(client));
//! let origin = resolver
//!     .find_package_origin("zypper", "openSUSE:Leap:15.2:Update", true)
//!     .await?;
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use serde::Serialize;

use super::config::{fetch_origin_config, OriginConfig, ORIGIN_CONFIG_ATTRIBUTE};
use super::devel::DevelProjects;
use super::expand::{expand_origins, is_marker, DEVEL_MARKER};
use super::matrix::{PackageMatrix, ProjectMatrix};
use super::OriginError;
use crate::core::cache::LazyMap;
use crate::service::{BuildService, ProjectQuery, RequestQuery};

/// Attribute marking the maintenance project.
pub const MAINTENANCE_PROJECT_ATTRIBUTE: &str = "OBS:MaintenanceProject";

/// Attribute marking maintained projects.
pub const MAINTAINED_ATTRIBUTE: &str = "OBS:Maintained";

/// Name prefix of patch information pseudo packages.
const PATCHINFO_PREFIX: &str = "patchinfo";

/// A package of a project listing and its resolved origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageOrigin {
    /// Package name
    pub package: String,
    /// Project that holds the package
    pub project: String,
    /// Origin project, if one was found
    pub origin: Option<String>,
}

/// Finds origin projects of packages.
pub struct OriginResolver {
    service: Arc<dyn BuildService>,
    maintenance: Option<Option<String>>,
    maintained: Option<Vec<String>>,
    configured: Option<Vec<String>>,
    configs: LazyMap<String, OriginConfig>,
    expanded: LazyMap<String, Vec<String>>,
    devel: DevelProjects,
    matrix: PackageMatrix,
}

impl std::fmt::Debug for OriginResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OriginResolver")
            .field("service", &self.service.name())
            .field("configured", &self.configured)
            .field("cached_configs", &self.configs.len())
            .field("cached_expansions", &self.expanded.len())
            .finish()
    }
}

/// Base name of a package with an incident number suffix (`name.1234`).
pub fn strip_incident_suffix(package: &str) -> Option<&str> {
    let (base, suffix) = package.rsplit_once('.')?;
    if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
        Some(base)
    } else {
        None
    }
}

impl OriginResolver {
    /// Create a resolver with empty caches.
    pub fn new(service: Arc<dyn BuildService>) -> Self {
        Self {
            service,
            maintenance: None,
            maintained: None,
            configured: None,
            configs: LazyMap::new(),
            expanded: LazyMap::new(),
            devel: DevelProjects::new(),
            matrix: PackageMatrix::new(),
        }
    }

    /// The build service this resolver reads from.
    pub fn service(&self) -> &dyn BuildService {
        self.service.as_ref()
    }

    /// Drop every cached lookup.
    pub fn clear_caches(&mut self) {
        self.maintenance = None;
        self.maintained = None;
        self.configured = None;
        self.configs.clear();
        self.expanded.clear();
        self.devel.clear();
        self.matrix.clear();
    }

    // =========================================================================
    // Discovery
    // =========================================================================

    /// The project carrying `OBS:MaintenanceProject`.
    ///
    /// Warns and returns `None` when there is none; warns and returns the
    /// first when there are several.
    pub async fn maintenance_project(&mut self) -> Result<Option<&str>, OriginError> {
        if self.maintenance.is_none() {
            let projects = self
                .service
                .search_projects(&ProjectQuery::WithAttribute(
                    MAINTENANCE_PROJECT_ATTRIBUTE.to_string(),
                ))
                .await?;

            if projects.is_empty() {
                tracing::warn!("The build service defines no maintenance projects");
            } else if projects.len() > 1 {
                tracing::warn!("The build service defines multiple maintenance projects");
            }
            self.maintenance = Some(projects.into_iter().next());
        }

        Ok(self.maintenance.as_ref().and_then(|p| p.as_deref()))
    }

    /// All projects carrying `OBS:Maintained`.
    pub async fn maintained_projects(&mut self) -> Result<&[String], OriginError> {
        if self.maintained.is_none() {
            let projects = self
                .service
                .search_projects(&ProjectQuery::WithAttribute(MAINTAINED_ATTRIBUTE.to_string()))
                .await?;
            self.maintained = Some(projects);
        }

        Ok(self.maintained.as_deref().unwrap_or_default())
    }

    /// All projects carrying an origin configuration.
    pub async fn configured_projects(&mut self) -> Result<&[String], OriginError> {
        if self.configured.is_none() {
            let projects = self
                .service
                .search_projects(&ProjectQuery::WithAttribute(
                    ORIGIN_CONFIG_ATTRIBUTE.to_string(),
                ))
                .await?;
            tracing::debug!("{} projects have an origin configuration", projects.len());
            self.configured = Some(projects);
        }

        Ok(self.configured.as_deref().unwrap_or_default())
    }

    /// Whether `project` carries an origin configuration.
    pub async fn is_configured(&mut self, project: &str) -> Result<bool, OriginError> {
        Ok(self
            .configured_projects()
            .await?
            .iter()
            .any(|p| p == project))
    }

    // =========================================================================
    // Configuration and expansion
    // =========================================================================

    /// Decoded origin configuration of `project`.
    ///
    /// # Errors
    ///
    /// `MissingConfig` or `MalformedConfig` when the configuration is absent
    /// or cannot be decoded.
    pub async fn project_origin_config(
        &mut self,
        project: &str,
    ) -> Result<&OriginConfig, OriginError> {
        let service = self.service.as_ref();
        self.configs
            .get_or_try_compute(project.to_string(), || {
                fetch_origin_config(service, project)
            })
            .await
    }

    /// Expanded candidate origins of `project`, or `None` if it is not
    /// origin-configured.
    pub async fn project_origins(
        &mut self,
        project: &str,
    ) -> Result<Option<&[String]>, OriginError> {
        if !self.is_configured(project).await? {
            return Ok(None);
        }

        let key = project.to_string();
        if !self.expanded.contains(&key) {
            let config = self.project_origin_config(project).await?.clone();
            let origins = expand_origins(self.service.as_ref(), project, &config).await?;
            tracing::debug!("Origins of {}: {:?}", project, origins);
            self.expanded.insert(key.clone(), origins);
        }

        Ok(self.expanded.get(&key).map(Vec::as_slice))
    }

    /// Expanded candidate origins of every configured project.
    pub async fn expanded_origins(&mut self) -> Result<BTreeMap<String, Vec<String>>, OriginError> {
        let projects = self.configured_projects().await?.to_vec();

        let mut expanded = BTreeMap::new();
        for project in projects {
            let origins = self
                .project_origins(&project)
                .await?
                .map(<[String]>::to_vec)
                .unwrap_or_default();
            expanded.insert(project, origins);
        }
        Ok(expanded)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Package matrix row of `project`.
    ///
    /// # Errors
    ///
    /// `NotOriginProject` if `project` has no origin configuration.
    pub async fn package_matrix(&mut self, project: &str) -> Result<&ProjectMatrix, OriginError> {
        let origins = self
            .project_origins(project)
            .await?
            .map(<[String]>::to_vec)
            .ok_or_else(|| OriginError::NotOriginProject(project.to_string()))?;

        let service = self.service.as_ref();
        Ok(self.matrix.row(service, project, &origins).await?)
    }

    /// Development project of `package` in `project`, if one is recorded.
    pub async fn devel_project(
        &mut self,
        project: &str,
        package: &str,
    ) -> Result<Option<String>, OriginError> {
        let service = self.service.as_ref();
        Ok(self.devel.lookup(service, project, package).await?)
    }

    /// Source projects of accepted requests submitting `package` to `project`.
    pub async fn origin_from_submissions(
        &self,
        package: &str,
        project: &str,
    ) -> Result<BTreeSet<String>, OriginError> {
        let requests = self
            .service
            .search_requests(&RequestQuery::AcceptedTargeting {
                project: project.to_string(),
                package: package.to_string(),
            })
            .await?;

        Ok(requests
            .iter()
            .flat_map(|r| r.actions.iter())
            .filter(|a| a.targets(project, package))
            .filter_map(|a| a.source.as_ref().map(|s| s.project.clone()))
            .collect())
    }

    /// Whether `package` is a linked incident copy in `project`.
    ///
    /// True when the name carries an incident suffix (`name.N`) and some
    /// candidate origin of `project` provides `name`. Projects without an
    /// origin configuration have no linked incidents.
    pub async fn is_linked(&mut self, package: &str, project: &str) -> Result<bool, OriginError> {
        let Some(base) = strip_incident_suffix(package) else {
            return Ok(false);
        };
        if !self.is_configured(project).await? {
            return Ok(false);
        }

        Ok(self.package_matrix(project).await?.contains_package(base))
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Find the origin project of `package` in `project`.
    ///
    /// With `resolve_inheritance`, `project` is first replaced by the project
    /// the package is inherited from. Callers resolving many packages should
    /// do that once up front and pass `false`.
    ///
    /// Returns `None` for patchinfo packages, linked incidents, projects
    /// without an origin configuration and packages no candidate provides.
    pub async fn find_package_origin(
        &mut self,
        package: &str,
        project: &str,
        resolve_inheritance: bool,
    ) -> Result<Option<String>, OriginError> {
        if package.starts_with(PATCHINFO_PREFIX) || self.is_linked(package, project).await? {
            tracing::debug!("{}/{} is not tracked", project, package);
            return Ok(None);
        }

        let mut project = project.to_string();
        if resolve_inheritance {
            let links = self.service.list_package_links(&project, package).await?;
            if let Some(linked) = links.last() {
                tracing::debug!(
                    "{}/{} is inherited from {}",
                    project,
                    package,
                    linked.project
                );
                project = linked.project.clone();
            }
        }

        let Some(origins) = self
            .project_origins(&project)
            .await?
            .map(<[String]>::to_vec)
        else {
            tracing::debug!("Project {} has no origin definition", project);
            return Ok(None);
        };

        if origins.iter().any(|o| o == DEVEL_MARKER) {
            if let Some(devel) = self.devel_project(&project, package).await? {
                return Ok(Some(devel));
            }
        }

        let submitted = self.origin_from_submissions(package, &project).await?;
        let request_origins: HashSet<&str> = origins
            .iter()
            .map(String::as_str)
            .filter(|o| submitted.contains(*o))
            .collect();

        let matrix = self.package_matrix(&project).await?;
        for candidate in origins.iter().filter(|c| !is_marker(c)) {
            let Some(chain) = matrix.chain(candidate, package) else {
                continue;
            };
            if let Some(origin) = chain
                .iter()
                .rev()
                .find(|p| request_origins.is_empty() || request_origins.contains(p.as_str()))
            {
                return Ok(Some(origin.clone()));
            }
        }

        Ok(None)
    }

    /// Resolve the origin of every package of `project`.
    ///
    /// Patchinfo packages and linked incidents are skipped. A project without
    /// an origin configuration logs a warning and yields nothing.
    pub async fn list(&mut self, project: &str) -> Result<Vec<PackageOrigin>, OriginError> {
        if !self.is_configured(project).await? {
            tracing::warn!("Project {} has no origin definition", project);
            return Ok(Vec::new());
        }

        let entries = self.service.list_project_files(project, true).await?;

        let mut origins = Vec::with_capacity(entries.len());
        for entry in entries {
            let holder = entry.origin_project.unwrap_or_else(|| project.to_string());
            if entry.name.starts_with(PATCHINFO_PREFIX)
                || self.is_linked(&entry.name, &holder).await?
            {
                continue;
            }

            let origin = self.find_package_origin(&entry.name, &holder, false).await?;
            origins.push(PackageOrigin {
                package: entry.name,
                project: holder,
                origin,
            });
        }
        Ok(origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::mock::{FailOn, MockBuildService, MockOperation};
    use crate::service::{DirectoryEntry, ServiceError};

    fn resolver(service: &MockBuildService) -> OriginResolver {
        OriginResolver::new(Arc::new(service.clone()))
    }

    #[test]
    fn incident_suffix() {
        assert_eq!(strip_incident_suffix("zypper.1234"), Some("zypper"));
        assert_eq!(strip_incident_suffix("python-foo.1.2"), Some("python-foo.1"));
        assert_eq!(strip_incident_suffix("zypper"), None);
        assert_eq!(strip_incident_suffix("zypper."), None);
        assert_eq!(strip_incident_suffix("python3.x"), None);
    }

    #[tokio::test]
    async fn maintenance_project_discovery() {
        let service = MockBuildService::new();
        service.mark_attribute("openSUSE:Maintenance", MAINTENANCE_PROJECT_ATTRIBUTE);
        service.mark_attribute("openSUSE:Leap:15.2:Update", MAINTAINED_ATTRIBUTE);
        service.mark_attribute("openSUSE:Leap:15.1:Update", MAINTAINED_ATTRIBUTE);

        let mut resolver = resolver(&service);
        assert_eq!(
            resolver.maintenance_project().await.unwrap(),
            Some("openSUSE:Maintenance")
        );
        assert_eq!(
            resolver.maintained_projects().await.unwrap(),
            ["openSUSE:Leap:15.1:Update", "openSUSE:Leap:15.2:Update"]
        );

        resolver.maintenance_project().await.unwrap();
        resolver.maintained_projects().await.unwrap();
        assert_eq!(service.operations().len(), 2);
    }

    #[tokio::test]
    async fn no_maintenance_project() {
        let service = MockBuildService::new();
        let mut resolver = resolver(&service);
        assert_eq!(resolver.maintenance_project().await.unwrap(), None);
    }

    #[tokio::test]
    async fn unconfigured_project_has_no_matrix() {
        let service = MockBuildService::new();
        service.add_native_packages("P", &["zypper"]);

        let mut resolver = resolver(&service);
        assert!(matches!(
            resolver.package_matrix("P").await,
            Err(OriginError::NotOriginProject(ref p)) if p == "P"
        ));
        assert!(!resolver.is_linked("zypper.1", "P").await.unwrap());
        assert_eq!(resolver.project_origins("P").await.unwrap(), None);
    }

    #[tokio::test]
    async fn submissions_only_count_matching_actions() {
        let service = MockBuildService::new();
        service.add_request(crate::service::BsRequest {
            id: 7,
            state: crate::service::RequestState {
                name: "accepted".into(),
                when: None,
            },
            actions: vec![
                crate::service::RequestAction {
                    kind: "submit".into(),
                    source: Some(crate::service::PackageRef::new("SUSE:SLE-15:Update", "zypper")),
                    target: Some(crate::service::PackageRef::new("P", "zypper")),
                },
                crate::service::RequestAction {
                    kind: "submit".into(),
                    source: Some(crate::service::PackageRef::new("Other", "libzypp")),
                    target: Some(crate::service::PackageRef::new("P", "libzypp")),
                },
            ],
        });

        let resolver = resolver(&service);
        let sources = resolver.origin_from_submissions("zypper", "P").await.unwrap();
        assert_eq!(
            sources.into_iter().collect::<Vec<_>>(),
            vec!["SUSE:SLE-15:Update"]
        );
    }

    #[tokio::test]
    async fn config_errors_propagate() {
        let service = MockBuildService::new();
        service.set_attribute("P", ORIGIN_CONFIG_ATTRIBUTE, "origins: [");
        service.add_package("P", DirectoryEntry::native("zypper"));

        let mut resolver = resolver(&service);
        assert!(matches!(
            resolver.find_package_origin("zypper", "P", false).await,
            Err(OriginError::MalformedConfig { .. })
        ));
    }

    #[tokio::test]
    async fn service_errors_propagate_and_are_not_cached() {
        let service = MockBuildService::new()
            .fail_on(FailOn::SearchProjects(ServiceError::NetworkError("down".into())));
        let mut resolver = resolver(&service);

        assert!(matches!(
            resolver.configured_projects().await,
            Err(OriginError::Service(ServiceError::NetworkError(_)))
        ));

        service.clear_fail_on();
        assert!(resolver.configured_projects().await.unwrap().is_empty());
        assert_eq!(
            service.count_operations(|op| matches!(op, MockOperation::SearchProjects(_))),
            2
        );
    }

    #[tokio::test]
    async fn clear_caches_requeries() {
        let service = MockBuildService::new();
        let mut resolver = resolver(&service);

        resolver.configured_projects().await.unwrap();
        resolver.clear_caches();
        resolver.configured_projects().await.unwrap();
        assert_eq!(service.operations().len(), 2);
    }

    #[test]
    fn debug_names_service() {
        let resolver = resolver(&MockBuildService::new());
        assert!(format!("{:?}", resolver).contains("mock"));
    }
}
