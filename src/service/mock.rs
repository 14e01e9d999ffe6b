//! service::mock
//!
//! Mock build service for deterministic testing.
//!
//! # Design
//!
//! The mock stores projects, attributes, package listings, link chains and
//! requests in memory and answers the typed queries of the `BuildService`
//! trait directly. Every call is recorded so tests can assert how often the
//! resolver went to the network. Failures can be injected per operation.
//!
//! # Example
//!
//! ```
//! use obs_origin::service::mock::MockBuildService;
//! use obs_origin::service::{BuildService, DirectoryEntry, ProjectQuery};
//!
//! # tokio_test::block_on(async {
//! let service = MockBuildService::new();
//! service.add_package("openSUSE:Factory", DirectoryEntry::native("zypper"));
//! service.mark_attribute("openSUSE:Factory", "OBS:Maintained");
//!
//! let maintained = service
//!     .search_projects(&ProjectQuery::WithAttribute("OBS:Maintained".into()))
//!     .await
//!     .unwrap();
//! assert_eq!(maintained, vec!["openSUSE:Factory"]);
//! # });
//! ```

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::traits::{
    BsRequest, BuildService, DirectoryEntry, LinkedPackage, ProjectQuery, RequestQuery,
    ServiceError,
};

/// Mock build service for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone, Default)]
pub struct MockBuildService {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockInner>>,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct MockInner {
    /// Projects by name.
    projects: BTreeMap<String, MockProject>,
    /// All requests, in insertion order.
    requests: Vec<BsRequest>,
    /// Method to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// A project held by the mock.
#[derive(Debug, Default)]
struct MockProject {
    /// Attributes, with their first value if they have one.
    attributes: BTreeMap<String, Option<String>>,
    /// Package listing (native and inherited entries).
    packages: Vec<DirectoryEntry>,
    /// Link chains by package name.
    links: HashMap<String, Vec<LinkedPackage>>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail get_attribute with the given error.
    GetAttribute(ServiceError),
    /// Fail search_projects with the given error.
    SearchProjects(ServiceError),
    /// Fail search_requests with the given error.
    SearchRequests(ServiceError),
    /// Fail list_project_files with the given error.
    ListProjectFiles(ServiceError),
    /// Fail list_package_links with the given error.
    ListPackageLinks(ServiceError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    GetAttribute { project: String, attribute: String },
    SearchProjects(ProjectQuery),
    SearchRequests(RequestQuery),
    ListProjectFiles { project: String, expand: bool },
    ListPackageLinks { project: String, package: String },
}

impl MockBuildService {
    /// Create a new empty mock service.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockInner> {
        self.inner.lock().unwrap()
    }

    /// Create a project without packages.
    pub fn add_project(&self, project: &str) {
        self.lock().projects.entry(project.to_string()).or_default();
    }

    /// Add a package listing entry to a project, creating the project.
    pub fn add_package(&self, project: &str, entry: DirectoryEntry) {
        self.lock()
            .projects
            .entry(project.to_string())
            .or_default()
            .packages
            .push(entry);
    }

    /// Add several native packages to a project.
    pub fn add_native_packages(&self, project: &str, packages: &[&str]) {
        for package in packages {
            self.add_package(project, DirectoryEntry::native(*package));
        }
    }

    /// Set an attribute value on a project, creating the project.
    pub fn set_attribute(&self, project: &str, attribute: &str, value: &str) {
        self.lock()
            .projects
            .entry(project.to_string())
            .or_default()
            .attributes
            .insert(attribute.to_string(), Some(value.to_string()));
    }

    /// Set a value-less attribute on a project, creating the project.
    pub fn mark_attribute(&self, project: &str, attribute: &str) {
        self.lock()
            .projects
            .entry(project.to_string())
            .or_default()
            .attributes
            .insert(attribute.to_string(), None);
    }

    /// Set the link chain of a package.
    pub fn set_links(&self, project: &str, package: &str, chain: &[(&str, &str)]) {
        let chain = chain
            .iter()
            .map(|(project, package)| LinkedPackage {
                project: project.to_string(),
                package: package.to_string(),
            })
            .collect();
        self.lock()
            .projects
            .entry(project.to_string())
            .or_default()
            .links
            .insert(package.to_string(), chain);
    }

    /// Add a request.
    pub fn add_request(&self, request: BsRequest) {
        self.lock().requests.push(request);
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use obs_origin::service::mock::{MockBuildService, FailOn};
    /// use obs_origin::service::ServiceError;
    ///
    /// let service = MockBuildService::new()
    ///     .fail_on(FailOn::SearchRequests(ServiceError::NetworkError("down".into())));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on = Some(fail_on);
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        self.lock().fail_on = None;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Count recorded operations matching a predicate.
    pub fn count_operations(&self, predicate: impl Fn(&MockOperation) -> bool) -> usize {
        self.lock().operations.iter().filter(|op| predicate(op)).count()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        self.lock().operations.clear();
    }

    /// Record an operation.
    fn record(&self, op: MockOperation) {
        self.lock().operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, expected: &str) -> Option<ServiceError> {
        match &self.lock().fail_on {
            Some(FailOn::GetAttribute(e)) if expected == "get_attribute" => Some(e.clone()),
            Some(FailOn::SearchProjects(e)) if expected == "search_projects" => Some(e.clone()),
            Some(FailOn::SearchRequests(e)) if expected == "search_requests" => Some(e.clone()),
            Some(FailOn::ListProjectFiles(e)) if expected == "list_project_files" => {
                Some(e.clone())
            }
            Some(FailOn::ListPackageLinks(e)) if expected == "list_package_links" => {
                Some(e.clone())
            }
            _ => None,
        }
    }
}

fn unknown_project(project: &str) -> ServiceError {
    ServiceError::NotFound(format!("Project not found: {}", project))
}

#[async_trait]
impl BuildService for MockBuildService {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get_attribute(
        &self,
        project: &str,
        attribute: &str,
    ) -> Result<Option<String>, ServiceError> {
        self.record(MockOperation::GetAttribute {
            project: project.to_string(),
            attribute: attribute.to_string(),
        });

        if let Some(e) = self.check_fail("get_attribute") {
            return Err(e);
        }

        let inner = self.lock();
        let project = inner
            .projects
            .get(project)
            .ok_or_else(|| unknown_project(project))?;
        Ok(project.attributes.get(attribute).cloned().flatten())
    }

    async fn search_projects(&self, query: &ProjectQuery) -> Result<Vec<String>, ServiceError> {
        self.record(MockOperation::SearchProjects(query.clone()));

        if let Some(e) = self.check_fail("search_projects") {
            return Err(e);
        }

        let inner = self.lock();
        Ok(inner
            .projects
            .iter()
            .filter(|(name, project)| match query {
                ProjectQuery::WithAttribute(attribute) => {
                    project.attributes.contains_key(attribute)
                }
                ProjectQuery::NameFamily { .. } => query.matches_name(name),
            })
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn search_requests(
        &self,
        query: &RequestQuery,
    ) -> Result<Vec<BsRequest>, ServiceError> {
        self.record(MockOperation::SearchRequests(query.clone()));

        if let Some(e) = self.check_fail("search_requests") {
            return Err(e);
        }

        let inner = self.lock();
        Ok(inner
            .requests
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect())
    }

    async fn list_project_files(
        &self,
        project: &str,
        expand: bool,
    ) -> Result<Vec<DirectoryEntry>, ServiceError> {
        self.record(MockOperation::ListProjectFiles {
            project: project.to_string(),
            expand,
        });

        if let Some(e) = self.check_fail("list_project_files") {
            return Err(e);
        }

        let inner = self.lock();
        let listed = inner
            .projects
            .get(project)
            .ok_or_else(|| unknown_project(project))?;

        // Expanded listings name the holding project on every entry.
        Ok(listed
            .packages
            .iter()
            .filter(|e| expand || e.origin_project.as_deref().map_or(true, |o| o == project))
            .map(|e| DirectoryEntry {
                name: e.name.clone(),
                origin_project: if expand {
                    Some(e.origin_project.clone().unwrap_or_else(|| project.to_string()))
                } else {
                    None
                },
            })
            .collect())
    }

    async fn list_package_links(
        &self,
        project: &str,
        package: &str,
    ) -> Result<Vec<LinkedPackage>, ServiceError> {
        self.record(MockOperation::ListPackageLinks {
            project: project.to_string(),
            package: package.to_string(),
        });

        if let Some(e) = self.check_fail("list_package_links") {
            return Err(e);
        }

        let inner = self.lock();
        let listed = inner
            .projects
            .get(project)
            .ok_or_else(|| unknown_project(project))?;

        if let Some(chain) = listed.links.get(package) {
            return Ok(chain.clone());
        }
        if listed.packages.iter().any(|e| e.name == package) {
            return Ok(Vec::new());
        }
        Err(ServiceError::NotFound(format!(
            "Package not found: {}/{}",
            project, package
        )))
    }
}
