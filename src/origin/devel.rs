//! origin::devel
//!
//! Lazy lookup of package development projects.
//!
//! The development project of a package is the source project of the most
//! recently accepted `change_devel` request targeting it. All requests of a
//! project are fetched in one search the first time the project is looked
//! up; later lookups, including misses, are answered from the cache.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::core::cache::LazyMap;
use crate::service::{BsRequest, BuildService, RequestQuery, ServiceError};

/// Development projects keyed by `(project, package)`.
pub type DevelMap = HashMap<(String, String), String>;

/// Lazily populated development project table.
#[derive(Debug, Default)]
pub struct DevelProjects {
    by_project: LazyMap<String, DevelMap>,
}

impl DevelProjects {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// All development projects recorded for packages of `project`.
    ///
    /// # Errors
    ///
    /// Returns the service error of a failed search; nothing is cached then.
    pub async fn for_project(
        &mut self,
        service: &dyn BuildService,
        project: &str,
    ) -> Result<&DevelMap, ServiceError> {
        self.by_project
            .get_or_try_compute(project.to_string(), || async move {
                tracing::debug!("Looking up development projects of {}", project);
                query_devel_projects(service, &[project.to_string()]).await
            })
            .await
    }

    /// Development project of `package` in `project`, if one is recorded.
    pub async fn lookup(
        &mut self,
        service: &dyn BuildService,
        project: &str,
        package: &str,
    ) -> Result<Option<String>, ServiceError> {
        let map = self.for_project(service, project).await?;
        Ok(map
            .get(&(project.to_string(), package.to_string()))
            .cloned())
    }

    /// Number of projects already looked up.
    pub fn cached_projects(&self) -> usize {
        self.by_project.len()
    }

    /// Drop all cached lookups.
    pub fn clear(&mut self) {
        self.by_project.clear();
    }
}

/// Search the accepted `change_devel` requests targeting `projects` and keep
/// the newest per target package.
pub async fn query_devel_projects(
    service: &dyn BuildService,
    projects: &[String],
) -> Result<DevelMap, ServiceError> {
    let requests = service
        .search_requests(&RequestQuery::AcceptedChangeDevel {
            targets: projects.to_vec(),
        })
        .await?;
    Ok(latest_devel_projects(&requests, projects))
}

/// Group `change_devel` actions by target and keep the newest source.
///
/// Requests without a timestamp lose against any dated request; among equal
/// timestamps the first request wins.
pub fn latest_devel_projects(requests: &[BsRequest], projects: &[String]) -> DevelMap {
    let mut newest: HashMap<(String, String), (Option<NaiveDateTime>, String)> = HashMap::new();

    for request in requests {
        let when = request.state.when;
        for action in request.actions.iter().filter(|a| a.kind == "change_devel") {
            let (Some(source), Some(target)) = (&action.source, &action.target) else {
                continue;
            };
            let Some(package) = &target.package else {
                continue;
            };
            if !projects.contains(&target.project) {
                continue;
            }

            let key = (target.project.clone(), package.clone());
            match newest.get(&key) {
                Some((seen, _)) if *seen >= when => {}
                _ => {
                    newest.insert(key, (when, source.project.clone()));
                }
            }
        }
    }

    newest
        .into_iter()
        .map(|(key, (_, source))| (key, source))
        .collect()
}
