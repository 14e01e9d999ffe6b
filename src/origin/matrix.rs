//! origin::matrix
//!
//! Lazy package matrix of origin candidates.
//!
//! For a configured project the matrix holds, per candidate origin project,
//! every package the candidate provides together with its inheritance
//! chain:
//!
//! - `[candidate]` when the package is native to the candidate
//! - `[candidate, inherited_from]` when the candidate inherits it
//!
//! ```text
//! openSUSE:Leap:15.2:Update
//!   SUSE:SLE-15-SP2:Update
//!     zypper  -> [SUSE:SLE-15-SP2:Update, SUSE:SLE-15-SP2:GA]
//!     zeromq  -> [SUSE:SLE-15-SP2:Update, SUSE:SLE-15:Update]
//!   openSUSE:Factory
//!     zziplib -> [openSUSE:Factory]
//! ```
//!
//! A project's row is built on its first lookup, with one expanded listing
//! per candidate.

use std::collections::HashMap;

use crate::core::cache::LazyMap;
use crate::service::{BuildService, DirectoryEntry, ServiceError};

use super::expand::is_marker;

/// Packages of one candidate origin, with their inheritance chains.
pub type CandidatePackages = HashMap<String, Vec<String>>;

/// Package matrix row of one configured project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectMatrix {
    candidates: HashMap<String, CandidatePackages>,
}

impl ProjectMatrix {
    /// Build a row from the expanded listings of its candidates.
    pub fn from_listings<I>(listings: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<DirectoryEntry>)>,
    {
        let candidates = listings
            .into_iter()
            .map(|(candidate, entries)| {
                let packages = entries
                    .into_iter()
                    .map(|entry| {
                        let chain = inheritance_chain(&candidate, entry.origin_project);
                        (entry.name, chain)
                    })
                    .collect();
                (candidate, packages)
            })
            .collect();
        Self { candidates }
    }

    /// Inheritance chain of `package` in `candidate`.
    pub fn chain(&self, candidate: &str, package: &str) -> Option<&[String]> {
        self.candidates
            .get(candidate)?
            .get(package)
            .map(Vec::as_slice)
    }

    /// Packages of `candidate`.
    pub fn packages(&self, candidate: &str) -> Option<&CandidatePackages> {
        self.candidates.get(candidate)
    }

    /// Whether any candidate provides `package`.
    pub fn contains_package(&self, package: &str) -> bool {
        self.candidates.values().any(|p| p.contains_key(package))
    }

    /// Number of candidates in the row.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether the row has no candidates.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

fn inheritance_chain(candidate: &str, origin_project: Option<String>) -> Vec<String> {
    match origin_project {
        Some(origin) if origin != candidate => vec![candidate.to_string(), origin],
        _ => vec![candidate.to_string()],
    }
}

/// Lazily populated package matrix keyed by configured project.
#[derive(Debug, Default)]
pub struct PackageMatrix {
    rows: LazyMap<String, ProjectMatrix>,
}

impl PackageMatrix {
    /// Create an empty matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Row of `project`, listing the non-marker `origins` on first access.
    ///
    /// # Errors
    ///
    /// Returns the service error of a failed listing; nothing is cached then.
    pub async fn row(
        &mut self,
        service: &dyn BuildService,
        project: &str,
        origins: &[String],
    ) -> Result<&ProjectMatrix, ServiceError> {
        self.rows
            .get_or_try_compute(project.to_string(), || async move {
                tracing::debug!("Building package matrix of {}", project);

                let mut listings: Vec<(String, Vec<DirectoryEntry>)> = Vec::new();
                for candidate in origins.iter().filter(|o| !is_marker(o)) {
                    if listings.iter().any(|(c, _)| c == candidate) {
                        continue;
                    }
                    let entries = service.list_project_files(candidate, true).await?;
                    listings.push((candidate.clone(), entries));
                }
                Ok(ProjectMatrix::from_listings(listings))
            })
            .await
    }

    /// Row of `project` if it has been built already.
    pub fn cached(&self, project: &str) -> Option<&ProjectMatrix> {
        self.rows.get(&project.to_string())
    }

    /// Drop all rows.
    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::mock::{MockBuildService, MockOperation};

    fn origins(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn chains_from_listing() {
        let row = ProjectMatrix::from_listings(vec![(
            "SUSE:SLE-15-SP2:Update".to_string(),
            vec![
                DirectoryEntry::inherited("zypper", "SUSE:SLE-15-SP2:GA"),
                DirectoryEntry::inherited("patchinfo.1", "SUSE:SLE-15-SP2:Update"),
                DirectoryEntry::native("libzypp"),
            ],
        )]);

        assert_eq!(
            row.chain("SUSE:SLE-15-SP2:Update", "zypper").unwrap(),
            ["SUSE:SLE-15-SP2:Update", "SUSE:SLE-15-SP2:GA"]
        );
        assert_eq!(
            row.chain("SUSE:SLE-15-SP2:Update", "patchinfo.1").unwrap(),
            ["SUSE:SLE-15-SP2:Update"]
        );
        assert_eq!(
            row.chain("SUSE:SLE-15-SP2:Update", "libzypp").unwrap(),
            ["SUSE:SLE-15-SP2:Update"]
        );
        assert!(row.chain("SUSE:SLE-15-SP2:Update", "missing").is_none());
        assert!(row.chain("openSUSE:Factory", "zypper").is_none());
        assert!(row.contains_package("libzypp"));
        assert!(!row.contains_package("missing"));
    }

    #[tokio::test]
    async fn row_skips_markers_and_is_cached() {
        let service = MockBuildService::new();
        service.add_native_packages("openSUSE:Factory", &["zziplib"]);
        service.add_package(
            "SUSE:SLE-15:Update",
            DirectoryEntry::inherited("zypper", "SUSE:SLE-15:GA"),
        );

        let mut matrix = PackageMatrix::new();
        let candidates = origins(&["<devel>", "SUSE:SLE-15:Update", "openSUSE:Factory", "*~"]);

        let row = matrix
            .row(&service, "openSUSE:Leap:15.2:Update", &candidates)
            .await
            .unwrap();
        assert_eq!(row.len(), 2);
        assert_eq!(
            row.chain("SUSE:SLE-15:Update", "zypper").unwrap(),
            ["SUSE:SLE-15:Update", "SUSE:SLE-15:GA"]
        );
        assert_eq!(
            row.chain("openSUSE:Factory", "zziplib").unwrap(),
            ["openSUSE:Factory"]
        );

        matrix
            .row(&service, "openSUSE:Leap:15.2:Update", &candidates)
            .await
            .unwrap();
        assert_eq!(
            service.count_operations(|op| matches!(op, MockOperation::ListProjectFiles { .. })),
            2
        );
        assert!(matrix.cached("openSUSE:Leap:15.2:Update").is_some());
        assert!(matrix.cached("openSUSE:Leap:15.1:Update").is_none());
    }

    #[tokio::test]
    async fn failed_listing_is_not_cached() {
        let service = MockBuildService::new();
        let mut matrix = PackageMatrix::new();

        assert!(matrix
            .row(&service, "P", &origins(&["Missing:Project"]))
            .await
            .is_err());
        assert!(matrix.cached("P").is_none());
    }
}
