//! origin::expand
//!
//! Expansion of wildcard origin patterns into concrete project lists.
//!
//! # Patterns
//!
//! Trailing `~` is stripped from every configured name first. Then:
//!
//! - a name without `*` is used verbatim (this includes `<devel>`);
//! - `*` alone, or any pattern whose part before the last `*` is empty or
//!   `*`, contributes nothing;
//! - `Prefix*Suffix` matches every project starting with `Prefix` and, when
//!   `Suffix` is not empty, containing `:Suffix`.
//!
//! Family matches are ordered by descending family key and limited to keys
//! not above the key of the configured project itself, so a project never
//! takes origins from newer releases. The concatenated list is finally
//! passed through [`family_sorted`](super::family::family_sorted).

use super::config::OriginConfig;
use super::family::{family_sort_key, family_sorted, sort_descending};
use crate::service::{BuildService, ProjectQuery, ServiceError};

/// Marker standing for the package's development project.
pub const DEVEL_MARKER: &str = "<devel>";

/// Marker names that never denote a project.
pub const MARKERS: [&str; 3] = [DEVEL_MARKER, "*", "*~"];

/// Whether `name` is a marker rather than a project name.
pub fn is_marker(name: &str) -> bool {
    MARKERS.contains(&name)
}

/// A configured origin name, classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginPattern<'a> {
    /// A project name or marker, used as is.
    Literal(&'a str),
    /// A wildcard that expands to nothing.
    Disabled,
    /// A project family.
    Family {
        /// Required name prefix
        prefix: &'a str,
        /// Required `:`-component, if any
        suffix: Option<&'a str>,
    },
}

impl<'a> OriginPattern<'a> {
    /// Classify a configured origin name.
    ///
    /// ```
    /// use obs_origin::origin::expand::OriginPattern;
    ///
    /// assert_eq!(OriginPattern::parse("openSUSE:Factory~"), OriginPattern::Literal("openSUSE:Factory"));
    /// assert_eq!(OriginPattern::parse("*~"), OriginPattern::Disabled);
    /// assert_eq!(
    ///     OriginPattern::parse("SUSE:SLE-15*:Update"),
    ///     OriginPattern::Family { prefix: "SUSE:SLE-15", suffix: Some(":Update") }
    /// );
    /// ```
    pub fn parse(name: &'a str) -> Self {
        let name = name.trim_end_matches('~');
        match name.rsplit_once('*') {
            None => OriginPattern::Literal(name),
            Some(("", _)) | Some(("*", _)) => OriginPattern::Disabled,
            Some((prefix, suffix)) => OriginPattern::Family {
                prefix,
                suffix: (!suffix.is_empty()).then_some(suffix),
            },
        }
    }
}

/// Expand the configuration of `project` into its ordered candidate list.
///
/// # Errors
///
/// Returns the service error of a failed family search.
pub async fn expand_origins(
    service: &dyn BuildService,
    project: &str,
    config: &OriginConfig,
) -> Result<Vec<String>, ServiceError> {
    let max_version = family_sort_key(project);
    let mut expanded: Vec<String> = Vec::new();

    for name in config.names() {
        match OriginPattern::parse(name) {
            OriginPattern::Literal(name) => expanded.push(name.to_string()),
            OriginPattern::Disabled => {}
            OriginPattern::Family { prefix, suffix } => {
                let query = ProjectQuery::NameFamily {
                    prefix: prefix.to_string(),
                    suffix: suffix.map(|s| s.trim_start_matches(':').to_string()),
                };
                let mut family = service.search_projects(&query).await?;
                tracing::debug!(
                    "Pattern {} of {} matches {} projects",
                    name,
                    project,
                    family.len()
                );

                sort_descending(&mut family);
                expanded.extend(
                    family
                        .into_iter()
                        .filter(|f| family_sort_key(f) <= max_version),
                );
            }
        }
    }

    Ok(family_sorted(&expanded).cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::mock::{MockBuildService, MockOperation};

    fn config(names: &[&str]) -> OriginConfig {
        let yaml = names
            .iter()
            .map(|n| format!("- '{}': {{}}\n", n))
            .collect::<String>();
        OriginConfig::from_yaml("test", &format!("origins:\n{}", yaml)).unwrap()
    }

    fn service_with(projects: &[&str]) -> MockBuildService {
        let service = MockBuildService::new();
        for project in projects {
            service.add_project(project);
        }
        service
    }

    #[test]
    fn pattern_classification() {
        assert_eq!(OriginPattern::parse("<devel>"), OriginPattern::Literal("<devel>"));
        assert_eq!(OriginPattern::parse("*"), OriginPattern::Disabled);
        assert_eq!(OriginPattern::parse("**"), OriginPattern::Disabled);
        assert_eq!(
            OriginPattern::parse("openSUSE:Leap:15.*"),
            OriginPattern::Family {
                prefix: "openSUSE:Leap:15.",
                suffix: None
            }
        );
        assert_eq!(
            OriginPattern::parse("SUSE:SLE-15*Update~"),
            OriginPattern::Family {
                prefix: "SUSE:SLE-15",
                suffix: Some("Update")
            }
        );
    }

    #[test]
    fn markers() {
        assert!(is_marker("<devel>"));
        assert!(is_marker("*~"));
        assert!(!is_marker("openSUSE:Factory"));
    }

    #[tokio::test]
    async fn literals_pass_through() {
        let service = MockBuildService::new();
        let expanded = expand_origins(
            &service,
            "openSUSE:Leap:15.2:Update",
            &config(&["<devel>", "openSUSE:Factory~", "*~"]),
        )
        .await
        .unwrap();

        assert_eq!(expanded, vec!["<devel>", "openSUSE:Factory"]);
        assert!(service.operations().is_empty());
    }

    #[tokio::test]
    async fn family_expansion_is_bounded_and_sorted() {
        let service = service_with(&[
            "SUSE:SLE-15:Update",
            "SUSE:SLE-15-SP1:Update",
            "SUSE:SLE-15-SP2:Update",
            "SUSE:SLE-15-SP3:Update",
            "SUSE:SLE-15-SP2:GA",
        ]);

        let expanded = expand_origins(
            &service,
            "SUSE:SLE-15-SP2:Update",
            &config(&["SUSE:SLE-15*Update", "openSUSE:Factory"]),
        )
        .await
        .unwrap();

        assert_eq!(
            expanded,
            vec![
                "SUSE:SLE-15-SP2:Update",
                "SUSE:SLE-15-SP1:Update",
                "SUSE:SLE-15:Update",
                "openSUSE:Factory",
            ]
        );
        assert_eq!(
            service.operations(),
            vec![MockOperation::SearchProjects(ProjectQuery::NameFamily {
                prefix: "SUSE:SLE-15".into(),
                suffix: Some("Update".into()),
            })]
        );
    }

    #[tokio::test]
    async fn family_expansion_without_suffix() {
        let service = service_with(&["openSUSE:Leap:15.1", "openSUSE:Leap:15.2", "openSUSE:Leap:15.3"]);

        let expanded = expand_origins(
            &service,
            "openSUSE:Leap:15.2:Update",
            &config(&["openSUSE:Leap:15.*"]),
        )
        .await
        .unwrap();

        assert_eq!(expanded, vec!["openSUSE:Leap:15.2", "openSUSE:Leap:15.1"]);
    }

    #[tokio::test]
    async fn empty_family_contributes_nothing() {
        let service = MockBuildService::new();

        let expanded = expand_origins(
            &service,
            "SUSE:SLE-15:Update",
            &config(&["SUSE:SLE-12*", "<devel>"]),
        )
        .await
        .unwrap();

        assert_eq!(expanded, vec!["<devel>"]);
    }

    #[tokio::test]
    async fn configured_order_is_family_sorted() {
        let service = MockBuildService::new();

        let expanded = expand_origins(
            &service,
            "openSUSE:Leap:15.2:Update",
            &config(&[
                "<devel>",
                "SUSE:SLE-15:Update",
                "SUSE:SLE-15-SP1:Update",
                "SUSE:SLE-15-SP2:Update",
                "openSUSE:Leap:15.1:Update",
                "openSUSE:Factory",
                "*~",
            ]),
        )
        .await
        .unwrap();

        assert_eq!(
            expanded,
            vec![
                "<devel>",
                "SUSE:SLE-15-SP2:Update",
                "SUSE:SLE-15-SP1:Update",
                "SUSE:SLE-15:Update",
                "openSUSE:Leap:15.1:Update",
                "openSUSE:Factory",
            ]
        );
    }

    #[tokio::test]
    async fn search_failure_propagates() {
        let service = MockBuildService::new().fail_on(crate::service::mock::FailOn::SearchProjects(
            ServiceError::NetworkError("down".into()),
        ));

        assert!(expand_origins(&service, "P", &config(&["SUSE:SLE-15*"]))
            .await
            .is_err());
    }
}
