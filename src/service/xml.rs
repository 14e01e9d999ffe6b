//! service::xml
//!
//! Decoding of build service XML documents.
//!
//! Only the elements and attributes the resolver needs are modelled;
//! everything else in a document is ignored.

use chrono::NaiveDateTime;
use serde::Deserialize;

use super::traits::{
    BsRequest, DirectoryEntry, LinkedPackage, PackageRef, RequestAction, RequestState,
    ServiceError,
};

/// Timestamp format of request states.
const WHEN_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// `<collection>` returned by the search API.
#[derive(Debug, Deserialize)]
struct XmlCollection {
    #[serde(rename = "project", default)]
    projects: Vec<XmlNamed>,
    #[serde(rename = "request", default)]
    requests: Vec<XmlRequest>,
}

#[derive(Debug, Deserialize)]
struct XmlNamed {
    #[serde(rename = "@name")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct XmlRequest {
    #[serde(rename = "@id", default)]
    id: u64,
    #[serde(rename = "action", default)]
    actions: Vec<XmlAction>,
    state: Option<XmlState>,
}

#[derive(Debug, Deserialize)]
struct XmlAction {
    #[serde(rename = "@type")]
    kind: String,
    source: Option<XmlPackageRef>,
    target: Option<XmlPackageRef>,
}

#[derive(Debug, Deserialize)]
struct XmlPackageRef {
    #[serde(rename = "@project")]
    project: String,
    #[serde(rename = "@package", default)]
    package: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlState {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@when", default)]
    when: Option<String>,
}

/// `<directory>` returned by source listings.
#[derive(Debug, Deserialize)]
struct XmlDirectory {
    #[serde(rename = "entry", default)]
    entries: Vec<XmlEntry>,
    linkinfo: Option<XmlLinkInfo>,
}

#[derive(Debug, Deserialize)]
struct XmlEntry {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@originproject", default)]
    origin_project: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlLinkInfo {
    #[serde(rename = "linked", default)]
    linked: Vec<XmlLinked>,
}

#[derive(Debug, Deserialize)]
struct XmlLinked {
    #[serde(rename = "@project")]
    project: String,
    #[serde(rename = "@package")]
    package: String,
}

/// `<attributes>` returned by the attribute API.
#[derive(Debug, Deserialize)]
struct XmlAttributes {
    #[serde(rename = "attribute", default)]
    attributes: Vec<XmlAttribute>,
}

#[derive(Debug, Deserialize)]
struct XmlAttribute {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@namespace", default)]
    namespace: Option<String>,
    #[serde(rename = "value", default)]
    values: Vec<String>,
}

/// `<status>` returned with error responses.
#[derive(Debug, Deserialize)]
struct XmlStatus {
    summary: Option<String>,
}

fn decode<'de, T: Deserialize<'de>>(body: &'de str) -> Result<T, ServiceError> {
    quick_xml::de::from_str(body).map_err(|e| ServiceError::Parse(e.to_string()))
}

/// Project names of a search result.
pub fn parse_project_names(body: &str) -> Result<Vec<String>, ServiceError> {
    let collection: XmlCollection = decode(body)?;
    Ok(collection.projects.into_iter().map(|p| p.name).collect())
}

/// Requests of a search result.
pub fn parse_requests(body: &str) -> Result<Vec<BsRequest>, ServiceError> {
    let collection: XmlCollection = decode(body)?;
    Ok(collection.requests.into_iter().map(Into::into).collect())
}

/// Package entries of a directory listing.
pub fn parse_directory_entries(body: &str) -> Result<Vec<DirectoryEntry>, ServiceError> {
    let directory: XmlDirectory = decode(body)?;
    Ok(directory
        .entries
        .into_iter()
        .map(|e| DirectoryEntry {
            name: e.name,
            origin_project: e.origin_project,
        })
        .collect())
}

/// `linkinfo/linked` chain of a package listing.
pub fn parse_link_chain(body: &str) -> Result<Vec<LinkedPackage>, ServiceError> {
    let directory: XmlDirectory = decode(body)?;
    Ok(directory
        .linkinfo
        .map(|info| {
            info.linked
                .into_iter()
                .map(|l| LinkedPackage {
                    project: l.project,
                    package: l.package,
                })
                .collect()
        })
        .unwrap_or_default())
}

/// First value of `attribute` (`NAMESPACE:Name`) in an attribute listing.
pub fn parse_attribute_value(body: &str, attribute: &str) -> Result<Option<String>, ServiceError> {
    let (namespace, name) = match attribute.split_once(':') {
        Some((namespace, name)) => (Some(namespace), name),
        None => (None, attribute),
    };

    let attributes: XmlAttributes = decode(body)?;
    Ok(attributes
        .attributes
        .into_iter()
        .find(|a| a.name == name && (namespace.is_none() || a.namespace.as_deref() == namespace))
        .and_then(|a| a.values.into_iter().next()))
}

/// Summary text of an error document, if the body is one.
pub fn parse_status_summary(body: &str) -> Option<String> {
    decode::<XmlStatus>(body)
        .ok()
        .and_then(|status| status.summary)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl From<XmlPackageRef> for PackageRef {
    fn from(r: XmlPackageRef) -> Self {
        PackageRef {
            project: r.project,
            package: r.package,
        }
    }
}

impl From<XmlRequest> for BsRequest {
    fn from(r: XmlRequest) -> Self {
        let state = match r.state {
            Some(state) => RequestState {
                when: state.when.as_deref().and_then(parse_when),
                name: state.name,
            },
            None => RequestState {
                name: String::new(),
                when: None,
            },
        };

        BsRequest {
            id: r.id,
            state,
            actions: r
                .actions
                .into_iter()
                .map(|a| RequestAction {
                    kind: a.kind,
                    source: a.source.map(Into::into),
                    target: a.target.map(Into::into),
                })
                .collect(),
        }
    }
}

fn parse_when(value: &str) -> Option<NaiveDateTime> {
    match NaiveDateTime::parse_from_str(value.trim(), WHEN_FORMAT) {
        Ok(when) => Some(when),
        Err(e) => {
            tracing::debug!("Ignoring unparsable request timestamp '{}': {}", value, e);
            None
        }
    }
}
