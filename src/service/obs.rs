//! service::obs
//!
//! HTTP/XML client for an Open Build Service instance.
//!
//! # Design
//!
//! This module implements the `BuildService` trait on top of the OBS REST
//! API. Every operation is a single `GET` returning an XML document, which
//! is decoded by [`super::xml`].
//!
//! # Authentication
//!
//! HTTP basic authentication with the configured account. Without an
//! account the requests are sent anonymously, and a 401 reply becomes
//! `ServiceError::AuthRequired`.
//!
//! # Retries
//!
//! Connection failures and timeouts are retried up to `connection_retries`
//! times with a fixed pause. HTTP error statuses are returned immediately;
//! retrying them is the caller's decision.
//!
//! # Example
//!
//! ```ignore
//! use obs_origin::core::config::Config;
//! use obs_origin::service::obs::ObsClient;
//! use obs_origin::service::{BuildService, ProjectQuery};
//!
//! let config = Config::load(None)?;
//! let client = ObsClient::from_config(&config)?;
//! let maintained = client
//!     .search_projects(&ProjectQuery::WithAttribute("OBS:Maintained".into()))
//!     .await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response, StatusCode, Url};

use super::traits::{
    BsRequest, BuildService, DirectoryEntry, LinkedPackage, ProjectQuery, RequestQuery,
    ServiceError,
};
use super::xml;
use crate::core::config::{
    Config, DEFAULT_CONNECTION_RETRIES, DEFAULT_RETRY_DELAY_SECS, DEFAULT_TIMEOUT_SECS,
};

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = concat!("obs-origin/", env!("CARGO_PKG_VERSION"));

/// Open Build Service client.
pub struct ObsClient {
    /// HTTP client for making requests
    client: Client,
    /// API base URL
    api_url: Url,
    /// Account name
    username: Option<String>,
    /// Account password
    password: Option<String>,
    /// Retries after a connection failure
    connection_retries: u32,
    /// Pause between connection attempts
    retry_delay: Duration,
}

// Custom Debug to avoid exposing the password
impl std::fmt::Debug for ObsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObsClient")
            .field("api_url", &self.api_url.as_str())
            .field("username", &self.username)
            .field("has_password", &self.password.is_some())
            .field("connection_retries", &self.connection_retries)
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}

impl ObsClient {
    /// Create a client for `api_url` with default transport settings.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NetworkError` if the URL is unusable or the
    /// HTTP client cannot be built.
    pub fn new(
        api_url: &str,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self, ServiceError> {
        Self::build(
            api_url,
            username,
            password,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
        .map(|client| {
            client.with_retries(
                DEFAULT_CONNECTION_RETRIES,
                Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
            )
        })
    }

    /// Create a client from the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NetworkError` if the configured URL is
    /// unusable or the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, ServiceError> {
        Self::build(
            config.api_url(),
            config.username().map(str::to_string),
            config.password().map(str::to_string),
            config.timeout(),
        )
        .map(|client| client.with_retries(config.connection_retries(), config.retry_delay()))
    }

    /// Override the retry policy for connection failures.
    pub fn with_retries(mut self, connection_retries: u32, retry_delay: Duration) -> Self {
        self.connection_retries = connection_retries;
        self.retry_delay = retry_delay;
        self
    }

    fn build(
        api_url: &str,
        username: Option<String>,
        password: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let api_url = Url::parse(api_url)
            .map_err(|e| ServiceError::NetworkError(format!("invalid API URL '{}': {}", api_url, e)))?;
        if api_url.cannot_be_a_base() {
            return Err(ServiceError::NetworkError(format!(
                "invalid API URL '{}'",
                api_url
            )));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT_VALUE)
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            api_url,
            username,
            password,
            connection_retries: DEFAULT_CONNECTION_RETRIES,
            retry_delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
        })
    }

    /// Get the API base URL.
    pub fn api_url(&self) -> &str {
        self.api_url.as_str()
    }

    /// Build the URL for an API path with query parameters.
    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    /// Send a GET request and return the body of a successful reply.
    async fn get_xml(&self, url: Url) -> Result<String, ServiceError> {
        let mut attempt = 0;
        loop {
            tracing::info!("Requested URL: {}", url);

            let mut request = self
                .client
                .get(url.clone())
                .header(ACCEPT, "application/xml");
            if let Some(ref username) = self.username {
                request = request.basic_auth(username, self.password.as_deref());
            }

            match request.send().await {
                Ok(response) => return self.handle_response(response).await,
                Err(e) if Self::is_retryable(&e) && attempt < self.connection_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "Problem connecting to server: {} (retry {}/{} in {:?})",
                        e,
                        attempt,
                        self.connection_retries,
                        self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => {
                    tracing::error!("Request failed: {}", e);
                    return Err(ServiceError::NetworkError(e.to_string()));
                }
            }
        }
    }

    /// Check if a transport error may be resolved by trying again.
    fn is_retryable(err: &reqwest::Error) -> bool {
        err.is_connect() || err.is_timeout()
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response(&self, response: Response) -> Result<String, ServiceError> {
        let status = response.status();
        tracing::debug!("Server replied with status {}", status.as_u16());

        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::NetworkError(e.to_string()))?;
        tracing::debug!("Response content:\n{}\n---", body);

        if status.is_success() {
            return Ok(body);
        }

        let message = xml::parse_status_summary(&body).unwrap_or_else(|| {
            format!(
                "Server replied with: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )
            .trim_end()
            .to_string()
        });

        Err(match status {
            StatusCode::UNAUTHORIZED if self.username.is_none() => ServiceError::AuthRequired,
            StatusCode::UNAUTHORIZED => ServiceError::AuthFailed(message),
            StatusCode::FORBIDDEN => ServiceError::Forbidden(message),
            StatusCode::NOT_FOUND => ServiceError::NotFound(message),
            _ => ServiceError::ApiError {
                status: status.as_u16(),
                message,
            },
        })
    }
}

#[async_trait]
impl BuildService for ObsClient {
    fn name(&self) -> &'static str {
        "obs"
    }

    async fn get_attribute(
        &self,
        project: &str,
        attribute: &str,
    ) -> Result<Option<String>, ServiceError> {
        let url = self.endpoint(&["source", project, "_attribute", attribute], &[]);
        let body = self.get_xml(url).await?;
        xml::parse_attribute_value(&body, attribute)
    }

    async fn search_projects(&self, query: &ProjectQuery) -> Result<Vec<String>, ServiceError> {
        let xpath = query.to_xpath();
        let url = self.endpoint(&["search", "project", "id"], &[("match", &xpath)]);
        let body = self.get_xml(url).await?;
        xml::parse_project_names(&body)
    }

    async fn search_requests(
        &self,
        query: &RequestQuery,
    ) -> Result<Vec<BsRequest>, ServiceError> {
        let xpath = query.to_xpath();
        let url = self.endpoint(&["search", "request"], &[("match", &xpath)]);
        let body = self.get_xml(url).await?;
        xml::parse_requests(&body)
    }

    async fn list_project_files(
        &self,
        project: &str,
        expand: bool,
    ) -> Result<Vec<DirectoryEntry>, ServiceError> {
        let query: &[(&str, &str)] = if expand { &[("expand", "1")] } else { &[] };
        let url = self.endpoint(&["source", project], query);
        let body = self.get_xml(url).await?;
        xml::parse_directory_entries(&body)
    }

    async fn list_package_links(
        &self,
        project: &str,
        package: &str,
    ) -> Result<Vec<LinkedPackage>, ServiceError> {
        let url = self.endpoint(&["source", project, package], &[("withlinked", "1")]);
        let body = self.get_xml(url).await?;
        xml::parse_link_chain(&body)
    }
}
