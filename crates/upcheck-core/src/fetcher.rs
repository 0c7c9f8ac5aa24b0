use log::debug;
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::version::AppVersion;

pub const DEFAULT_VERSION_ENDPOINT: &str = "https://updates.upcheck.dev/version.json";

/// Latest published version metadata as served by the version endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub latest_version: AppVersion,
    pub update_message: String,
    pub show_message: bool,
}

impl VersionInfo {
    /// Decode a version payload.
    ///
    /// # Errors
    /// Returns an error when the body is not JSON, a required field is
    /// missing, or `latest_version` is not a valid version.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

/// Request descriptor for the version endpoint.
#[derive(Debug, Clone)]
pub struct VersionRequest {
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
}

impl VersionRequest {
    #[must_use]
    pub fn version(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::GET,
            headers: HeaderMap::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

impl Default for VersionRequest {
    fn default() -> Self {
        Self::version(DEFAULT_VERSION_ENDPOINT)
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to request version info: {0}")]
    Request(#[source] reqwest::Error),
    #[error("version info request failed with HTTP {status}{body_snippet}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body_snippet: String,
    },
    #[error("failed to read version info response: {0}")]
    Body(#[source] reqwest::Error),
    #[error("failed to parse version info: {0}")]
    Parse(#[source] serde_json::Error),
}

/// Issue a single request for version info.
///
/// # Errors
/// Returns an error when the request fails, the endpoint answers with a
/// non-success status, or the body cannot be decoded.
pub async fn try_fetch_version_info(
    client: &reqwest::Client,
    request: &VersionRequest,
) -> Result<VersionInfo, FetchError> {
    let response = client
        .request(request.method.clone(), &request.url)
        .headers(request.headers.clone())
        .send()
        .await
        .map_err(FetchError::Request)?;

    if !response.status().is_success() {
        let status = response.status();
        let body_snippet = response
            .text()
            .await
            .ok()
            .map(|body| response_snippet(&body, 160))
            .unwrap_or_default();
        return Err(FetchError::HttpStatus {
            status,
            body_snippet,
        });
    }

    let body = response.bytes().await.map_err(FetchError::Body)?;
    VersionInfo::from_slice(&body).map_err(FetchError::Parse)
}

/// Fetch version info, treating every failure as "no result".
pub async fn fetch_version_info(
    client: &reqwest::Client,
    request: &VersionRequest,
) -> Option<VersionInfo> {
    match try_fetch_version_info(client, request).await {
        Ok(info) => Some(info),
        Err(error) => {
            debug!("Version check skipped, fetch failed: {error}");
            None
        }
    }
}

/// Run [`fetch_version_info`] on the runtime and hand back its single result.
pub fn spawn_fetch(
    client: reqwest::Client,
    request: VersionRequest,
) -> JoinHandle<Option<VersionInfo>> {
    tokio::spawn(async move { fetch_version_info(&client, &request).await })
}

fn response_snippet(body: &str, max_chars: usize) -> String {
    let snippet: String = body.chars().take(max_chars).collect();
    if snippet.is_empty() {
        String::new()
    } else {
        format!(": {snippet}")
    }
}
