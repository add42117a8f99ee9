//! GitHub API client for fetching release information.

use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::StatusCode;

use super::types::GitHubRelease;
use crate::config::InstallConfig;
use crate::error::{InstallError, Result};

/// User agent string for API and download requests.
const USER_AGENT_VALUE: &str = concat!(
    "shaper-installer/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/taleshape-com/shaper)"
);

/// GitHub API client for fetching release information.
#[derive(Debug, Clone)]
pub struct ReleaseClient {
    client: Client,
    api_base_url: String,
    owner: String,
    repo: String,
    timeout: std::time::Duration,
}

impl ReleaseClient {
    /// Creates a client for the repository named in `config`.
    pub fn new(config: &InstallConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(config.metadata_timeout)
            .build()
            .map_err(|e| InstallError::Connect {
                url: config.api_base_url.clone(),
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            owner: config.repo_owner.clone(),
            repo: config.repo_name.clone(),
            timeout: config.metadata_timeout,
        })
    }

    /// The underlying HTTP client, shared with the downloader.
    #[must_use]
    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Returns the API URL of the release tagged `tag`.
    #[must_use]
    pub fn release_url(&self, tag: &str) -> String {
        format!(
            "{}/repos/{}/{}/releases/tags/{}",
            self.api_base_url, self.owner, self.repo, tag
        )
    }

    /// Fetches a release by tag name.
    ///
    /// # Arguments
    /// * `tag` - The release tag (e.g., "v1.4.0")
    pub fn get_release_by_tag(&self, tag: &str) -> Result<GitHubRelease> {
        let url = self.release_url(tag);

        tracing::debug!("Fetching release by tag from {}", url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .timeout(self.timeout)
            .send()
            .map_err(|e| connect_error(&url, &e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(InstallError::VersionNotFound {
                version: tag.trim_start_matches('v').to_string(),
            });
        }

        let response = check_status(response, &url)?;

        let release: GitHubRelease = response
            .json()
            .map_err(|e| InstallError::InvalidResponse(e.to_string()))?;

        tracing::debug!(
            "Release {} lists {} assets",
            release.tag_name,
            release.assets.len()
        );

        Ok(release)
    }
}

/// Turns a non-success response into an error, detecting GitHub rate limiting.
pub(crate) fn check_status(response: Response, url: &str) -> Result<Response> {
    let status = response.status();

    if status == StatusCode::FORBIDDEN
        && response
            .headers()
            .get("x-ratelimit-remaining")
            .is_some_and(|remaining| remaining.to_str().unwrap_or("1") == "0")
    {
        let retry_after = response
            .headers()
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(|reset| {
                let now = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or(0);
                reset.saturating_sub(now)
            })
            .unwrap_or(60);

        return Err(InstallError::RateLimited { retry_after });
    }

    if !status.is_success() {
        return Err(InstallError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    Ok(response)
}

/// Maps a failed `send()` to a connectivity error.
pub(crate) fn connect_error(url: &str, err: &reqwest::Error) -> InstallError {
    InstallError::Connect {
        url: url.to_string(),
        message: err.to_string(),
    }
}
