//! Configuration types for installing and launching the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::platform::Platform;
use crate::{REPO_NAME, REPO_OWNER, VERSION};

/// GitHub API base URL.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Largest download accepted (200 MiB).
pub const MAX_DOWNLOAD_BYTES: u64 = 200 * 1024 * 1024;

/// Timeout for the release metadata request.
pub const METADATA_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the binary download.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Name of the directory holding the binary, manifest and marker.
pub const BIN_DIR_NAME: &str = "bin";

/// Name of the bundled checksum manifest.
pub const MANIFEST_FILE_NAME: &str = "SHA256SUMS";

/// Name of the version marker.
pub const VERSION_FILE_NAME: &str = "VERSION";

/// Everything the installer and launcher need to know.
///
/// The install root is passed in explicitly; nothing in this crate looks it up
/// from ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Directory the `bin/` directory lives in.
    pub install_root: PathBuf,

    /// Binary version this package is paired with.
    #[serde(default = "default_version")]
    pub version: String,

    /// GitHub repository owner.
    #[serde(default = "default_repo_owner")]
    pub repo_owner: String,

    /// GitHub repository name.
    #[serde(default = "default_repo_name")]
    pub repo_name: String,

    /// Release API base URL.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Largest download accepted, in bytes.
    #[serde(default = "default_max_download_bytes")]
    pub max_download_bytes: u64,

    /// Timeout for the release metadata request.
    #[serde(default = "default_metadata_timeout")]
    pub metadata_timeout: Duration,

    /// Timeout for the binary download.
    #[serde(default = "default_download_timeout")]
    pub download_timeout: Duration,

    /// Platform to install for.
    #[serde(default)]
    pub platform: Platform,
}

fn default_version() -> String {
    VERSION.to_string()
}

fn default_repo_owner() -> String {
    REPO_OWNER.to_string()
}

fn default_repo_name() -> String {
    REPO_NAME.to_string()
}

fn default_api_base_url() -> String {
    GITHUB_API_URL.to_string()
}

fn default_max_download_bytes() -> u64 {
    MAX_DOWNLOAD_BYTES
}

fn default_metadata_timeout() -> Duration {
    METADATA_TIMEOUT
}

fn default_download_timeout() -> Duration {
    DOWNLOAD_TIMEOUT
}

impl InstallConfig {
    /// Creates a configuration rooted at `install_root` with build defaults.
    pub fn new(install_root: impl Into<PathBuf>) -> Self {
        Self {
            install_root: install_root.into(),
            version: default_version(),
            repo_owner: default_repo_owner(),
            repo_name: default_repo_name(),
            api_base_url: default_api_base_url(),
            max_download_bytes: MAX_DOWNLOAD_BYTES,
            metadata_timeout: METADATA_TIMEOUT,
            download_timeout: DOWNLOAD_TIMEOUT,
            platform: Platform::current(),
        }
    }

    /// Sets the version to install.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the release API base URL.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the platform to install for.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Sets the download size ceiling.
    #[must_use]
    pub fn with_max_download_bytes(mut self, limit: u64) -> Self {
        self.max_download_bytes = limit;
        self
    }

    /// Returns the on-disk layout under the install root.
    #[must_use]
    pub fn layout(&self) -> InstallLayout {
        InstallLayout::new(&self.install_root)
    }

    /// Returns the release tag for the configured version.
    #[must_use]
    pub fn tag(&self) -> String {
        format!("v{}", self.version.trim_start_matches('v'))
    }
}

/// Paths of the files making up an installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    bin_dir: PathBuf,
}

impl InstallLayout {
    /// Creates the layout for an install root.
    pub fn new(install_root: &Path) -> Self {
        Self {
            bin_dir: install_root.join(BIN_DIR_NAME),
        }
    }

    /// Directory holding the binary, manifest and marker.
    #[must_use]
    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    /// Final path of the executable.
    #[must_use]
    pub fn binary_path(&self) -> PathBuf {
        self.bin_dir
            .join(format!("shaper{}", std::env::consts::EXE_SUFFIX))
    }

    /// Path of the bundled checksum manifest.
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.bin_dir.join(MANIFEST_FILE_NAME)
    }

    /// Path of the version marker.
    #[must_use]
    pub fn version_path(&self) -> PathBuf {
        self.bin_dir.join(VERSION_FILE_NAME)
    }
}
