//! Error types for installing and launching the Shaper binary.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while installing the binary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InstallError {
    /// The running platform has no release asset.
    #[error("unsupported platform: {os}-{arch}")]
    UnsupportedPlatform {
        /// Normalized operating system name.
        os: String,
        /// Normalized CPU architecture name.
        arch: String,
    },

    /// The bundled checksum manifest does not exist.
    #[error("checksum manifest not found at {}", .0.display())]
    ManifestMissing(PathBuf),

    /// The manifest has no entry for the selected asset.
    #[error("no checksum found for {0} in the checksum manifest")]
    ManifestEntryMissing(String),

    /// The manifest entry is not a SHA-256 hex digest.
    #[error("invalid checksum for {asset} in the checksum manifest: {digest:?}")]
    InvalidDigest {
        /// Asset the entry belongs to.
        asset: String,
        /// The digest as written in the manifest.
        digest: String,
    },

    /// The release tag does not exist.
    #[error("version v{version} not found; check that this version exists in the releases")]
    VersionNotFound {
        /// Requested version (without the `v` prefix).
        version: String,
    },

    /// The release exists but has no asset for this platform.
    #[error("asset {asset} not found in release v{version}")]
    AssetNotFound {
        /// Expected asset name.
        asset: String,
        /// Release version.
        version: String,
    },

    /// The host could not be reached (DNS, connect, TLS, timeout).
    #[error("could not reach {url}: {message}")]
    Connect {
        /// Requested URL.
        url: String,
        /// Underlying transport error.
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// GitHub API rate limit exceeded.
    #[error("GitHub API rate limit exceeded, retry after {retry_after} seconds")]
    RateLimited {
        /// Seconds until rate limit resets.
        retry_after: u64,
    },

    /// The connection broke while reading the response body.
    #[error("transfer from {url} failed: {message}")]
    Transfer {
        /// Requested URL.
        url: String,
        /// Underlying error.
        message: String,
    },

    /// The download is larger than the configured ceiling.
    #[error("download of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge {
        /// Declared or observed size in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },

    /// The release API answered with an unexpected body.
    #[error("invalid release metadata: {0}")]
    InvalidResponse(String),

    /// SHA-256 verification failed.
    #[error("checksum verification failed for {asset}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Asset that was downloaded.
        asset: String,
        /// Digest from the manifest.
        expected: String,
        /// Digest of the downloaded bytes.
        actual: String,
    },

    /// A filesystem operation failed.
    #[error("failed to {action} {}: {source}", path.display())]
    Filesystem {
        /// What was being done, e.g. "rename".
        action: &'static str,
        /// Path the operation targeted.
        path: PathBuf,
        /// The I/O error as reported by the OS.
        #[source]
        source: std::io::Error,
    },
}

impl InstallError {
    /// Builds a [`InstallError::Filesystem`] from an I/O error.
    pub fn fs(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }

    /// Returns a short hint telling the user what to do next.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::UnsupportedPlatform { .. } => {
                "Shaper does not publish a binary for this platform."
            }
            Self::ManifestMissing(_)
            | Self::ManifestEntryMissing(_)
            | Self::InvalidDigest { .. }
            | Self::AssetNotFound { .. } => {
                "The package is broken. Please reinstall it or report the problem."
            }
            Self::VersionNotFound { .. } => {
                "The release for this package version could not be found."
            }
            Self::Connect { .. } | Self::Transfer { .. } => {
                "Could not download Shaper. Please check your internet connection."
            }
            Self::HttpStatus { .. } | Self::InvalidResponse(_) => {
                "The release server returned an error. Please try again later."
            }
            Self::RateLimited { .. } => "GitHub API rate limit reached. Please try again later.",
            Self::PayloadTooLarge { .. } | Self::ChecksumMismatch { .. } => {
                "The download failed verification and was discarded."
            }
            Self::Filesystem { .. } => "Could not write the binary to the package directory.",
        }
    }

    /// Returns whether the error points at a broken package rather than the
    /// user's environment.
    #[must_use]
    pub fn is_packaging_defect(&self) -> bool {
        matches!(
            self,
            Self::ManifestMissing(_)
                | Self::ManifestEntryMissing(_)
                | Self::InvalidDigest { .. }
                | Self::AssetNotFound { .. }
        )
    }
}

/// Errors raised by the launcher after or instead of an install.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LaunchError {
    /// Installing the binary failed.
    #[error("failed to install shaper: {0}")]
    Install(#[from] InstallError),

    /// The installer reported success but the binary is not on disk.
    #[error("installation finished but {} is missing", .0.display())]
    BinaryMissingAfterInstall(PathBuf),

    /// Replacing the process image failed.
    #[error("failed to execute {}: {source}", path.display())]
    Exec {
        /// Binary that was executed.
        path: PathBuf,
        /// Error returned by `exec`.
        #[source]
        source: std::io::Error,
    },

    /// Starting the binary as a child process failed.
    #[error("failed to start {}: {source}", path.display())]
    Spawn {
        /// Binary that was started.
        path: PathBuf,
        /// Spawn error.
        #[source]
        source: std::io::Error,
    },

    /// Waiting for the child process failed.
    #[error("failed to wait for shaper: {0}")]
    Wait(#[source] std::io::Error),

    /// Installing the interrupt handler failed.
    #[error("failed to install interrupt handler: {0}")]
    SignalHandler(#[source] std::io::Error),
}

/// Result type alias for install operations.
pub type Result<T> = std::result::Result<T, InstallError>;
