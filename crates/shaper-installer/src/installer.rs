//! Install orchestration.
//!
//! Runs the install steps in order:
//!
//! ```text
//! start -> resolve_platform -> load_manifest -> fetch_release_metadata
//!       -> locate_asset -> download -> verify -> promote -> record_version -> done
//! ```
//!
//! Any failing step ends in `failed`. The version marker is removed before
//! anything else happens and is only written back once the new binary is in
//! place, so an interrupted install is always seen as "not installed".

use std::fmt;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::config::InstallConfig;
use crate::error::{InstallError, Result};
use crate::github::ReleaseClient;
use crate::manifest::Manifest;
use crate::marker::VersionMarker;
use crate::steps::download::{
    DownloadOptions, DownloadedFile, download_to_temp, format_bytes, remove_stale_downloads,
};
use crate::steps::install::promote;
use crate::steps::verify::{normalize_digest, verify_file};

/// Stage of an install run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage {
    /// Nothing done yet.
    Start,
    /// Mapping the platform to an asset name.
    ResolvePlatform,
    /// Reading the bundled checksum manifest.
    LoadManifest,
    /// Querying the release API.
    FetchReleaseMetadata,
    /// Finding the asset in the release.
    LocateAsset,
    /// Streaming the asset to a temporary file.
    Download,
    /// Checking the SHA-256 digest.
    Verify,
    /// Renaming the verified file into place.
    Promote,
    /// Writing the version marker.
    RecordVersion,
    /// Install finished.
    Done,
    /// Install aborted.
    Failed,
}

impl InstallStage {
    /// Returns the stage name used in logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::ResolvePlatform => "resolve_platform",
            Self::LoadManifest => "load_manifest",
            Self::FetchReleaseMetadata => "fetch_release_metadata",
            Self::LocateAsset => "locate_asset",
            Self::Download => "download",
            Self::Verify => "verify",
            Self::Promote => "promote",
            Self::RecordVersion => "record_version",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledBinary {
    /// Installed version.
    pub version: String,
    /// Release asset that was installed.
    pub asset: String,
    /// Final path of the executable.
    pub path: PathBuf,
    /// Verified SHA-256 digest.
    pub sha256: String,
    /// Size in bytes.
    pub size: u64,
}

/// Something that can put the binary in place.
///
/// The launcher only depends on this trait, so it can be driven by any
/// installer.
pub trait BinaryInstaller {
    /// Installs the binary, returning what was installed.
    fn install(&self) -> Result<InstalledBinary>;
}

/// Downloads, verifies and installs the release binary.
#[derive(Debug, Clone)]
pub struct Installer {
    config: InstallConfig,
}

impl Installer {
    /// Creates an installer for `config`.
    #[must_use]
    pub fn new(config: InstallConfig) -> Self {
        Self { config }
    }

    /// The configuration this installer runs with.
    #[must_use]
    pub fn config(&self) -> &InstallConfig {
        &self.config
    }

    /// Runs one install, logging the stage that failed.
    pub fn run(&self) -> Result<InstalledBinary> {
        let mut stage = InstallStage::Start;
        match self.run_stages(&mut stage) {
            Ok(installed) => Ok(installed),
            Err(e) => {
                debug!(stage = %stage, "Installation {}: {e}", InstallStage::Failed);
                Err(e)
            }
        }
    }

    fn run_stages(&self, stage: &mut InstallStage) -> Result<InstalledBinary> {
        let config = &self.config;
        let layout = config.layout();
        let bin_dir = layout.bin_dir();

        fs::create_dir_all(bin_dir).map_err(|e| InstallError::fs("create", bin_dir, e))?;

        let marker = VersionMarker::new(layout.version_path());
        marker.clear()?;
        remove_stale_downloads(bin_dir);

        *stage = InstallStage::ResolvePlatform;
        let asset_name = config.platform.asset_name()?;
        debug!("Platform {} uses asset {}", config.platform, asset_name);

        *stage = InstallStage::LoadManifest;
        info!("Loading checksums...");
        let manifest = Manifest::load(&layout.manifest_path())?;
        let expected = normalize_digest(asset_name, manifest.expected_digest(asset_name)?)?;

        *stage = InstallStage::FetchReleaseMetadata;
        let client = ReleaseClient::new(config)?;
        let release = client.get_release_by_tag(&config.tag())?;

        *stage = InstallStage::LocateAsset;
        let asset = release
            .find_asset(asset_name)
            .filter(|asset| asset.is_uploaded())
            .ok_or_else(|| InstallError::AssetNotFound {
                asset: asset_name.to_string(),
                version: release.version().to_string(),
            })?;

        *stage = InstallStage::Download;
        info!(
            "Downloading shaper v{} for {}...",
            release.version(),
            config.platform
        );
        let download = download_to_temp(
            client.http(),
            &asset.browser_download_url,
            bin_dir,
            DownloadOptions {
                max_bytes: config.max_download_bytes,
                timeout: config.download_timeout,
            },
        )?;

        *stage = InstallStage::Verify;
        info!("Verifying checksum...");
        let sha256 = match verify_file(download.path(), asset_name, &expected) {
            Ok(sha256) => sha256,
            Err(e) => {
                discard(download);
                return Err(e);
            }
        };
        info!("Checksum verified successfully");

        *stage = InstallStage::Promote;
        let size = download.size;
        let binary_path = layout.binary_path();
        promote(download, &binary_path)?;

        *stage = InstallStage::RecordVersion;
        marker.write(&config.version)?;

        *stage = InstallStage::Done;
        info!(
            "Installation complete: {} ({})",
            binary_path.display(),
            format_bytes(size)
        );

        Ok(InstalledBinary {
            version: config.version.clone(),
            asset: asset_name.to_string(),
            path: binary_path,
            sha256,
            size,
        })
    }
}

impl BinaryInstaller for Installer {
    fn install(&self) -> Result<InstalledBinary> {
        self.run()
    }
}

/// Deletes an unverified download. Failure to delete is logged, not raised.
fn discard(download: DownloadedFile) {
    let path = download.path().to_path_buf();
    if let Err(e) = download.file.close() {
        warn!("Failed to remove {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;

    #[test]
    fn test_stage_labels() {
        assert_eq!(InstallStage::FetchReleaseMetadata.to_string(), "fetch_release_metadata");
        assert_eq!(InstallStage::RecordVersion.label(), "record_version");
    }

    #[test]
    fn test_unsupported_platform_clears_marker_and_stops() {
        let root = tempfile::tempdir().unwrap();
        let config = InstallConfig::new(root.path())
            .with_version("1.4.0")
            .with_platform(Platform::new("freebsd", "x86_64"))
            .with_api_base_url("http://127.0.0.1:9");
        let layout = config.layout();
        fs::create_dir_all(layout.bin_dir()).unwrap();
        fs::write(layout.version_path(), "1.4.0\n").unwrap();

        let err = Installer::new(config).run().unwrap_err();

        assert!(matches!(err, InstallError::UnsupportedPlatform { .. }));
        assert!(!layout.version_path().exists());
    }

    #[test]
    fn test_missing_manifest() {
        let root = tempfile::tempdir().unwrap();
        let config = InstallConfig::new(root.path())
            .with_platform(Platform::new("linux", "x86_64"))
            .with_api_base_url("http://127.0.0.1:9");

        let err = Installer::new(config).run().unwrap_err();
        assert!(matches!(err, InstallError::ManifestMissing(_)));
    }
}
