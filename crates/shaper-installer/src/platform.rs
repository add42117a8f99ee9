//! Platform detection and release asset naming.
//!
//! Maps the running operating system and CPU architecture to the name of the
//! release asset built for it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{InstallError, Result};

/// Normalized (os, arch) pairs with a published binary.
const SUPPORTED: &[(&str, &str, &str)] = &[
    ("linux", "x86_64", "shaper-linux-amd64"),
    ("linux", "aarch64", "shaper-linux-arm64"),
    ("darwin", "x86_64", "shaper-darwin-amd64"),
    ("darwin", "arm64", "shaper-darwin-arm64"),
];

/// An operating system and machine architecture, as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// Operating system name (e.g. "linux", "darwin", "macos").
    pub os: String,
    /// Machine architecture (e.g. "x86_64", "amd64", "arm64").
    pub arch: String,
}

impl Platform {
    /// Creates a platform from raw os and arch strings.
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Detects the platform this process runs on.
    #[must_use]
    pub fn current() -> Self {
        Self::new(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Returns the normalized (os, arch) pair.
    ///
    /// Linux calls 64-bit ARM `aarch64`, the other systems call it `arm64`.
    #[must_use]
    pub fn normalized(&self) -> (String, String) {
        let os = match self.os.to_lowercase().as_str() {
            "macos" => "darwin".to_string(),
            other => other.to_string(),
        };
        let arch = match self.arch.to_lowercase().as_str() {
            "amd64" => "x86_64".to_string(),
            "arm64" | "aarch64" if os == "linux" => "aarch64".to_string(),
            "arm64" | "aarch64" => "arm64".to_string(),
            other => other.to_string(),
        };
        (os, arch)
    }

    /// Returns the release asset name for this platform.
    pub fn asset_name(&self) -> Result<&'static str> {
        let (os, arch) = self.normalized();
        SUPPORTED
            .iter()
            .find(|(o, a, _)| *o == os && *a == arch)
            .map(|(_, _, asset)| *asset)
            .ok_or(InstallError::UnsupportedPlatform { os, arch })
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (os, arch) = self.normalized();
        write!(f, "{os}-{arch}")
    }
}

/// Returns every asset name this build may select.
#[must_use]
pub fn supported_assets() -> Vec<&'static str> {
    SUPPORTED.iter().map(|(_, _, asset)| *asset).collect()
}
