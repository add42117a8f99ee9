//! GitHub API types.

use serde::Deserialize;

/// Release data from the GitHub API.
///
/// Only the fields the installer reads are required; everything else is
/// optional so that mirrors serving a reduced document still work.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRelease {
    /// The release tag name (e.g., "v1.4.0").
    pub tag_name: String,

    /// Release assets.
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
}

impl GitHubRelease {
    /// Returns the version string without the "v" prefix if present.
    #[must_use]
    pub fn version(&self) -> &str {
        self.tag_name.strip_prefix('v').unwrap_or(&self.tag_name)
    }

    /// Finds the asset whose name is exactly `name`.
    #[must_use]
    pub fn find_asset(&self, name: &str) -> Option<&GitHubAsset> {
        self.assets.iter().find(|asset| asset.name == name)
    }
}

/// Release asset data from the GitHub API.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubAsset {
    /// Asset filename (e.g., "shaper-linux-amd64").
    pub name: String,

    /// Direct download URL.
    pub browser_download_url: String,

    /// Upload state: "uploaded" (complete) or "open" (still uploading).
    #[serde(default)]
    pub state: Option<String>,
}

impl GitHubAsset {
    /// Returns whether the asset is fully uploaded.
    ///
    /// Documents without a `state` field are treated as uploaded.
    #[must_use]
    pub fn is_uploaded(&self) -> bool {
        self.state.as_deref().is_none_or(|state| state == "uploaded")
    }
}
