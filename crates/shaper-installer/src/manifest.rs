//! Checksum manifest shipped next to the binary.
//!
//! The manifest uses the `sha256sum` output format: one `<hex digest> <file>`
//! pair per line.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{InstallError, Result};

/// Expected SHA-256 digests keyed by asset file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: HashMap<String, String>,
}

impl Manifest {
    /// Parses manifest text.
    ///
    /// Blank lines and lines with fewer than two tokens are skipped. Tokens
    /// after the file name are ignored.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .filter_map(|line| {
                let mut parts = line.split_whitespace();
                let digest = parts.next()?;
                let name = parts.next()?;
                // sha256sum marks binary-mode entries with a leading '*'
                let name = name.strip_prefix('*').unwrap_or(name);
                Some((name.to_string(), digest.to_string()))
            })
            .collect();

        Self { entries }
    }

    /// Reads and parses the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading checksum manifest from {}", path.display());

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(InstallError::ManifestMissing(path.to_path_buf()));
            }
            Err(e) => return Err(InstallError::fs("read", path, e)),
        };

        let manifest = Self::parse(&content);
        if manifest.is_empty() {
            warn!("Checksum manifest {} has no entries", path.display());
        } else {
            debug!("Manifest lists {} assets", manifest.len());
        }
        Ok(manifest)
    }

    /// Returns the digest recorded for `asset`, if any.
    #[must_use]
    pub fn get(&self, asset: &str) -> Option<&str> {
        self.entries.get(asset).map(String::as_str)
    }

    /// Returns the digest for `asset` or a manifest error.
    pub fn expected_digest(&self, asset: &str) -> Result<&str> {
        self.get(asset)
            .ok_or_else(|| InstallError::ManifestEntryMissing(asset.to_string()))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
