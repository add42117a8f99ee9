//! Version marker recording which binary version is installed.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{InstallError, Result};

/// The sidecar file next to the binary holding the installed version.
#[derive(Debug, Clone)]
pub struct VersionMarker {
    path: PathBuf,
}

impl VersionMarker {
    /// Creates a marker handle for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the marker file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the recorded version.
    ///
    /// Returns `None` when the marker is absent, unreadable or empty.
    #[must_use]
    pub fn read(&self) -> Option<String> {
        let content = fs::read_to_string(&self.path).ok()?;
        let version = content.trim();
        if version.is_empty() {
            None
        } else {
            Some(version.to_string())
        }
    }

    /// Returns whether the marker records exactly `version`.
    #[must_use]
    pub fn matches(&self, version: &str) -> bool {
        self.read().is_some_and(|installed| installed == version.trim())
    }

    /// Records `version`.
    pub fn write(&self, version: &str) -> Result<()> {
        fs::write(&self.path, format!("{}\n", version.trim()))
            .map_err(|e| InstallError::fs("write version marker", &self.path, e))
    }

    /// Removes the marker. A missing marker is not an error.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(InstallError::fs("remove version marker", &self.path, e)),
        }
    }
}
