//! Removal of the installed binary.

use std::fs;
use std::io::ErrorKind;

use crate::config::InstallLayout;
use crate::error::{InstallError, Result};
use crate::marker::VersionMarker;
use crate::steps::download::remove_stale_downloads;

/// What an uninstall removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UninstallReport {
    /// The binary existed and was deleted.
    pub removed_binary: bool,
    /// The binary directory was empty afterwards and was deleted.
    pub removed_bin_dir: bool,
}

/// Deletes the binary, then the binary directory if nothing else is left in it.
///
/// The version marker and leftover temporary downloads go with the binary.
/// A missing binary, a missing directory and a non-empty directory are all
/// fine. The manifest is left alone.
pub fn uninstall(layout: &InstallLayout) -> Result<UninstallReport> {
    let binary_path = layout.binary_path();
    let removed_binary = match fs::remove_file(&binary_path) {
        Ok(()) => {
            tracing::info!("Removed {}", binary_path.display());
            true
        }
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => return Err(InstallError::fs("remove", &binary_path, e)),
    };
    VersionMarker::new(layout.version_path()).clear()?;
    remove_stale_downloads(layout.bin_dir());

    let bin_dir = layout.bin_dir();
    let removed_bin_dir = match fs::remove_dir(bin_dir) {
        Ok(()) => {
            tracing::info!("Removed {}", bin_dir.display());
            true
        }
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::DirectoryNotEmpty) => {
            tracing::debug!("Keeping {}: {}", bin_dir.display(), e);
            false
        }
        Err(e) => return Err(InstallError::fs("remove", bin_dir, e)),
    };

    Ok(UninstallReport {
        removed_binary,
        removed_bin_dir,
    })
}
