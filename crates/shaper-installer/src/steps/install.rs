//! Promotion of a verified download to the final binary path.

use std::fs;
use std::path::Path;

use crate::error::{InstallError, Result};
use crate::steps::download::DownloadedFile;

/// Moves the verified download onto `binary_path` and makes it executable.
///
/// The move is a rename within the binary directory, so the final path holds
/// either the previous binary or the complete new one, never a partial file.
pub fn promote(download: DownloadedFile, binary_path: &Path) -> Result<()> {
    tracing::debug!(
        "Promoting {} to {}",
        download.path().display(),
        binary_path.display()
    );

    download
        .file
        .persist(binary_path)
        .map_err(|e| InstallError::fs("rename download to", binary_path, e.error))?;

    make_executable(binary_path)
}

/// Sets `0o755` on Unix. Other platforms need no permission change.
#[cfg(unix)]
pub fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)
        .map_err(|e| InstallError::fs("read permissions of", path, e))?
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).map_err(|e| InstallError::fs("set permissions on", path, e))
}

/// Sets `0o755` on Unix. Other platforms need no permission change.
#[cfg(not(unix))]
pub fn make_executable(path: &Path) -> Result<()> {
    fs::metadata(path)
        .map(|_| ())
        .map_err(|e| InstallError::fs("read permissions of", path, e))
}
