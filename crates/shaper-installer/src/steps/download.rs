//! Download the release asset to a temporary file.

use std::fs;
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use tempfile::NamedTempFile;

use crate::error::{InstallError, Result};
use crate::github::client::{check_status, connect_error};

/// Read buffer size while streaming the body.
const CHUNK_SIZE: usize = 64 * 1024;

/// Log progress every this many bytes.
const PROGRESS_STEP: u64 = 8 * 1024 * 1024;

/// Name prefix of temporary download files.
pub const TEMP_PREFIX: &str = ".shaper-";

/// Name suffix of temporary download files.
pub const TEMP_SUFFIX: &str = ".tmp";

/// A completed download waiting for verification.
///
/// The file is removed when this value is dropped without being promoted.
#[derive(Debug)]
pub struct DownloadedFile {
    /// The temporary file holding the body.
    pub file: NamedTempFile,
    /// Number of bytes written.
    pub size: u64,
}

impl DownloadedFile {
    /// Path of the temporary file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Options for a single download.
#[derive(Debug, Clone, Copy)]
pub struct DownloadOptions {
    /// Largest body accepted, in bytes.
    pub max_bytes: u64,
    /// Timeout for the whole request.
    pub timeout: Duration,
}

/// Streams `url` into a new temporary file inside `dir`.
///
/// The temporary file never has the name of the final binary, so a failed or
/// interrupted download cannot replace a working install. A declared
/// `Content-Length` above the limit aborts before the body is read, and the
/// body itself is cut off one byte past the limit.
pub fn download_to_temp(
    client: &Client,
    url: &str,
    dir: &Path,
    options: DownloadOptions,
) -> Result<DownloadedFile> {
    tracing::debug!("Starting download from {}", url);

    let response = client
        .get(url)
        .timeout(options.timeout)
        .send()
        .map_err(|e| connect_error(url, &e))?;
    let response = check_status(response, url)?;

    if let Some(declared) = response.content_length() {
        tracing::debug!("Server declared {}", format_bytes(declared));
        if declared > options.max_bytes {
            return Err(InstallError::PayloadTooLarge {
                size: declared,
                limit: options.max_bytes,
            });
        }
    }

    let file = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)
        .map_err(|e| InstallError::fs("create temporary file in", dir, e))?;

    let mut body = response.take(options.max_bytes.saturating_add(1));
    let mut writer = BufWriter::new(file.as_file());
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut downloaded: u64 = 0;
    let mut next_report = PROGRESS_STEP;

    loop {
        let n = body.read(&mut buffer).map_err(|e| InstallError::Transfer {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        if n == 0 {
            break;
        }

        downloaded += n as u64;
        if downloaded > options.max_bytes {
            return Err(InstallError::PayloadTooLarge {
                size: downloaded,
                limit: options.max_bytes,
            });
        }

        writer
            .write_all(&buffer[..n])
            .map_err(|e| InstallError::fs("write", file.path(), e))?;

        if downloaded >= next_report {
            tracing::debug!("Downloaded {}", format_bytes(downloaded));
            next_report += PROGRESS_STEP;
        }
    }

    writer
        .flush()
        .map_err(|e| InstallError::fs("flush", file.path(), e))?;
    drop(writer);
    file.as_file()
        .sync_all()
        .map_err(|e| InstallError::fs("sync", file.path(), e))?;

    tracing::debug!("Download complete: {}", format_bytes(downloaded));

    Ok(DownloadedFile {
        file,
        size: downloaded,
    })
}

/// Deletes temporary downloads left in `dir` by interrupted installs.
///
/// Best-effort: failures are logged and skipped. Returns how many files were
/// removed.
pub fn remove_stale_downloads(dir: &Path) -> usize {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return 0,
        Err(e) => {
            tracing::warn!("Failed to list {}: {}", dir.display(), e);
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !is_temp_download(&name) || !entry.file_type().is_ok_and(|t| t.is_file()) {
            continue;
        }
        match fs::remove_file(entry.path()) {
            Ok(()) => {
                tracing::debug!("Removed stale download {}", entry.path().display());
                removed += 1;
            }
            Err(e) => tracing::warn!("Failed to remove {}: {}", entry.path().display(), e),
        }
    }
    removed
}

fn is_temp_download(name: &str) -> bool {
    name.len() > TEMP_PREFIX.len() + TEMP_SUFFIX.len()
        && name.starts_with(TEMP_PREFIX)
        && name.ends_with(TEMP_SUFFIX)
}

/// Format bytes as a human-readable string.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
