//! SHA-256 verification of the downloaded file.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{InstallError, Result};

/// Buffer size for reading files during checksum computation.
const BUFFER_SIZE: usize = 65536;

/// Normalizes a manifest digest to 64 lowercase hex characters.
///
/// Accepts both `sha256:abc123...` and plain `abc123...`.
pub fn normalize_digest(asset: &str, digest: &str) -> Result<String> {
    let hash = digest
        .trim()
        .strip_prefix("sha256:")
        .unwrap_or(digest.trim())
        .to_lowercase();

    if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(InstallError::InvalidDigest {
            asset: asset.to_string(),
            digest: digest.to_string(),
        });
    }

    Ok(hash)
}

/// Computes the SHA-256 hash of a file.
pub fn compute_file_sha256(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| InstallError::fs("open", path, e))?;
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| InstallError::fs("read", path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Verifies that the file at `path` hashes to `expected`.
///
/// Returns the verified hash on success.
pub fn verify_file(path: &Path, asset: &str, expected: &str) -> Result<String> {
    let expected = normalize_digest(asset, expected)?;
    let actual = compute_file_sha256(path)?;

    if actual != expected {
        return Err(InstallError::ChecksumMismatch {
            asset: asset.to_string(),
            expected,
            actual,
        });
    }

    tracing::debug!("SHA256 verification passed: {}", actual);
    Ok(actual)
}
