#![allow(dead_code)]

pub mod release_server;

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};
use shaper_installer::{InstallConfig, Platform};

pub use release_server::ReleaseServer;

pub const VERSION: &str = "1.4.0";
pub const ASSET: &str = "shaper-linux-amd64";
pub const ASSET_PATH: &str = "/download/v1.4.0/shaper-linux-amd64";

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Config for linux/x86_64 pointing at `server`.
pub fn config(root: &Path, server: &ReleaseServer) -> InstallConfig {
    InstallConfig::new(root)
        .with_version(VERSION)
        .with_platform(Platform::new("linux", "x86_64"))
        .with_api_base_url(server.base_url())
}

/// Writes `bin/SHA256SUMS` with the given lines.
pub fn write_manifest(config: &InstallConfig, lines: &[(&str, &str)]) {
    let layout = config.layout();
    fs::create_dir_all(layout.bin_dir()).unwrap();
    let content: String = lines
        .iter()
        .map(|(digest, name)| format!("{digest}  {name}\n"))
        .collect();
    fs::write(layout.manifest_path(), content).unwrap();
}

/// Publishes `VERSION` with one asset served with `body`.
pub fn publish(server: &ReleaseServer, body: &[u8]) {
    server.publish_release("taleshape-com", "shaper", VERSION, &[(ASSET, ASSET_PATH)]);
    server.route(ASSET_PATH, 200, body.to_vec());
}

/// Names of the files in the bin directory, sorted.
pub fn bin_entries(config: &InstallConfig) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(config.layout().bin_dir())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
