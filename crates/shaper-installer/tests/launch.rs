//! First-run launch against a local release server.

#![cfg(unix)]

mod common;

use common::{ASSET, ReleaseServer, VERSION, config, publish, sha256_hex, write_manifest};
use shaper_installer::{LaunchStrategy, Launcher, VersionMarker};

const SCRIPT: &[u8] = b"#!/bin/sh\n[ \"$1\" = \"--port\" ] && [ \"$2\" = \"5454\" ] || exit 99\nexit 7\n";

#[test]
fn test_first_launch_installs_then_reuses_binary() {
    let server = ReleaseServer::start();
    let root = tempfile::tempdir().unwrap();
    let config = config(root.path(), &server);
    write_manifest(&config, &[(&sha256_hex(SCRIPT), ASSET)]);
    publish(&server, SCRIPT);

    let launcher = Launcher::new(config.clone()).with_strategy(LaunchStrategy::Spawn);
    assert!(!launcher.is_usable());

    let code = launcher.launch(["--port", "5454"]).unwrap();
    assert_eq!(code, 7);
    assert_eq!(server.hits(), 2);
    assert!(VersionMarker::new(config.layout().version_path()).matches(VERSION));

    let code = launcher.launch(["--port", "5454"]).unwrap();
    assert_eq!(code, 7);
    assert_eq!(server.hits(), 2);
}
