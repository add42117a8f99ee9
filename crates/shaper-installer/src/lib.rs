//! Installer and launcher for the Shaper release binary.
//!
//! This crate downloads the prebuilt `shaper` executable from GitHub
//! Releases, checks it against the checksum manifest shipped with the
//! package, and hands execution over to it.
//!
//! # Overview
//!
//! - Platform resolution to a release asset name (Linux and macOS on x86_64
//!   and ARM64)
//! - SHA-256 verification against the bundled `SHA256SUMS` manifest
//! - Bounded streaming download to a temporary file, promoted by rename
//! - A version marker next to the binary so the launcher knows whether the
//!   installed binary matches this package
//! - Process replacement (or a spawn-and-wait fallback) to run the binary
//!
//! # Layout
//!
//! Everything lives under `<install root>/bin/`:
//!
//! ```text
//! bin/shaper       the executable
//! bin/SHA256SUMS   checksum manifest (shipped with the package)
//! bin/VERSION      version marker (written after a verified install)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use shaper_installer::{InstallConfig, Launcher};
//!
//! let config = InstallConfig::new("/opt/shaper");
//! let code = Launcher::new(config).launch(std::env::args_os().skip(1))?;
//! std::process::exit(code);
//! # Ok::<(), shaper_installer::LaunchError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod error;
pub mod manifest;
pub mod marker;
pub mod platform;

// Individual steps
pub mod steps;

// GitHub API
pub mod github;

// Orchestration
pub mod installer;
pub mod launch;
pub mod uninstall;

// Re-export main types for convenience
pub use config::{InstallConfig, InstallLayout};
pub use error::{InstallError, LaunchError, Result};
pub use installer::{BinaryInstaller, InstallStage, InstalledBinary, Installer};
pub use launch::{LaunchStrategy, Launcher, exit_code, run_binary};
pub use manifest::Manifest;
pub use marker::VersionMarker;
pub use platform::Platform;
pub use uninstall::{UninstallReport, uninstall};

/// Version of the binary this package is paired with.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// GitHub repository owner.
pub const REPO_OWNER: &str = "taleshape-com";

/// GitHub repository name.
pub const REPO_NAME: &str = "shaper";
