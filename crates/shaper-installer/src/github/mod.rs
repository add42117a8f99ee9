//! GitHub API client and types.
//!
//! This module provides a client for the GitHub Releases API.

pub mod client;
pub mod types;

pub use client::ReleaseClient;
pub use types::{GitHubAsset, GitHubRelease};
