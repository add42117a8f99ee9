//! Environment-driven settings shared by both binaries.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use shaper_installer::{InstallConfig, LaunchStrategy};

/// Overrides the install root (default: the directory holding the executable).
pub const PKG_ROOT_VAR: &str = "SHAPER_PKG_ROOT";

/// Overrides the release API base URL.
pub const RELEASE_API_VAR: &str = "SHAPER_RELEASE_API";

/// Selects the launch strategy, `exec` or `spawn`.
pub const LAUNCH_VAR: &str = "SHAPER_LAUNCH";

/// Settings read from the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvSettings {
    /// Value of `SHAPER_PKG_ROOT`.
    pub pkg_root: Option<PathBuf>,
    /// Value of `SHAPER_RELEASE_API`.
    pub release_api: Option<String>,
    /// Value of `SHAPER_LAUNCH`.
    pub launch: Option<String>,
}

impl EnvSettings {
    /// Reads the settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var_os(name))
    }

    /// Reads the settings through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());
        Self {
            pkg_root: get(PKG_ROOT_VAR).map(PathBuf::from),
            release_api: get(RELEASE_API_VAR).map(|v| v.to_string_lossy().into_owned()),
            launch: get(LAUNCH_VAR).map(|v| v.to_string_lossy().into_owned()),
        }
    }

    /// The install root: `explicit`, then `SHAPER_PKG_ROOT`, then the
    /// directory containing the running executable.
    pub fn install_root(&self, explicit: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(root) = explicit.or_else(|| self.pkg_root.clone()) {
            return Ok(root);
        }
        let exe = std::env::current_exe().context("failed to locate the running executable")?;
        let exe = exe.canonicalize().unwrap_or(exe);
        exe.parent()
            .map(PathBuf::from)
            .with_context(|| format!("executable path has no parent: {}", exe.display()))
    }

    /// Install configuration for `root` with the API override applied.
    pub fn install_config(&self, root: PathBuf) -> InstallConfig {
        let config = InstallConfig::new(root);
        match &self.release_api {
            Some(url) => config.with_api_base_url(url.as_str()),
            None => config,
        }
    }

    /// The launch strategy, defaulting to the platform's preference.
    pub fn launch_strategy(&self) -> Result<LaunchStrategy> {
        match &self.launch {
            None => Ok(LaunchStrategy::platform_default()),
            Some(name) => match LaunchStrategy::from_name(name) {
                Some(strategy) => Ok(strategy),
                None => bail!("{LAUNCH_VAR} must be `exec` or `spawn`, got `{name}`"),
            },
        }
    }
}
