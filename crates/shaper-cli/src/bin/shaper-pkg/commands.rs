//! Subcommand implementations.

use anyhow::Result;
use shaper_installer::platform::supported_assets;
use shaper_installer::{
    InstallConfig, Installer, Launcher, Platform, UninstallReport, VersionMarker, uninstall,
};

/// Installs the binary unless the matching version is already there.
pub fn run_install(config: InstallConfig, force: bool) -> Result<()> {
    let layout = config.layout();
    if !force && Launcher::new(config.clone()).is_usable() {
        println!(
            "shaper v{} is already installed at {}",
            config.version,
            layout.binary_path().display()
        );
        return Ok(());
    }

    let installed = Installer::new(config).run()?;
    println!(
        "Installed shaper v{} ({}) to {}",
        installed.version,
        installed.asset,
        installed.path.display()
    );
    Ok(())
}

pub fn run_uninstall(config: &InstallConfig) -> Result<()> {
    let layout = config.layout();
    let UninstallReport {
        removed_binary,
        removed_bin_dir,
    } = uninstall(&layout)?;

    if removed_binary {
        println!("Removed {}", layout.binary_path().display());
    } else {
        println!("Nothing to remove at {}", layout.binary_path().display());
    }
    if removed_bin_dir {
        println!("Removed {}", layout.bin_dir().display());
    }
    Ok(())
}

/// Snapshot of the installation printed by `status`.
pub struct Status {
    pub platform: Platform,
    pub asset: Option<&'static str>,
    pub expected_version: String,
    pub installed_version: Option<String>,
    pub binary_present: bool,
}

impl Status {
    pub fn collect(config: &InstallConfig) -> Self {
        let layout = config.layout();
        Self {
            platform: config.platform.clone(),
            asset: config.platform.asset_name().ok(),
            expected_version: config.version.clone(),
            installed_version: VersionMarker::new(layout.version_path()).read(),
            binary_present: layout.binary_path().is_file(),
        }
    }

    pub fn is_current(&self) -> bool {
        self.binary_present
            && self.installed_version.as_deref() == Some(self.expected_version.as_str())
    }
}

pub fn run_status(config: &InstallConfig) {
    let status = Status::collect(config);
    let layout = config.layout();

    println!("Platform:  {}", status.platform);
    match status.asset {
        Some(asset) => println!("Asset:     {asset}"),
        None => println!(
            "Asset:     none (releases exist for {})",
            supported_assets().join(", ")
        ),
    }
    println!("Package:   v{}", status.expected_version);
    println!(
        "Installed: {}",
        status
            .installed_version
            .as_deref()
            .map_or_else(|| "(none)".to_string(), |v| format!("v{v}"))
    );
    println!(
        "Binary:    {}{}",
        layout.binary_path().display(),
        if status.binary_present { "" } else { " (missing)" }
    );
    println!(
        "State:     {}",
        if status.is_current() {
            "ready"
        } else {
            "will install on next launch"
        }
    );
}
