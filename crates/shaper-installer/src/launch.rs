//! Launching the installed binary.
//!
//! The launcher checks that the binary on disk is the version this package is
//! paired with, installs it if not, and then hands the process over to it.
//! Two strategies exist:
//!
//! - [`LaunchStrategy::Exec`] replaces the current process image (Unix). Signals,
//!   terminal control and the exit status belong to the binary directly.
//! - [`LaunchStrategy::Spawn`] runs the binary as a child and waits. The child's
//!   exit code is returned; death by signal `n` maps to `128 + n`, and a Ctrl-C
//!   received by the wrapper while waiting maps to `130`, matching what a shell
//!   reports for an exec'd binary.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::config::{InstallConfig, InstallLayout};
use crate::error::LaunchError;
use crate::installer::{BinaryInstaller, Installer};
use crate::marker::VersionMarker;

/// Exit status reported when the user interrupts the wrapped binary.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Exit status for install or launch failures.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// How the binary is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchStrategy {
    /// Replace the current process image.
    Exec,
    /// Run as a child process and propagate its status.
    Spawn,
}

impl LaunchStrategy {
    /// `Exec` where the platform supports it, `Spawn` elsewhere.
    #[must_use]
    pub const fn platform_default() -> Self {
        if cfg!(unix) { Self::Exec } else { Self::Spawn }
    }

    /// Parses `exec` or `spawn` (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "exec" => Some(Self::Exec),
            "spawn" => Some(Self::Spawn),
            _ => None,
        }
    }
}

impl Default for LaunchStrategy {
    fn default() -> Self {
        Self::platform_default()
    }
}

/// Ensures the binary is installed and starts it.
#[derive(Debug)]
pub struct Launcher<I = Installer> {
    layout: InstallLayout,
    version: String,
    installer: I,
    strategy: LaunchStrategy,
}

impl Launcher<Installer> {
    /// Creates a launcher that installs with [`Installer`].
    #[must_use]
    pub fn new(config: InstallConfig) -> Self {
        let layout = config.layout();
        let version = config.version.clone();
        Self {
            layout,
            version,
            installer: Installer::new(config),
            strategy: LaunchStrategy::default(),
        }
    }
}

impl<I: BinaryInstaller> Launcher<I> {
    /// Creates a launcher that installs with `installer`.
    pub fn with_installer(config: &InstallConfig, installer: I) -> Self {
        Self {
            layout: config.layout(),
            version: config.version.clone(),
            installer,
            strategy: LaunchStrategy::default(),
        }
    }

    /// Sets the launch strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: LaunchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The launch strategy in use.
    #[must_use]
    pub fn strategy(&self) -> LaunchStrategy {
        self.strategy
    }

    /// Returns whether the installed binary can be run as is.
    ///
    /// True when the binary exists and the version marker records exactly the
    /// version this package expects.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.layout.binary_path().is_file()
            && VersionMarker::new(self.layout.version_path()).matches(&self.version)
    }

    /// Installs the binary unless it is already usable.
    ///
    /// Returns the path to run.
    pub fn ensure_installed(&self) -> Result<PathBuf, LaunchError> {
        let binary_path = self.layout.binary_path();

        if self.is_usable() {
            debug!("Using installed binary {}", binary_path.display());
            return Ok(binary_path);
        }

        info!("Shaper v{} is not installed, downloading it now", self.version);
        self.installer.install()?;

        if !binary_path.is_file() {
            return Err(LaunchError::BinaryMissingAfterInstall(binary_path));
        }

        Ok(binary_path)
    }

    /// Ensures the binary is installed and runs it with `args`.
    ///
    /// With [`LaunchStrategy::Exec`] this only returns on failure. Otherwise it
    /// returns the exit code to terminate with.
    pub fn launch<A, S>(&self, args: A) -> Result<i32, LaunchError>
    where
        A: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let binary_path = self.ensure_installed()?;
        run_binary(&binary_path, args, self.strategy)
    }
}

/// Runs `path` with `args` using `strategy`.
pub fn run_binary<A, S>(path: &Path, args: A, strategy: LaunchStrategy) -> Result<i32, LaunchError>
where
    A: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(path);
    command.args(args);

    match strategy {
        LaunchStrategy::Exec => exec(command, path),
        LaunchStrategy::Spawn => spawn_and_wait(command, path),
    }
}

#[cfg(unix)]
fn exec(mut command: Command, path: &Path) -> Result<i32, LaunchError> {
    use std::os::unix::process::CommandExt;

    debug!("Executing {}", path.display());
    let source = command.exec();
    Err(LaunchError::Exec {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(not(unix))]
fn exec(command: Command, path: &Path) -> Result<i32, LaunchError> {
    spawn_and_wait(command, path)
}

fn spawn_and_wait(mut command: Command, path: &Path) -> Result<i32, LaunchError> {
    debug!("Spawning {}", path.display());

    // Replaces the default SIGINT action for the wrapper only; the child
    // still gets the default disposition after exec.
    let interrupted = Arc::new(AtomicBool::new(false));
    let handler = signal_hook::flag::register(
        signal_hook::consts::SIGINT,
        Arc::clone(&interrupted),
    )
    .map_err(LaunchError::SignalHandler)?;

    let result = command
        .spawn()
        .map_err(|source| LaunchError::Spawn {
            path: path.to_path_buf(),
            source,
        })
        .and_then(|mut child| child.wait().map_err(LaunchError::Wait));

    signal_hook::low_level::unregister(handler);
    let status = result?;

    if interrupted.load(Ordering::SeqCst) {
        debug!("Interrupted while waiting for {}", path.display());
        return Ok(INTERRUPTED_EXIT_CODE);
    }

    Ok(exit_code(status))
}

/// Converts a child's exit status to the code a shell would report.
#[must_use]
pub fn exit_code(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;

        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    status.code().unwrap_or(FAILURE_EXIT_CODE)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::fs;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    use super::*;
    use crate::error::InstallError;
    use crate::installer::InstalledBinary;

    /// Installer double that writes a script and the marker, counting runs.
    struct FakeInstaller {
        layout: InstallLayout,
        version: String,
        calls: Cell<usize>,
        write_binary: bool,
        fail: bool,
    }

    impl FakeInstaller {
        fn new(config: &InstallConfig) -> Self {
            Self {
                layout: config.layout(),
                version: config.version.clone(),
                calls: Cell::new(0),
                write_binary: true,
                fail: false,
            }
        }
    }

    impl BinaryInstaller for FakeInstaller {
        fn install(&self) -> crate::error::Result<InstalledBinary> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(InstallError::ManifestEntryMissing("shaper-linux-amd64".to_string()));
            }
            fs::create_dir_all(self.layout.bin_dir()).unwrap();
            if self.write_binary {
                let _guard = script_lock();
                write_script(&self.layout.binary_path(), "exit 0");
            }
            VersionMarker::new(self.layout.version_path())
                .write(&self.version)
                .unwrap();
            Ok(InstalledBinary {
                version: self.version.clone(),
                asset: "shaper-linux-amd64".to_string(),
                path: self.layout.binary_path(),
                sha256: String::new(),
                size: 0,
            })
        }
    }

    // A script still open for writing in one thread while another thread
    // forks fails to exec with ETXTBSY.
    static SCRIPT_LOCK: Mutex<()> = Mutex::new(());

    fn script_lock() -> MutexGuard<'static, ()> {
        SCRIPT_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_script(path: &Path, body: &str) {
        fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    fn setup(marker: Option<&str>) -> (tempfile::TempDir, InstallConfig) {
        let root = tempfile::tempdir().unwrap();
        let config = InstallConfig::new(root.path()).with_version("1.4.0");
        let layout = config.layout();
        fs::create_dir_all(layout.bin_dir()).unwrap();
        {
            let _guard = script_lock();
            write_script(&layout.binary_path(), "exit 0");
        }
        if let Some(version) = marker {
            fs::write(layout.version_path(), format!("{version}\n")).unwrap();
        }
        (root, config)
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!(LaunchStrategy::from_name("exec"), Some(LaunchStrategy::Exec));
        assert_eq!(LaunchStrategy::from_name(" Spawn "), Some(LaunchStrategy::Spawn));
        assert_eq!(LaunchStrategy::from_name("fork"), None);
    }

    #[test]
    fn test_usable_install_skips_installer() {
        let (_root, config) = setup(Some("1.4.0"));
        let launcher = Launcher::with_installer(&config, FakeInstaller::new(&config));

        assert!(launcher.is_usable());
        let path = launcher.ensure_installed().unwrap();

        assert_eq!(path, config.layout().binary_path());
        assert_eq!(launcher.installer.calls.get(), 0);
    }

    #[test]
    fn test_missing_marker_installs_once() {
        let (_root, config) = setup(None);
        let launcher = Launcher::with_installer(&config, FakeInstaller::new(&config));

        assert!(!launcher.is_usable());
        launcher.ensure_installed().unwrap();

        assert_eq!(launcher.installer.calls.get(), 1);
        assert!(launcher.is_usable());
    }

    #[test]
    fn test_mismatched_marker_installs_once() {
        let (_root, config) = setup(Some("1.3.0"));
        let launcher = Launcher::with_installer(&config, FakeInstaller::new(&config));

        launcher.ensure_installed().unwrap();
        assert_eq!(launcher.installer.calls.get(), 1);
    }

    #[test]
    fn test_missing_binary_installs_once() {
        let (_root, config) = setup(Some("1.4.0"));
        fs::remove_file(config.layout().binary_path()).unwrap();
        let launcher = Launcher::with_installer(&config, FakeInstaller::new(&config));

        assert!(!launcher.is_usable());
        launcher.ensure_installed().unwrap();
        assert_eq!(launcher.installer.calls.get(), 1);
    }

    #[test]
    fn test_install_failure_is_fatal() {
        let (_root, config) = setup(None);
        let mut installer = FakeInstaller::new(&config);
        installer.fail = true;
        let launcher = Launcher::with_installer(&config, installer);

        let err = launcher.ensure_installed().unwrap_err();
        assert!(matches!(err, LaunchError::Install(InstallError::ManifestEntryMissing(_))));
        assert_eq!(launcher.installer.calls.get(), 1);
    }

    #[test]
    fn test_binary_missing_after_install() {
        let (_root, config) = setup(None);
        fs::remove_file(config.layout().binary_path()).unwrap();
        let mut installer = FakeInstaller::new(&config);
        installer.write_binary = false;
        let launcher = Launcher::with_installer(&config, installer);

        let err = launcher.ensure_installed().unwrap_err();
        assert!(matches!(err, LaunchError::BinaryMissingAfterInstall(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_propagates_exit_code() {
        let (_root, config) = setup(Some("1.4.0"));
        let _guard = script_lock();
        write_script(&config.layout().binary_path(), "exit \"$1\"");
        let launcher = Launcher::with_installer(&config, FakeInstaller::new(&config))
            .with_strategy(LaunchStrategy::Spawn);

        assert_eq!(launcher.launch(["7"]).unwrap(), 7);
        assert_eq!(launcher.launch(["0"]).unwrap(), 0);
        assert_eq!(launcher.installer.calls.get(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_maps_signal_death() {
        let _guard = script_lock();
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("die");
        write_script(&script, "kill -INT $$\nsleep 5");
        assert_eq!(
            run_binary(&script, Vec::<String>::new(), LaunchStrategy::Spawn).unwrap(),
            INTERRUPTED_EXIT_CODE
        );

        write_script(&script, "kill -TERM $$\nsleep 5");
        assert_eq!(
            run_binary(&script, Vec::<String>::new(), LaunchStrategy::Spawn).unwrap(),
            128 + 15
        );
    }

    #[test]
    fn test_spawn_missing_binary() {
        let _guard = script_lock();
        let dir = tempfile::tempdir().unwrap();
        let err = run_binary(
            &dir.path().join("missing"),
            Vec::<String>::new(),
            LaunchStrategy::Spawn,
        )
        .unwrap_err();
        assert!(matches!(err, LaunchError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_missing_binary() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_binary(
            &dir.path().join("missing"),
            Vec::<String>::new(),
            LaunchStrategy::Exec,
        )
        .unwrap_err();
        assert!(matches!(err, LaunchError::Exec { .. }));
    }
}
