//! `shaper` entry point.
//!
//! Makes sure the release binary matching this package is installed, then
//! runs it with every argument passed through untouched.

use std::io::{self, IsTerminal};

use shaper_cli::env::EnvSettings;
use shaper_cli::logging::{LogConfig, init_logging};
use shaper_installer::launch::FAILURE_EXIT_CODE;
use shaper_installer::{LaunchError, Launcher};

fn main() {
    let log_config = LogConfig::launcher().with_ansi(io::stderr().is_terminal());
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(FAILURE_EXIT_CODE);
    }

    let exit_code = match run(&EnvSettings::from_env()) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            if let Some(LaunchError::Install(install)) = error.downcast_ref::<LaunchError>() {
                eprintln!("{}", install.user_message());
            }
            FAILURE_EXIT_CODE
        }
    };
    std::process::exit(exit_code);
}

fn run(env: &EnvSettings) -> anyhow::Result<i32> {
    let root = env.install_root(None)?;
    let launcher =
        Launcher::new(env.install_config(root)).with_strategy(env.launch_strategy()?);
    Ok(launcher.launch(std::env::args_os().skip(1))?)
}
