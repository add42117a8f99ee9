//! Package maintenance for the Shaper binary.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use shaper_cli::env::EnvSettings;
use shaper_cli::logging::{LogConfig, LogFormat, init_logging};
use shaper_installer::InstallError;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg};
use crate::commands::{run_install, run_status, run_uninstall};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let exit_code = match run(cli) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error}");
            if let Some(install) = error.downcast_ref::<InstallError>() {
                eprintln!("{}", install.user_message());
            }
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let env = EnvSettings::from_env();
    let config = env.install_config(env.install_root(cli.root)?);

    match cli.command {
        Command::Install { force } => run_install(config, force),
        Command::Uninstall => run_uninstall(&config),
        Command::Status => {
            run_status(&config);
            Ok(())
        }
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };

    let mut config = LogConfig::default();
    // -v/-q take precedence over RUST_LOG
    if cli.verbosity.is_present() {
        config = config.with_level_filter(cli.verbosity.tracing_level_filter());
    }
    config
        .with_format(format)
        .with_log_file(cli.log_file.clone())
        .with_ansi(with_ansi)
}
