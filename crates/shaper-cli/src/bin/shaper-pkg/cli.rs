//! CLI argument definitions for `shaper-pkg`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "shaper-pkg",
    version,
    about = "Manage the Shaper binary installed by this package",
    long_about = "Install, remove or inspect the Shaper release binary.\n\n\
                  The binary lives in <root>/bin next to the checksum manifest \
                  shipped with the package."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Package root holding the bin/ directory (default: $SHAPER_PKG_ROOT,
    /// then the directory of this executable).
    #[arg(long = "root", value_name = "DIR", global = true)]
    pub root: Option<PathBuf>,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "compact",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Download and install the binary for this package version.
    Install {
        /// Reinstall even when the matching version is already present.
        #[arg(long)]
        force: bool,
    },

    /// Remove the installed binary.
    Uninstall,

    /// Show what is installed and whether it matches this package.
    Status,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
