//! Command line interface definition

use clap::{ArgAction, Args, Parser, Subcommand};
use autospec_types::ColorChoice;
use std::path::PathBuf;

/// autospec - Generate RPM spec files from upstream source archives
#[derive(Parser)]
#[command(name = "autospec")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate RPM spec files from upstream source archives")]
#[command(long_about = None)]
#[command(disable_version_flag = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub draft: DraftArgs,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Args)]
pub struct GlobalArgs {
    /// Write JSON debug logs into the package directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print version
    #[arg(short = 'V', long = "tool-version", action = ArgAction::Version)]
    pub tool_version: Option<bool>,
}

/// Arguments of the default draft run
#[derive(Args)]
pub struct DraftArgs {
    /// URL of the upstream source archive
    pub url: Option<String>,

    /// Foreign recipe to merge (repeatable)
    #[arg(long = "recipe", value_name = "PATH")]
    pub recipes: Vec<PathBuf>,

    /// Package directory
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Override the package name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Override the package version
    #[arg(long = "version", value_name = "VERSION")]
    pub version: Option<String>,

    /// Extra archive and the directory it unpacks into (repeatable)
    #[arg(
        long = "archives",
        num_args = 2,
        value_names = ["URL", "DEST"],
        action = ArgAction::Append
    )]
    pub archives: Vec<String>,

    /// Skip the Python package index query
    #[arg(long)]
    pub no_pypi: bool,

    /// Record which repository packages require this one
    #[arg(long)]
    pub whatrequires: bool,

    /// Build the spec and check the build log
    #[arg(long)]
    pub build: bool,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Check results/build.log of a package directory for configure misses
    Logcheck {
        /// Package directory
        pkg_dir: PathBuf,
    },
}
