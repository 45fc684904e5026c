//! CLI argument definitions using clap derive

use crate::config::ColorMode;
use crate::launch::Process;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Strata - buildpack layer contribution cache
///
/// Contributes dependency layers only when their content hash changes,
/// and writes the launch manifest of process types.
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "STRATA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root of hash-addressed cache layers
    #[arg(long, global = true, env = "STRATA_CACHE_ROOT")]
    pub cache_root: Option<PathBuf>,

    /// Root of launch layers and the process manifest
    #[arg(long, global = true, env = "STRATA_LAUNCH_ROOT")]
    pub launch_root: Option<PathBuf>,

    /// Colour build output
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorMode>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Contribute a dependency to its launch layer
    Contribute(ContributeArgs),

    /// Write the launch manifest of process types
    Launch(LaunchArgs),

    /// List contributed layers
    Layers(LayersArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the contribute command
#[derive(Parser, Debug)]
pub struct ContributeArgs {
    /// Dependency id, used as the launch layer name
    #[arg(long)]
    pub id: String,

    /// Dependency version
    #[arg(long = "version", value_name = "VERSION")]
    pub dependency_version: String,

    /// Expected SHA-256 of the artifact (hex)
    #[arg(long)]
    pub sha256: String,

    /// Artifact location (file:// URI or local path)
    #[arg(long)]
    pub uri: String,

    /// Display name for build output
    #[arg(long)]
    pub name: Option<String>,
}

/// Arguments for the launch command
#[derive(Parser, Debug)]
pub struct LaunchArgs {
    /// Process types as TYPE=COMMAND, in display order
    #[arg(required = true, value_name = "TYPE=COMMAND")]
    pub processes: Vec<Process>,
}

/// Arguments for the layers command
#[derive(Parser, Debug)]
pub struct LayersArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for the layers command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one layer path per line)
    Plain,
}
