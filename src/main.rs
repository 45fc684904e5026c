//! Strata - buildpack layer contribution cache
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use strata::cli::{Cli, Commands};
use strata::config::ConfigManager;
use strata::error::StrataResult;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> StrataResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let mut config = config_manager.load().await?;

    // Command line overrides
    if let Some(root) = cli.cache_root {
        config.layers.cache_root = Some(root);
    }
    if let Some(root) = cli.launch_root {
        config.layers.launch_root = Some(root);
    }
    if let Some(color) = cli.color {
        config.output.color = color;
    }

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("strata=warn"),
        1 => EnvFilter::new("strata=info"),
        _ => EnvFilter::new("strata=debug"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();
    if config.general.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    debug!("Configuration loaded from {}", config_manager.path().display());

    // Dispatch to command
    match cli.command {
        Commands::Contribute(args) => strata::cli::commands::contribute(args, &config).await,
        Commands::Launch(args) => strata::cli::commands::launch(args, &config).await,
        Commands::Layers(args) => strata::cli::commands::layers(args, &config).await,
        Commands::Config(args) => strata::cli::commands::config(args, &config, cli.config).await,
    }
}
