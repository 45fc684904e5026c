//! Config command - show or initialize configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::StrataResult;
use console::style;
use std::path::PathBuf;

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    config_path: Option<PathBuf>,
) -> StrataResult<()> {
    let manager = match config_path {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };

    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(&manager, force).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> StrataResult<()> {
    let mut effective = config.clone();
    effective.layers.cache_root = Some(config.layers.cache_root());
    effective.layers.launch_root = Some(config.layers.launch_root());

    println!("{}", toml::to_string_pretty(&effective)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> StrataResult<()> {
    let path = manager.path();

    if path.exists() && !force {
        println!(
            "  {} Config already exists at {} - {}",
            style("[WARN]").yellow(),
            path.display(),
            style("Use --force to overwrite").dim()
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    println!(
        "  {} Configuration initialized ({})",
        style("[OK]").green(),
        path.display()
    );

    Ok(())
}
