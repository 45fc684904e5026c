//! Configuration management for Strata

pub mod schema;

pub use schema::{ColorMode, Config};

use crate::error::{StrataError, StrataResult};
use crate::layer::MetadataPolicy;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Locates, loads and saves the configuration file
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Use `~/.config/strata/config.toml`
    pub fn new() -> Self {
        let config_path = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("strata")
            .join("config.toml");
        Self { config_path }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Load configuration, falling back to defaults if the file is missing
    pub async fn load(&self) -> StrataResult<Config> {
        let content = match fs::read_to_string(&self.config_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", self.config_path.display());
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(StrataError::io(
                    format!("reading config from {}", self.config_path.display()),
                    e,
                ))
            }
        };

        toml::from_str(&content).map_err(|e| StrataError::ConfigInvalid {
            path: self.config_path.clone(),
            reason: e.to_string(),
        })
    }

    /// Write `config` to the config path, creating its directory
    pub async fn save(&self, config: &Config) -> StrataResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StrataError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            StrataError::write(format!("writing config to {}", self.config_path.display()), e)
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Config {
    /// Metadata corruption policy selected by `layers.tolerate_corrupt_metadata`
    pub fn metadata_policy(&self) -> MetadataPolicy {
        if self.layers.tolerate_corrupt_metadata {
            MetadataPolicy::TolerateCorrupt
        } else {
            MetadataPolicy::Strict
        }
    }
}
