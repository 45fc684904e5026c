//! Configuration schema for Strata
//!
//! Configuration is stored at `~/.config/strata/config.toml`

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Layer roots and cache policy
    pub layers: LayersConfig,

    /// Build log output
    pub output: OutputConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Diagnostic log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Layer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayersConfig {
    /// Root of hash-addressed cache layers
    pub cache_root: Option<PathBuf>,

    /// Root of identity-addressed launch layers and the process manifest
    pub launch_root: Option<PathBuf>,

    /// Treat unparseable layer metadata as a cache miss instead of an error
    pub tolerate_corrupt_metadata: bool,
}

impl LayersConfig {
    /// Cache root, falling back to the platform cache directory
    pub fn cache_root(&self) -> PathBuf {
        self.cache_root.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("strata")
                .join("cache")
        })
    }

    /// Launch root, falling back to the platform data directory
    pub fn launch_root(&self) -> PathBuf {
        self.launch_root.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("strata")
                .join("launch")
        })
    }
}

/// Build log settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// When to colour build output
    pub color: ColorMode,
}

/// Colour choice for build output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Colour when stdout is a terminal
    #[default]
    Auto,
    /// Always colour
    Always,
    /// Never colour
    Never,
}

impl ColorMode {
    /// Whether build output should be coloured
    pub fn enabled(&self) -> bool {
        match self {
            Self::Auto => console::colors_enabled(),
            Self::Always => true,
            Self::Never => false,
        }
    }
}
