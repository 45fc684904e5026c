//! Launch manifest
//!
//! Process types map a short name (`web`, `worker`) to the command that
//! starts it. The manifest is written to `<launch root>/launch.toml`:
//!
//! ```toml
//! [[processes]]
//! type = "web"
//! command = "java -jar app.jar"
//! ```

use crate::error::{StrataError, StrataResult};
use crate::layer::metadata::write_atomic;
use crate::logger::Logger;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tokio::fs;

/// File name of the manifest under the launch root
pub const LAUNCH_MANIFEST_FILE: &str = "launch.toml";

/// A named process type and its start command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    #[serde(rename = "type")]
    pub process_type: String,
    pub command: String,
}

impl Process {
    pub fn new(process_type: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            process_type: process_type.into(),
            command: command.into(),
        }
    }
}

impl FromStr for Process {
    type Err = StrataError;

    /// Parse `TYPE=COMMAND`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (process_type, command) = s
            .split_once('=')
            .ok_or_else(|| StrataError::InvalidProcess(s.to_string()))?;
        let process_type = process_type.trim();
        if process_type.is_empty() || command.trim().is_empty() {
            return Err(StrataError::InvalidProcess(s.to_string()));
        }
        Ok(Self::new(process_type, command.trim()))
    }
}

/// Process types contributed for launch, in caller order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchMetadata {
    #[serde(default)]
    pub processes: Vec<Process>,
}

impl LaunchMetadata {
    pub fn new(processes: Vec<Process>) -> Self {
        Self { processes }
    }

    /// Load a manifest from disk
    pub async fn from_file(path: &Path) -> StrataResult<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| StrataError::io(format!("reading launch manifest {}", path.display()), e))?;
        Ok(toml::from_str(&content)?)
    }

    /// Persist the manifest to `path`
    pub async fn write(&self, path: &Path) -> StrataResult<()> {
        let content = toml::to_string(self)?;
        write_atomic(path, content.as_bytes()).await
    }

    /// Log the process types with their commands in one aligned column
    pub fn log(&self, logger: &Logger) {
        logger.first_line("Process types:");

        let width = self
            .processes
            .iter()
            .map(|p| p.process_type.chars().count())
            .max()
            .unwrap_or(0);

        for process in &self.processes {
            let padding = width - process.process_type.chars().count();
            logger.sub_line(format!(
                "{}:{} {}",
                logger.style(&process.process_type).cyan(),
                " ".repeat(padding),
                process.command
            ));
        }
    }
}
