//! Layer metadata records
//!
//! Each contributed layer carries a small TOML record describing the
//! dependency it was built from. The record is the only proof that a layer
//! is valid: it is written after a successful contribution and never before.

use crate::dependency::Dependency;
use crate::error::{StrataError, StrataResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

/// Metadata written alongside a contributed layer
///
/// Equality compares `id`, `version`, `uri` and `sha256` only. `name` and
/// `contributed_at` are informational.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerMetadata {
    pub id: String,

    #[serde(default)]
    pub name: String,

    pub version: String,

    pub uri: String,

    pub sha256: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributed_at: Option<DateTime<Utc>>,
}

impl PartialEq for LayerMetadata {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.version == other.version
            && self.uri == other.uri
            && self.sha256 == other.sha256
    }
}

impl Eq for LayerMetadata {}

impl From<&Dependency> for LayerMetadata {
    fn from(dependency: &Dependency) -> Self {
        Self {
            id: dependency.id.clone(),
            name: dependency.name.clone(),
            version: dependency.version.to_string(),
            uri: dependency.uri.clone(),
            sha256: dependency.sha256.clone(),
            contributed_at: None,
        }
    }
}

impl LayerMetadata {
    /// Parse a record from TOML
    pub fn parse(content: &str, path: &Path) -> StrataResult<Self> {
        toml::from_str(content).map_err(|e| StrataError::MetadataCodec {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Stamp the record with the current time
    pub fn stamped(mut self) -> Self {
        self.contributed_at = Some(Utc::now());
        self
    }
}

/// What to do with a record that exists but cannot be parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MetadataPolicy {
    /// Fail the read with a `MetadataCodec` error
    #[default]
    Strict,
    /// Warn and treat the layer as not cached
    TolerateCorrupt,
}

/// Reads and writes layer metadata records
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataStore {
    policy: MetadataPolicy,
}

impl MetadataStore {
    pub fn new(policy: MetadataPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MetadataPolicy {
        self.policy
    }

    /// Read the record at `path`; `None` when no record exists
    pub async fn read(&self, path: &Path) -> StrataResult<Option<LayerMetadata>> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No layer metadata at {}", path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(StrataError::io(
                    format!("reading layer metadata {}", path.display()),
                    e,
                ))
            }
        };

        match LayerMetadata::parse(&content, path) {
            Ok(record) => Ok(Some(record)),
            Err(e) if self.policy == MetadataPolicy::TolerateCorrupt => {
                warn!("Ignoring unreadable layer metadata: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Replace the record at `path`
    pub async fn write(&self, path: &Path, record: &LayerMetadata) -> StrataResult<()> {
        let content = toml::to_string(record)?;
        write_atomic(path, content.as_bytes()).await?;
        debug!("Wrote layer metadata {}", path.display());
        Ok(())
    }

    /// Delete the record at `path`, if any
    pub async fn remove(&self, path: &Path) -> StrataResult<()> {
        match fs::remove_file(path).await {
            Ok(()) => {
                debug!("Removed layer metadata {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StrataError::write(
                format!("removing layer metadata {}", path.display()),
                e,
            )),
        }
    }
}

/// Write `contents` to `path` so readers see either the old or the new file
///
/// Contents go to a uniquely named sibling first and are renamed over the
/// target once fully synced. The sibling is removed if anything fails.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> StrataResult<()> {
    let parent = path.parent().ok_or_else(|| {
        StrataError::Internal(format!("{} has no parent directory", path.display()))
    })?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| StrataError::Internal(format!("{} has no file name", path.display())))?;

    let temp_path = parent.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

    let result = async {
        super::directory::write_file(&temp_path, contents).await?;
        fs::rename(&temp_path, path)
            .await
            .map_err(|e| StrataError::write(format!("replacing {}", path.display()), e))
    }
    .await;

    if result.is_err() {
        let _ = fs::remove_file(&temp_path).await;
    }
    result
}
