//! Layer directories
//!
//! A layer lives at `<layers root>/<key>`. Hash-addressed layers are keyed by
//! the dependency's SHA-256 and keep their metadata inside the layer;
//! identity-addressed layers are keyed by dependency id and keep their
//! metadata next to the layer as `<id>.toml`.

use crate::dependency::Dependency;
use crate::error::{StrataError, StrataResult};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// File name of the metadata record inside a hash-addressed layer
pub const DEPENDENCY_METADATA_FILE: &str = "dependency.toml";

/// Identity key reserved for the launch manifest (`launch.toml`)
const RESERVED_IDENTITY_KEY: &str = "launch";

/// How a layer's directory key is derived from a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Keyed by content hash; shared by any dependency with the same bytes
    ContentHash,
    /// Keyed by dependency id; one live version at a time
    Identity,
}

impl KeyPolicy {
    /// Derive the directory key for a dependency
    pub fn key<'a>(&self, dependency: &'a Dependency) -> &'a str {
        match self {
            Self::ContentHash => &dependency.sha256,
            Self::Identity => &dependency.id,
        }
    }
}

impl fmt::Display for KeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContentHash => write!(f, "content-hash"),
            Self::Identity => write!(f, "identity"),
        }
    }
}

/// Validate that a key is a single, safe path component
fn validate_key(key: &str, policy: KeyPolicy) -> StrataResult<()> {
    let invalid = |reason: &str| StrataError::InvalidLayerKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    if key.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if key == "." || key == ".." {
        return Err(invalid("must not be '.' or '..'"));
    }
    if key.contains('/') || key.contains('\\') || key.contains('\0') {
        return Err(invalid("must not contain path separators"));
    }
    // `<id>.toml` sits beside identity layers; a key ending in .toml could shadow one
    if key.ends_with(".toml") {
        return Err(invalid("must not end in .toml"));
    }
    if policy == KeyPolicy::Identity && key == RESERVED_IDENTITY_KEY {
        return Err(invalid("reserved for the launch manifest"));
    }
    Ok(())
}

/// Handle to one layer directory on disk
#[derive(Debug, Clone)]
pub struct LayerDirectory {
    key: String,
    root: PathBuf,
    metadata_path: PathBuf,
    policy: KeyPolicy,
}

impl LayerDirectory {
    /// Resolve the layer for `dependency` beneath `layers_root`
    pub fn for_dependency(
        layers_root: &Path,
        policy: KeyPolicy,
        dependency: &Dependency,
    ) -> StrataResult<Self> {
        Self::new(layers_root, policy, policy.key(dependency))
    }

    /// Resolve the layer for an explicit key beneath `layers_root`
    pub fn new(layers_root: &Path, policy: KeyPolicy, key: &str) -> StrataResult<Self> {
        validate_key(key, policy)?;

        let root = layers_root.join(key);
        let metadata_path = match policy {
            KeyPolicy::ContentHash => root.join(DEPENDENCY_METADATA_FILE),
            KeyPolicy::Identity => layers_root.join(format!("{}.toml", key)),
        };

        Ok(Self {
            key: key.to_string(),
            root,
            metadata_path,
            policy,
        })
    }

    /// The layer's key (content hash or dependency id)
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Directory holding the layer's contents
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the layer's metadata record
    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    pub fn policy(&self) -> KeyPolicy {
        self.policy
    }

    /// Create the layer directory if it does not exist yet
    pub async fn ensure(&self) -> StrataResult<()> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            StrataError::write(format!("creating layer {}", self.root.display()), e)
        })
    }

    /// Resolve a path relative to the layer root, refusing escapes
    pub fn path(&self, relative: impl AsRef<Path>) -> StrataResult<PathBuf> {
        let relative = relative.as_ref();
        let escapes = relative.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes || relative.as_os_str().is_empty() {
            return Err(StrataError::User(format!(
                "Path {} must be relative to layer {}",
                relative.display(),
                self.key
            )));
        }
        Ok(self.root.join(relative))
    }

    /// Write `contents` to a file beneath the layer, creating parents
    ///
    /// The handle is closed on every exit path. A failure part way through
    /// can leave a partial file behind; only the metadata record says whether
    /// the layer is valid.
    pub async fn write_file(
        &self,
        relative: impl AsRef<Path>,
        contents: &[u8],
    ) -> StrataResult<PathBuf> {
        let path = self.path(relative)?;
        write_file(&path, contents).await?;
        Ok(path)
    }
}

/// Write a file, creating parent directories as needed
pub(crate) async fn write_file(path: &Path, contents: &[u8]) -> StrataResult<()> {
    let context = || format!("writing {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| StrataError::write(format!("creating {}", parent.display()), e))?;
    }

    let mut file = fs::File::create(path)
        .await
        .map_err(|e| StrataError::write(context(), e))?;
    file.write_all(contents)
        .await
        .map_err(|e| StrataError::write(context(), e))?;
    file.sync_all()
        .await
        .map_err(|e| StrataError::write(context(), e))?;

    Ok(())
}
