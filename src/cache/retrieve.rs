//! Artifact retrieval and verification
//!
//! Retrieval turns a dependency's URI into bytes on local disk. Network
//! downloads belong to whoever embeds this crate; the bundled
//! `FileRetriever` only handles `file://` URIs and plain paths.

use crate::dependency::Dependency;
use crate::error::{StrataError, StrataResult};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::debug;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Materializes a dependency's artifact at a local path
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Place the artifact for `dependency` at `destination`
    async fn retrieve(&self, dependency: &Dependency, destination: &Path) -> StrataResult<()>;
}

/// Retrieves artifacts that already exist on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FileRetriever;

impl FileRetriever {
    /// Resolve a `file://` URI or plain path to a local path
    fn source_path(uri: &str) -> StrataResult<PathBuf> {
        if let Some(path) = uri.strip_prefix("file://") {
            return Ok(PathBuf::from(path));
        }
        if let Some((scheme, _)) = uri.split_once("://") {
            return Err(StrataError::retrieval(
                uri,
                format!("unsupported scheme '{}', only file:// and local paths", scheme),
            ));
        }
        Ok(PathBuf::from(uri))
    }
}

#[async_trait]
impl Retriever for FileRetriever {
    async fn retrieve(&self, dependency: &Dependency, destination: &Path) -> StrataResult<()> {
        let source = Self::source_path(&dependency.uri)?;

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StrataError::write(format!("creating {}", parent.display()), e))?;
        }

        debug!("Copying {} to {}", source.display(), destination.display());
        fs::copy(&source, destination)
            .await
            .map_err(|e| StrataError::retrieval(&dependency.uri, e.to_string()))?;

        Ok(())
    }
}

/// Hex-encoded SHA-256 of a file's contents
pub async fn sha256_file(path: &Path) -> StrataResult<String> {
    let context = || format!("hashing {}", path.display());
    let mut file = fs::File::open(path)
        .await
        .map_err(|e| StrataError::io(context(), e))?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];
    loop {
        let read = file
            .read(&mut buffer)
            .await
            .map_err(|e| StrataError::io(context(), e))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Check a file against an expected hex SHA-256
pub async fn verify_sha256(path: &Path, expected: &str) -> StrataResult<()> {
    let actual = sha256_file(path).await?;
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(StrataError::DigestMismatch {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        })
    }
}
