//! Content-addressed dependency cache
//!
//! Downloaded artifacts live in hash-addressed layers under the cache root,
//! `<cache root>/<sha256>/<artifact name>`, with the dependency record at
//! `<cache root>/<sha256>/dependency.toml`. Same bytes = same layer,
//! whichever dependency id asks for them.

pub mod retrieve;

pub use retrieve::{sha256_file, verify_sha256, FileRetriever, Retriever};

use crate::dependency::Dependency;
use crate::error::{StrataError, StrataResult};
use crate::layer::{ContributionEngine, Contributor, KeyPolicy, LayerDirectory, DEPENDENCY_METADATA_FILE};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

/// The build's download cache
#[derive(Clone)]
pub struct Cache {
    root: PathBuf,
    retriever: Arc<dyn Retriever>,
    engine: ContributionEngine,
}

impl Cache {
    pub fn new(root: impl Into<PathBuf>, retriever: Arc<dyn Retriever>, engine: ContributionEngine) -> Self {
        Self {
            root: root.into(),
            retriever,
            engine,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The hash-addressed layer holding `dependency`'s artifact
    pub fn dependency_layer(&self, dependency: &Dependency) -> StrataResult<DependencyCacheLayer<'_>> {
        let layer = LayerDirectory::for_dependency(&self.root, KeyPolicy::ContentHash, dependency)?;
        Ok(DependencyCacheLayer {
            cache: self,
            dependency: dependency.clone(),
            layer,
        })
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

/// A dependency's layer in the download cache
#[derive(Debug)]
pub struct DependencyCacheLayer<'a> {
    cache: &'a Cache,
    dependency: Dependency,
    layer: LayerDirectory,
}

impl DependencyCacheLayer<'_> {
    pub fn root(&self) -> &Path {
        self.layer.root()
    }

    pub fn layer(&self) -> &LayerDirectory {
        &self.layer
    }

    /// Local path of the verified artifact, retrieving it on a cache miss
    pub async fn artifact(&self) -> StrataResult<PathBuf> {
        let name = self.dependency.artifact_name();
        if name == DEPENDENCY_METADATA_FILE {
            return Err(StrataError::User(format!(
                "Artifact name {} collides with the layer metadata file",
                name
            )));
        }
        let destination = self.layer.path(name)?;

        let download = Download {
            retriever: self.cache.retriever.as_ref(),
            dependency: &self.dependency,
        };
        let target = destination.clone();
        self.cache
            .engine
            .contribute(&self.dependency, &self.layer, || async move { Ok(target) }, &download)
            .await?;

        Ok(destination)
    }
}

/// Contributor that retrieves and verifies an artifact into a cache layer
struct Download<'a> {
    retriever: &'a dyn Retriever,
    dependency: &'a Dependency,
}

#[async_trait]
impl<'a> Contributor for Download<'a> {
    async fn contribute(&self, artifact: &Path, _layer: &LayerDirectory) -> StrataResult<()> {
        self.retriever.retrieve(self.dependency, artifact).await?;

        if let Err(e) = verify_sha256(artifact, &self.dependency.sha256).await {
            let _ = fs::remove_file(artifact).await;
            return Err(e);
        }
        Ok(())
    }
}
