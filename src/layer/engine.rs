//! Layer contribution
//!
//! Decides whether a layer still matches its dependency and, if not, runs a
//! contributor to rebuild it. The metadata record is written only after the
//! contributor succeeds, so a failed or interrupted contribution is simply
//! retried on the next build.

use crate::dependency::Dependency;
use crate::error::StrataResult;
use crate::layer::directory::LayerDirectory;
use crate::layer::metadata::MetadataStore;
use crate::logger::Logger;
use async_trait::async_trait;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Populates a layer from a retrieved artifact
#[async_trait]
pub trait Contributor: Send + Sync {
    /// Fill `layer` using the artifact at `artifact`
    ///
    /// Returning an error leaves the layer marked as not cached.
    async fn contribute(&self, artifact: &Path, layer: &LayerDirectory) -> StrataResult<()>;
}

/// Result of a contribution attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Metadata matched; the contributor was not run
    Reused,
    /// The contributor ran and fresh metadata was written
    Contributed,
}

/// Runs the compare / skip / contribute / persist cycle for a layer
#[derive(Debug, Clone)]
pub struct ContributionEngine {
    store: MetadataStore,
    logger: Logger,
}

impl ContributionEngine {
    pub fn new(store: MetadataStore, logger: Logger) -> Self {
        Self { store, logger }
    }

    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Contribute `dependency` to `layer` unless it is already there
    ///
    /// `resolve_artifact` is awaited only on a miss, so an up-to-date layer
    /// never triggers a retrieval.
    pub async fn contribute<F, Fut, C>(
        &self,
        dependency: &Dependency,
        layer: &LayerDirectory,
        resolve_artifact: F,
        contributor: &C,
    ) -> StrataResult<Outcome>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = StrataResult<PathBuf>>,
        C: Contributor + ?Sized,
    {
        let expected = dependency.metadata();
        let pretty = self
            .logger
            .pretty_version(dependency.display_name(), dependency.version.as_str());

        if let Some(existing) = self.store.read(layer.metadata_path()).await? {
            if existing == expected {
                self.logger.first_line(format!(
                    "{}: {} cached {} layer",
                    pretty,
                    self.logger.style("Reusing").green(),
                    layer.policy()
                ));
                debug!("Layer {} is current, skipping contribution", layer.root().display());
                return Ok(Outcome::Reused);
            }
            debug!(
                "Layer {} is stale (cached sha256 {}, wanted {})",
                layer.root().display(),
                existing.sha256,
                expected.sha256
            );
        }

        self.logger.first_line(format!(
            "{}: {} to {} layer",
            pretty,
            self.logger.style("Contributing").yellow(),
            layer.policy()
        ));

        // A stale or unreadable record must not outlive the contents it described
        self.store.remove(layer.metadata_path()).await?;
        layer.ensure().await?;
        let artifact = resolve_artifact().await?;
        contributor.contribute(&artifact, layer).await?;

        self.store
            .write(layer.metadata_path(), &expected.stamped())
            .await?;

        info!(
            "Contributed {} to {}",
            dependency,
            layer.root().display()
        );
        Ok(Outcome::Contributed)
    }
}
