//! Contribute command - place a dependency's artifact in its launch layer

use crate::cli::args::ContributeArgs;
use crate::config::Config;
use crate::dependency::Dependency;
use crate::error::{StrataError, StrataResult};
use crate::layer::{Contributor, LayerDirectory};
use async_trait::async_trait;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Execute the contribute command
pub async fn execute(args: ContributeArgs, config: &Config) -> StrataResult<()> {
    let mut dependency = Dependency::new(args.id, args.dependency_version, args.sha256, args.uri);
    if let Some(name) = args.name {
        dependency = dependency.with_name(name);
    }

    let launch = super::build_launch(config);
    let layer = launch.dependency_layer(&dependency)?;
    let contributor = CopyArtifact {
        file_name: dependency.artifact_name().to_string(),
    };

    let outcome = layer.contribute(&contributor).await?;
    debug!("{} layer outcome: {:?}", dependency.id, outcome);

    launch
        .logger()
        .sub_line(format!("Layer: {}", layer.root().display()));
    Ok(())
}

/// Copies the artifact into the launch layer unchanged
struct CopyArtifact {
    file_name: String,
}

#[async_trait]
impl Contributor for CopyArtifact {
    async fn contribute(&self, artifact: &Path, layer: &LayerDirectory) -> StrataResult<()> {
        let bytes = fs::read(artifact).await.map_err(|e| {
            StrataError::contribution(format!("reading artifact {}: {}", artifact.display(), e))
        })?;
        let path = layer.write_file(&self.file_name, &bytes).await?;
        debug!("Copied {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}
