//! Launch layers and the process manifest
//!
//! Launch layers are identity-addressed: `<launch root>/<id>/`, with the
//! dependency record beside it at `<launch root>/<id>.toml`. Only one
//! version of a dependency is live at a time; a new version replaces the
//! old one in place. Artifacts come from the hash-addressed [`Cache`].

pub mod manifest;

pub use manifest::{LaunchMetadata, Process, LAUNCH_MANIFEST_FILE};

use crate::cache::Cache;
use crate::dependency::Dependency;
use crate::error::StrataResult;
use crate::layer::{ContributionEngine, Contributor, KeyPolicy, LayerDirectory, Outcome};
use crate::logger::Logger;
use std::path::{Path, PathBuf};
use tracing::info;

/// The layers and manifest available to the application at launch
#[derive(Debug, Clone)]
pub struct Launch {
    root: PathBuf,
    cache: Cache,
    engine: ContributionEngine,
}

impl Launch {
    pub fn new(root: impl Into<PathBuf>, cache: Cache, engine: ContributionEngine) -> Self {
        Self {
            root: root.into(),
            cache,
            engine,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Build log shared with the contribution engine
    pub fn logger(&self) -> &Logger {
        self.engine.logger()
    }

    /// Path of the process manifest
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(LAUNCH_MANIFEST_FILE)
    }

    /// The identity-addressed launch layer for `dependency`
    pub fn dependency_layer(&self, dependency: &Dependency) -> StrataResult<DependencyLaunchLayer<'_>> {
        let layer = LayerDirectory::for_dependency(&self.root, KeyPolicy::Identity, dependency)?;
        Ok(DependencyLaunchLayer {
            launch: self,
            dependency: dependency.clone(),
            layer,
        })
    }

    /// Write the process manifest and log its process types
    pub async fn write_metadata(&self, metadata: &LaunchMetadata) -> StrataResult<()> {
        let path = self.manifest_path();
        metadata.write(&path).await?;
        info!(
            "Wrote {} process type(s) to {}",
            metadata.processes.len(),
            path.display()
        );

        metadata.log(self.engine.logger());
        Ok(())
    }
}

/// A dependency's layer under the launch root
#[derive(Debug)]
pub struct DependencyLaunchLayer<'a> {
    launch: &'a Launch,
    dependency: Dependency,
    layer: LayerDirectory,
}

impl DependencyLaunchLayer<'_> {
    pub fn root(&self) -> &Path {
        self.layer.root()
    }

    pub fn layer(&self) -> &LayerDirectory {
        &self.layer
    }

    pub fn dependency(&self) -> &Dependency {
        &self.dependency
    }

    /// File name the dependency's artifact is stored under
    pub fn artifact_name(&self) -> &str {
        self.dependency.artifact_name()
    }

    /// Run `contributor` unless the layer already holds this dependency
    ///
    /// On a miss the artifact is taken from the download cache, retrieving
    /// it first if needed, and handed to the contributor by path.
    pub async fn contribute<C>(&self, contributor: &C) -> StrataResult<Outcome>
    where
        C: Contributor + ?Sized,
    {
        let cache_layer = self.launch.cache.dependency_layer(&self.dependency)?;
        self.launch
            .engine
            .contribute(
                &self.dependency,
                &self.layer,
                || cache_layer.artifact(),
                contributor,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Retriever;
    use crate::error::StrataError;
    use crate::layer::MetadataStore;
    use crate::logger::Capture;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    const SHA256: &str = "6f06dd0e26608013eff30bb1e951cda7de3fdd9e78e907470e0dd5c0ed25e273";

    /// Retriever that must not be reached
    struct Unreachable;

    #[async_trait]
    impl Retriever for Unreachable {
        async fn retrieve(&self, dependency: &Dependency, _destination: &Path) -> StrataResult<()> {
            Err(StrataError::retrieval(&dependency.uri, "retrieval not expected"))
        }
    }

    /// Records whether it ran and whether the layer existed at the time
    #[derive(Default)]
    struct Recording {
        calls: AtomicUsize,
        saw_layer: AtomicBool,
        artifact: std::sync::Mutex<Option<PathBuf>>,
    }

    #[async_trait]
    impl Contributor for Recording {
        async fn contribute(&self, artifact: &Path, layer: &LayerDirectory) -> StrataResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.saw_layer.store(layer.root().is_dir(), Ordering::SeqCst);
            *self.artifact.lock().unwrap() = Some(artifact.to_path_buf());
            Ok(())
        }
    }

    fn launch(root: &Path, logger: Logger) -> Launch {
        let engine = ContributionEngine::new(MetadataStore::default(), logger);
        let cache = Cache::new(root, Arc::new(Unreachable), engine.clone());
        Launch::new(root, cache, engine)
    }

    fn dependency() -> Dependency {
        Dependency::new("test-id", "1.0", SHA256, "http://test.com/test-path")
    }

    const RECORD: &str = r#"id = "test-id"
name = ""
version = "1.0"
uri = "http://test.com/test-path"
sha256 = "6f06dd0e26608013eff30bb1e951cda7de3fdd9e78e907470e0dd5c0ed25e273"
"#;

    #[test]
    fn layer_root_is_dependency_id() {
        let temp = TempDir::new().unwrap();
        let launch = launch(temp.path(), Logger::sink());

        let layer = launch.dependency_layer(&dependency()).unwrap();

        assert_eq!(layer.root(), temp.path().join("test-id"));
    }

    #[test]
    fn artifact_name_from_uri() {
        let temp = TempDir::new().unwrap();
        let launch = launch(temp.path(), Logger::sink());
        let dep = Dependency::new("test-id", "1.0", SHA256, "http://localhost/path/test-artifact-name");

        let layer = launch.dependency_layer(&dep).unwrap();

        assert_eq!(layer.artifact_name(), "test-artifact-name");
    }

    #[tokio::test]
    async fn contributes_with_cached_artifact() {
        let temp = TempDir::new().unwrap();
        let launch = launch(temp.path(), Logger::sink());
        // Artifact already in the download cache, so no retrieval happens
        std::fs::create_dir_all(temp.path().join(SHA256)).unwrap();
        std::fs::write(temp.path().join(SHA256).join("dependency.toml"), RECORD).unwrap();

        let contributor = Recording::default();
        let outcome = launch
            .dependency_layer(&dependency())
            .unwrap()
            .contribute(&contributor)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Contributed);
        assert_eq!(contributor.calls.load(Ordering::SeqCst), 1);
        assert!(contributor.saw_layer.load(Ordering::SeqCst));
        assert_eq!(
            contributor.artifact.lock().unwrap().clone(),
            Some(temp.path().join(SHA256).join("test-path"))
        );
        assert!(temp.path().join("test-id.toml").exists());
    }

    #[tokio::test]
    async fn does_not_contribute_cached_layer() {
        let temp = TempDir::new().unwrap();
        let launch = launch(temp.path(), Logger::sink());
        std::fs::write(temp.path().join("test-id.toml"), RECORD).unwrap();

        let contributor = Recording::default();
        let outcome = launch
            .dependency_layer(&dependency())
            .unwrap()
            .contribute(&contributor)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Reused);
        assert_eq!(contributor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn retrieval_failure_is_not_cached() {
        let temp = TempDir::new().unwrap();
        let launch = launch(temp.path(), Logger::sink());

        let contributor = Recording::default();
        let err = launch
            .dependency_layer(&dependency())
            .unwrap()
            .contribute(&contributor)
            .await
            .unwrap_err();

        assert!(matches!(err, StrataError::Retrieval { .. }));
        assert_eq!(contributor.calls.load(Ordering::SeqCst), 0);
        assert!(!temp.path().join("test-id.toml").exists());
    }

    #[tokio::test]
    async fn write_metadata_persists_and_logs() {
        let temp = TempDir::new().unwrap();
        let capture = Capture::default();
        let launch = launch(temp.path(), Logger::new(capture.clone(), false));

        launch
            .write_metadata(&LaunchMetadata::new(vec![
                Process::new("short", "test-command-1"),
                Process::new("a-very-long-type", "test-command-2"),
            ]))
            .await
            .unwrap();

        let written = LaunchMetadata::from_file(&launch.manifest_path()).await.unwrap();
        assert_eq!(written.processes.len(), 2);
        assert_eq!(written.processes[0].process_type, "short");
        assert_eq!(
            capture.contents(),
            "-----> Process types:\n       short:            test-command-1\n       a-very-long-type: test-command-2\n"
        );
    }

    #[tokio::test]
    async fn write_metadata_surfaces_write_error() {
        let temp = TempDir::new().unwrap();
        let missing_parent = temp.path().join("file");
        std::fs::write(&missing_parent, b"not a directory").unwrap();
        let launch = launch(&missing_parent, Logger::sink());

        let err = launch
            .write_metadata(&LaunchMetadata::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StrataError::Write { .. }));
    }
}
