//! CLI command implementations

pub mod config;
pub mod contribute;
pub mod launch;
pub mod layers;

pub use config::execute as config;
pub use contribute::execute as contribute;
pub use launch::execute as launch;
pub use layers::execute as layers;

use crate::cache::{Cache, FileRetriever};
use crate::config::Config;
use crate::launch::Launch;
use crate::layer::{ContributionEngine, MetadataStore};
use crate::logger::Logger;
use std::sync::Arc;

/// Wire up the cache and launch roots from configuration
pub(crate) fn build_launch(config: &Config) -> Launch {
    let logger = Logger::stdout(config.output.color.enabled());
    let engine = ContributionEngine::new(MetadataStore::new(config.metadata_policy()), logger);
    let cache = Cache::new(
        config.layers.cache_root(),
        Arc::new(FileRetriever),
        engine.clone(),
    );
    Launch::new(config.layers.launch_root(), cache, engine)
}
