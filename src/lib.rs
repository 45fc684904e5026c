//! Strata - buildpack layer contribution cache
//!
//! Contributes dependency artifacts to layers only when the dependency's
//! content hash changes, and writes the launch manifest of process types.

pub mod cache;
pub mod cli;
pub mod config;
pub mod dependency;
pub mod error;
pub mod launch;
pub mod layer;
pub mod logger;

pub use cache::Cache;
pub use dependency::{Dependency, Version};
pub use error::{StrataError, StrataResult};
pub use launch::{Launch, LaunchMetadata, Process};
pub use layer::{Contributor, LayerMetadata, Outcome};
pub use logger::Logger;
