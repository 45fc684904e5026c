//! Content-addressed layers
//!
//! A layer is a directory holding one dependency's materialized artifact
//! plus a metadata record describing the dependency it was built from.
//!
//! # Layer States
//!
//! | State | Metadata | Description |
//! |-------|----------|-------------|
//! | Absent | missing or stale | Contributor runs on next build |
//! | Cached | matches dependency | Contribution skipped |
//!
//! A failed contribution leaves the layer absent. Stale content on disk is
//! never trusted without a matching record.

pub mod directory;
pub mod engine;
pub mod metadata;

pub use directory::{KeyPolicy, LayerDirectory, DEPENDENCY_METADATA_FILE};
pub use engine::{ContributionEngine, Contributor, Outcome};
pub use metadata::{LayerMetadata, MetadataPolicy, MetadataStore};
