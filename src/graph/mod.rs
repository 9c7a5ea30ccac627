// src/graph/mod.rs
// =============================================================================
// This module holds the dependency graph.
//
// Submodules:
// - store: the shared, deduplicating graph the pipeline writes into
// - tree:  the owned tree returned to the caller once the crawl is over
// =============================================================================

mod store;
mod tree;

pub use store::{ArtifactId, ArtifactNode, GraphStore};
pub use tree::Artifact;
