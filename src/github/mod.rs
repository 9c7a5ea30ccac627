// src/github/mod.rs
// =============================================================================
// This module is the crawler's only view of the outside world: looking up a
// repository's manifest.
//
// Currently implements:
// - Normalizing identifiers to owner/repo (address.rs)
// - Fetching go.mod through the GitHub contents API (fetch.rs)
//
// The pipeline talks to a ManifestSource trait object rather than to GitHub
// directly, so tests can plug in an in-memory source.
// =============================================================================

mod address;
mod fetch;

use async_trait::async_trait;

use crate::error::CrawlError;

pub use address::{normalize, validate_seed, RepoRef};
pub use fetch::GitHubSource;

/// Where manifests come from
///
/// Three outcomes:
/// - `Ok(Some(text))`: the repository has a manifest
/// - `Ok(None)`: it doesn't (not an error)
/// - `Err(CrawlError::Transport { .. })`: the lookup itself failed
#[async_trait]
pub trait ManifestSource: Send + Sync {
    async fn fetch_manifest(&self, repo: &RepoRef) -> Result<Option<String>, CrawlError>;
}
