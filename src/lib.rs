// src/lib.rs
// =============================================================================
// dependency-tree: crawl a repository's go.mod and everything it requires.
//
// Modules:
// - config:   crawl and GitHub settings
// - error:    CrawlError
// - github:   identifier normalization and the GitHub manifest source
// - manifest: go.mod requirement scanning
// - graph:    the deduplicating graph store and the returned tree
// - crawl:    the fetch/parse pipeline and its orchestrator
//
// Typical use:
//
//   let source = GitHubSource::new(GitHubConfig::default())?;
//   let crawler = Crawler::new(Arc::new(source), CrawlConfig::default());
//   let report = crawler.crawl("https://github.com/gin-gonic/gin").await?;
// =============================================================================

pub mod config;
pub mod crawl;
pub mod error;
pub mod github;
pub mod graph;
pub mod manifest;
