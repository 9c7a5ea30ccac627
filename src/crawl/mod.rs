// src/crawl/mod.rs
// =============================================================================
// This module runs the dependency crawl.
//
// Pipeline:
// - fetcher: looks up go.mod for each queued module
// - parser:  reads requirements, updates the graph, queues new modules
// - sink:    logs whatever went wrong along the way
// - orchestrator: seeds the root, starts everything, waits for the end
//
// Supporting pieces:
// - queue: bounded queues whose items are tracked in a work ledger
// - stage: the idle-window loop both stages run
// - stats: counters for the summary
//
// Rust concepts:
// - tokio tasks: one per item being fetched or parsed
// - Channels (mpsc): how stages hand work to each other
// =============================================================================

mod fetcher;
mod orchestrator;
mod parser;
mod queue;
mod sink;
mod stage;
mod stats;

#[cfg(test)]
mod testing;

// Re-export the crawl entry point and its results
pub use fetcher::{Manifest, Target};
pub use orchestrator::{CrawlGraph, CrawlReport, Crawler};
pub use stats::CrawlStats;
