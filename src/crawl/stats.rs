// src/crawl/stats.rs
// =============================================================================
// Counters for the end-of-crawl summary.
//
// They describe the crawl, not the graph: a lost dependency shows up as an
// error count here and nowhere else.
//
// Tasks bump the atomic counters while the crawl runs; the orchestrator takes
// one snapshot at the end, once every task has finished.
//
// Rust concepts:
// - AtomicUsize: a counter many tasks can increment without a lock
// - Ordering::Relaxed: enough here, nobody reads a counter to decide
//   anything until the crawl is over
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

/// What happened during a crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    /// Manifests found and handed to the parser
    pub fetched: usize,
    /// Lookups that found no manifest
    pub not_found: usize,
    /// Identifiers that aren't GitHub repositories
    pub skipped: usize,
    /// Manifests scanned successfully
    pub parsed: usize,
    /// New modules queued for fetching
    pub discovered: usize,
    /// Failures reported to the error sink
    pub errors: usize,
}

// The live side of CrawlStats (errors are counted by the sink instead)
#[derive(Debug, Default)]
pub(crate) struct StatsCounter {
    fetched: AtomicUsize,
    not_found: AtomicUsize,
    skipped: AtomicUsize,
    parsed: AtomicUsize,
    discovered: AtomicUsize,
}

impl StatsCounter {
    pub fn fetched(&self) {
        self.fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn parsed(&self) {
        self.parsed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn discovered(&self) {
        self.discovered.fetch_add(1, Ordering::Relaxed);
    }

    // Copies the counters into a plain CrawlStats
    pub fn snapshot(&self, errors: usize) -> CrawlStats {
        CrawlStats {
            fetched: self.fetched.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            parsed: self.parsed.load(Ordering::Relaxed),
            discovered: self.discovered.load(Ordering::Relaxed),
            errors,
        }
    }
}
