// src/crawl/orchestrator.rs
// =============================================================================
// Runs one crawl from a seed address to a finished dependency tree.
//
// How it works:
// 1. Validate the seed (a bad address is rejected before anything starts)
// 2. Create a fresh graph store and insert the root
// 3. Queue the root for fetching
// 4. Start the fetch stage, the parse stage and the error sink
// 5. Wait for all three; the error sink finishes last
// 6. Expand the graph into a tree
//
// The graph store belongs to this one crawl and is dropped with its result.
//
//   seed -> [identifiers] -> fetch -> [manifests] -> parse -> graph
//                 ^                                   |
//                 +-------- new modules --------------+
// =============================================================================

use std::sync::Arc;

use futures::future::join3;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{error, info};

use super::fetcher::{self, FetchContext, Target};
use super::parser::{self, ParseContext};
use super::queue::{work_queue, WorkKind, WorkLedger};
use super::sink::error_channel;
use super::stage::StageSpec;
use super::stats::{CrawlStats, StatsCounter};
use crate::config::CrawlConfig;
use crate::error::CrawlError;
use crate::github::{normalize, validate_seed, ManifestSource};
use crate::graph::{Artifact, ArtifactId, GraphStore};

/// The raw result of a crawl: the graph itself plus its root
#[derive(Debug)]
pub struct CrawlGraph {
    pub graph: Arc<GraphStore>,
    pub root: ArtifactId,
    pub stats: CrawlStats,
}

/// The result handed back to callers (and printed by `--json`)
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub tree: Artifact,
    /// Distinct modules in the graph (the tree may repeat shared ones)
    pub modules: usize,
    pub stats: CrawlStats,
}

/// Crawls dependency trees using a manifest source
pub struct Crawler {
    source: Arc<dyn ManifestSource>,
    config: CrawlConfig,
}

impl Crawler {
    pub fn new(source: Arc<dyn ManifestSource>, config: CrawlConfig) -> Self {
        Self { source, config }
    }

    // Crawls from `seed` and returns the expanded tree
    //
    // Returns: Err(InvalidRequest) for a bad seed; every other failure is
    // logged by the error sink and only shows up in the stats
    pub async fn crawl(&self, seed: &str) -> Result<CrawlReport, CrawlError> {
        let CrawlGraph { graph, root, stats } = self.crawl_graph(seed).await?;

        let tree = graph
            .tree(root)
            .ok_or_else(|| CrawlError::invalid_request("root missing from graph"))?;

        Ok(CrawlReport {
            tree,
            modules: graph.len(),
            stats,
        })
    }

    /// Crawls from `seed` and returns the graph without expanding it
    pub async fn crawl_graph(&self, seed: &str) -> Result<CrawlGraph, CrawlError> {
        let seed = validate_seed(seed)?;
        let started = Instant::now();
        info!(%seed, "starting crawl");

        let graph = Arc::new(GraphStore::new());
        let root = graph.insert_root(&seed);

        // A dependency pointing back at the root is usually spelled as a
        // module path, not as the seed URL
        if let Some(repo) = normalize(&seed) {
            graph.alias(&repo.module_path(), root);
        }

        // Queues and the ledger that tracks what's in them
        let ledger = WorkLedger::new();
        let capacity = self.config.queue_capacity;
        let (identifiers, identifier_rx) = work_queue::<Target>(&ledger, WorkKind::Identifier, capacity);
        let (manifests, manifest_rx) = work_queue(&ledger, WorkKind::Manifest, capacity);
        let (errors, sink) = error_channel();
        let counter = Arc::new(StatsCounter::default());

        // Seeded before any stage starts, so no idle window can see an
        // empty ledger before the root is accounted for
        let root_target = Target {
            node: root,
            name: seed.clone(),
        };
        if identifiers.send(root_target).await.is_err() {
            error!("identifier queue closed before the crawl started");
        }

        let fetch = tokio::spawn(fetcher::run(
            FetchContext {
                source: Arc::clone(&self.source),
                manifests,
                errors: errors.clone(),
                stats: Arc::clone(&counter),
            },
            identifier_rx,
            ledger.clone(),
            StageSpec {
                name: "fetch",
                idle_window: self.config.fetch_idle,
                max_concurrency: self.config.max_concurrency,
            },
        ));

        // The parse stage owns the only remaining identifier sender
        let parse = tokio::spawn(parser::run(
            ParseContext {
                graph: Arc::clone(&graph),
                identifiers,
                errors: errors.clone(),
                stats: Arc::clone(&counter),
            },
            manifest_rx,
            ledger.clone(),
            StageSpec {
                name: "parse",
                idle_window: self.config.parse_idle,
                max_concurrency: self.config.max_concurrency,
            },
        ));

        // The sink stops once both stages (and their tasks) drop their senders
        drop(errors);
        let sink = tokio::spawn(sink.run());

        // A JoinError here means the stage loop itself panicked
        let (fetch, parse, sink) = join3(fetch, parse, sink).await;
        for (stage, joined) in [("fetch", fetch), ("parse", parse)] {
            if let Err(err) = joined {
                error!(stage, error = %err, "stage task failed");
            }
        }
        let error_count = sink.unwrap_or_else(|err| {
            error!(error = %err, "error sink task failed");
            0
        });

        let stats = counter.snapshot(error_count);
        info!(
            modules = graph.len(),
            fetched = stats.fetched,
            errors = stats.errors,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "crawl finished"
        );

        Ok(CrawlGraph { graph, root, stats })
    }
}
