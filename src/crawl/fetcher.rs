// src/crawl/fetcher.rs
// =============================================================================
// The fetch stage: module identifier in, go.mod text out.
//
// For each identifier:
// - not a GitHub repository      -> skipped quietly
// - lookup failed                -> error sink, item dropped (no retry)
// - repository has no go.mod     -> nothing to do
// - go.mod found                 -> sent to the parse stage
// =============================================================================

use std::sync::Arc;

use tracing::{debug, error, trace};

use super::queue::{Queued, WorkLedger, WorkSender};
use super::sink::ErrorSender;
use super::stage::{run_stage, StageSpec};
use super::stats::StatsCounter;
use crate::github::{normalize, ManifestSource};
use crate::graph::ArtifactId;

/// A module waiting to be fetched
#[derive(Debug, Clone)]
pub struct Target {
    pub node: ArtifactId,
    pub name: String,
}

/// A go.mod and the module that declared it
#[derive(Debug, Clone)]
pub struct Manifest {
    pub parent: ArtifactId,
    pub parent_name: String,
    pub content: String,
}

/// Everything a fetch task needs
pub(crate) struct FetchContext {
    pub source: Arc<dyn ManifestSource>,
    pub manifests: WorkSender<Manifest>,
    pub errors: ErrorSender,
    pub stats: Arc<StatsCounter>,
}

// Runs the fetch stage until the crawl goes quiet
pub(crate) async fn run(
    context: FetchContext,
    input: tokio::sync::mpsc::Receiver<Queued<Target>>,
    ledger: WorkLedger,
    spec: StageSpec,
) {
    let errors = context.errors.clone();

    // Shared by every fetch task; cloning the Arc is just a counter bump
    let context = Arc::new(context);

    run_stage(spec, input, ledger, errors, move |queued| {
        fetch_one(Arc::clone(&context), queued)
    })
    .await;
}

// `queued` is held until the end so its ticket outlives the manifest send
async fn fetch_one(context: Arc<FetchContext>, queued: Queued<Target>) {
    let target = queued.item();

    // Vanity paths (golang.org/x/..., gopkg.in/...) can't be looked up
    let Some(repo) = normalize(&target.name) else {
        trace!(module = %target.name, "not a GitHub repository, skipping");
        context.stats.skipped();
        return;
    };

    let content = match context.source.fetch_manifest(&repo).await {
        // An empty go.mod is treated like a missing one
        Ok(Some(content)) if !content.trim().is_empty() => content,
        Ok(_) => {
            debug!(module = %target.name, "no manifest");
            context.stats.not_found();
            return;
        }
        Err(err) => {
            // No retry; the module stays in the graph as a leaf
            context.errors.report(err);
            return;
        }
    };

    context.stats.fetched();
    debug!(module = %target.name, bytes = content.len(), "fetched manifest");

    let manifest = Manifest {
        parent: target.node,
        parent_name: target.name.clone(),
        content,
    };
    if context.manifests.send(manifest).await.is_err() {
        error!(module = %target.name, "parse stage stopped before all manifests were sent");
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES
// -----------------------------------------------------------------------------
// 1. Why `let Some(repo) = ... else { ... }`?
//    - It's "let-else": bind the value if the pattern matches, otherwise run
//      the else block, which has to leave the function (here: `return`)
//    - It keeps the happy path unindented
//
// 2. Why is `context` an Arc<FetchContext>?
//    - Every fetch runs in its own tokio task, and tasks must own their data
//    - Arc lets all of them share one context without copying it
//
// 3. What is `dyn ManifestSource`?
//    - A trait object: "some type that implements ManifestSource"
//    - The real crawl passes GitHubSource, the tests pass an in-memory fake
// -----------------------------------------------------------------------------
