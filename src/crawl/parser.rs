// src/crawl/parser.rs
// =============================================================================
// The parse stage: go.mod text in, graph edges and new identifiers out.
//
// For each requirement in a manifest:
// 1. get_or_create the module's node
// 2. add it to the declaring module's dependency list
// 3. if the node is new, queue the module for fetching
//
// Step 3 only happens once per module, so a module that is required by many
// others (or that requires one of its own ancestors) is fetched once.
// =============================================================================

use std::sync::Arc;

use tracing::{debug, error};

use super::fetcher::{Manifest, Target};
use super::queue::{Queued, WorkLedger, WorkSender};
use super::sink::ErrorSender;
use super::stage::{run_stage, StageSpec};
use super::stats::StatsCounter;
use crate::error::CrawlError;
use crate::graph::GraphStore;
use crate::manifest::parse_requirements;

/// Everything a parse task needs
pub(crate) struct ParseContext {
    pub graph: Arc<GraphStore>,
    pub identifiers: WorkSender<Target>,
    pub errors: ErrorSender,
    pub stats: Arc<StatsCounter>,
}

// Runs the parse stage until the crawl goes quiet
pub(crate) async fn run(
    context: ParseContext,
    input: tokio::sync::mpsc::Receiver<Queued<Manifest>>,
    ledger: WorkLedger,
    spec: StageSpec,
) {
    let errors = context.errors.clone();
    let context = Arc::new(context);

    run_stage(spec, input, ledger, errors, move |queued| {
        parse_one(Arc::clone(&context), queued)
    })
    .await;
}

// Like fetch_one, `queued` (and its ticket) lives until every new module
// has been queued
async fn parse_one(context: Arc<ParseContext>, queued: Queued<Manifest>) {
    let manifest = queued.item();

    // A scan failure loses this manifest only; the parent stays a leaf

    let requirements = match parse_requirements(&manifest.content) {
        Ok(requirements) => requirements,
        Err(err) => {
            context
                .errors
                .report(CrawlError::scan(manifest.parent_name.clone(), err));
            return;
        }
    };

    let mut discovered = 0;
    for requirement in &requirements {
        // The edge is recorded whether or not the node is new
        let (child, created) = context
            .graph
            .get_or_create(&requirement.name, &requirement.version);
        context.graph.append_dependency(manifest.parent, child);

        // Already known: someone else queued (or is queueing) it
        if !created || requirement.name.is_empty() {
            continue;
        }

        discovered += 1;
        context.stats.discovered();
        let target = Target {
            node: child,
            name: requirement.name.clone(),
        };
        if context.identifiers.send(target).await.is_err() {
            error!(module = %requirement.name, "fetch stage stopped before all modules were queued");
        }
    }

    context.stats.parsed();
    debug!(
        module = %manifest.parent_name,
        requirements = requirements.len(),
        discovered,
        "parsed manifest"
    );
}
