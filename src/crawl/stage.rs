// src/crawl/stage.rs
// =============================================================================
// The loop shared by the fetch and parse stages.
//
// A stage:
// 1. Receives items from its input queue
// 2. Spawns one task per item (optionally limited by a semaphore)
// 3. Reaps finished tasks, reporting panics to the error sink
// 4. Stops when its idle window elapses AND the ledger says no work is
//    pending anywhere; otherwise it re-arms the window and keeps waiting
// 5. Waits for its remaining tasks, then returns, which drops its output
//    sender and lets the next stage see the queue close
//
// State machine (logged at trace level):
//
//   Idle --item--> Processing --tasks done--> Idle
//   Idle --window elapsed, ledger empty--> Draining --tasks reaped--> Stopped
//
// The idle timer is owned by this loop alone, so resets can't interleave
// with each other or with the timer firing.
//
// Rust concepts:
// - tokio::select!: wait on several futures, run the branch of the first
//   one that's ready
// - JoinSet: a group of spawned tasks we can await one at a time
// - Semaphore: a fixed number of permits; a task waits until it gets one
// - Generics with trait bounds (F: FnMut, Fut: Future): the same loop runs
//   both stages with different item types and handlers
// =============================================================================

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tokio::time::{self, Instant};
use tracing::{debug, trace};

use super::queue::{Queued, WorkLedger};
use super::sink::ErrorSender;
use crate::error::CrawlError;

/// Where a stage is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    Idle,
    Processing,
    Draining,
    Stopped,
}

/// How a stage is run
#[derive(Debug, Clone)]
pub struct StageSpec {
    pub name: &'static str,
    pub idle_window: Duration,
    pub max_concurrency: Option<usize>,
}

// Tracks the current state so only real transitions are logged
struct StageMonitor {
    name: &'static str,
    state: StageState,
}

impl StageMonitor {
    fn enter(&mut self, next: StageState) {
        if self.state != next {
            trace!(stage = self.name, from = ?self.state, to = ?next, "stage transition");
            self.state = next;
        }
    }
}

// Runs a stage until the crawl goes quiet
//
// Parameters:
//   spec:    name, idle window and concurrency cap
//   input:   the queue this stage consumes
//   ledger:  shared work accounting, consulted when the window elapses
//   errors:  where task panics are reported
//   handler: builds the future that processes one item
pub async fn run_stage<T, F, Fut>(
    spec: StageSpec,
    mut input: mpsc::Receiver<Queued<T>>,
    ledger: WorkLedger,
    errors: ErrorSender,
    mut handler: F,
) where
    T: Send + 'static,
    F: FnMut(Queued<T>) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    // None = no cap
    let limiter = spec.max_concurrency.map(|n| Arc::new(Semaphore::new(n)));

    // Every task this stage has spawned and not yet reaped
    let mut tasks = JoinSet::new();
    let mut monitor = StageMonitor {
        name: spec.name,
        state: StageState::Idle,
    };

    // Pinned so select! can poll it by reference and we can reset it
    let idle = time::sleep(spec.idle_window);
    tokio::pin!(idle);

    loop {
        tokio::select! {
            received = input.recv() => {
                let Some(queued) = received else {
                    debug!(stage = spec.name, "input queue closed");
                    break;
                };

                monitor.enter(StageState::Processing);
                let work = handler(queued);
                let limiter = limiter.clone();
                tasks.spawn(async move {
                    // The permit is taken inside the task so this loop
                    // never waits on it
                    let _permit = match limiter {
                        Some(semaphore) => semaphore.acquire_owned().await.ok(),
                        None => None,
                    };
                    work.await;
                });
                idle.as_mut().reset(Instant::now() + spec.idle_window);
            }

            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                report_panic(spec.name, joined, &errors);
                if tasks.is_empty() {
                    monitor.enter(StageState::Idle);
                }
                idle.as_mut().reset(Instant::now() + spec.idle_window);
            }

            () = &mut idle => {
                // Quiet for a whole window; only stop if nothing is pending
                // anywhere in the pipeline
                if ledger.is_quiescent() {
                    debug!(stage = spec.name, "idle window elapsed with no pending work");
                    break;
                }
                let outstanding = ledger.outstanding();
                trace!(
                    stage = spec.name,
                    identifiers = outstanding.identifiers,
                    manifests = outstanding.manifests,
                    "idle window elapsed, work still pending"
                );
                idle.as_mut().reset(Instant::now() + spec.idle_window);
            }
        }
    }

    // Tasks still running hold tickets and senders; wait for them
    monitor.enter(StageState::Draining);
    while let Some(joined) = tasks.join_next().await {
        report_panic(spec.name, joined, &errors);
    }

    monitor.enter(StageState::Stopped);
    debug!(stage = spec.name, "stage stopped");
}

// A panicking task becomes a TaskPanicked error instead of taking the
// stage down
fn report_panic(stage: &'static str, joined: Result<(), JoinError>, errors: &ErrorSender) {
    if let Err(err) = joined {
        let message = if err.is_panic() {
            panic_message(err.into_panic())
        } else {
            err.to_string()
        };
        errors.report(CrawlError::TaskPanicked { stage, message });
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::queue::{work_queue, WorkKind};
    use crate::crawl::sink::error_channel;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn spec(window_ms: u64) -> StageSpec {
        StageSpec {
            name: "test",
            idle_window: Duration::from_millis(window_ms),
            max_concurrency: None,
        }
    }

    #[tokio::test]
    async fn test_stage_stops_after_idle_window() {
        let ledger = WorkLedger::new();
        let (_tx, rx) = work_queue::<u32>(&ledger, WorkKind::Identifier, 1);
        let (errors, _sink) = error_channel();

        let started = Instant::now();
        run_stage(spec(30), rx, ledger, errors, |_item| async {}).await;
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_stage_waits_while_work_is_outstanding() {
        let ledger = WorkLedger::new();
        let (_tx, rx) = work_queue::<u32>(&ledger, WorkKind::Identifier, 1);
        let (errors, _sink) = error_channel();

        // Work registered somewhere else in the pipeline
        let ticket = ledger.ticket(WorkKind::Manifest);
        let stage = tokio::spawn(run_stage(spec(20), rx, ledger.clone(), errors, |_item| async {}));

        time::sleep(Duration::from_millis(100)).await;
        assert!(!stage.is_finished());

        drop(ticket);
        time::timeout(Duration::from_secs(2), stage).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_stage_processes_every_item() {
        let ledger = WorkLedger::new();
        let (tx, rx) = work_queue::<u32>(&ledger, WorkKind::Identifier, 1);
        let (errors, _sink) = error_channel();
        let seen = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&seen);
        let stage = tokio::spawn(run_stage(
            StageSpec {
                max_concurrency: Some(2),
                ..spec(30)
            },
            rx,
            ledger,
            errors,
            move |queued| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(*queued.item() as usize, Ordering::SeqCst);
                }
            },
        ));

        for n in 1..=10 {
            tx.send(n).await.unwrap();
        }
        drop(tx);

        stage.await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 55);
    }

    #[tokio::test]
    async fn test_panicking_task_is_reported() {
        let ledger = WorkLedger::new();
        let (tx, rx) = work_queue::<u32>(&ledger, WorkKind::Identifier, 1);
        let (errors, sink) = error_channel();
        let sink = tokio::spawn(sink.run());

        tx.send(1).await.unwrap();
        drop(tx);

        run_stage(spec(20), rx, ledger.clone(), errors, |_queued| async {
            panic!("bad item");
        })
        .await;

        assert!(ledger.is_quiescent());
        assert_eq!(sink.await.unwrap(), 1);
    }
}
