// src/crawl/queue.rs
// =============================================================================
// Work queues with in-flight accounting.
//
// The crawl feeds itself: the parse stage pushes newly discovered modules
// back into the queue the fetch stage reads from. Nobody knows up front how
// much work there will be, so "the queue is empty right now" says nothing
// about whether more work is coming.
//
// The ledger answers that question exactly:
// 1. Every item sent into a queue carries a Ticket (counter + 1)
// 2. The ticket is released (counter - 1) when the item has been fully
//    handled, i.e. when the task that processed it drops it
// 3. A task that produces downstream work sends it (new ticket) BEFORE it
//    drops its own ticket
//
// So both counters are zero only when nothing is queued, nothing is being
// processed, and nothing can still be sent. That state can't be left again,
// which makes it safe for a stage to close its output once it sees it.
//
// Rust concepts:
// - RAII: a Ticket releases itself in Drop, even if the task panics
// - Arc<Mutex<T>>: one counter pair shared by every queue and task
// =============================================================================

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

/// Which queue an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkKind {
    Identifier,
    Manifest,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Outstanding {
    pub identifiers: usize,
    pub manifests: usize,
}

impl Outstanding {
    fn slot(&mut self, kind: WorkKind) -> &mut usize {
        match kind {
            WorkKind::Identifier => &mut self.identifiers,
            WorkKind::Manifest => &mut self.manifests,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers == 0 && self.manifests == 0
    }
}

/// Shared count of queued + in-flight work, per queue
//
// Both counters sit behind the same lock: a stage must see them at the same
// instant, otherwise a task could move work from one queue to the other
// between two reads and fool the check.
#[derive(Debug, Clone, Default)]
pub struct WorkLedger {
    counts: Arc<Mutex<Outstanding>>,
}

impl WorkLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Outstanding> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers one unit of work
    pub fn ticket(&self, kind: WorkKind) -> Ticket {
        *self.lock().slot(kind) += 1;
        Ticket {
            ledger: self.clone(),
            kind,
        }
    }

    pub fn outstanding(&self) -> Outstanding {
        *self.lock()
    }

    /// True when no work is queued or in flight anywhere
    pub fn is_quiescent(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Proof that one unit of work is still pending
#[derive(Debug)]
pub struct Ticket {
    ledger: WorkLedger,
    kind: WorkKind,
}

impl Drop for Ticket {
    fn drop(&mut self) {
        let mut counts = self.ledger.lock();
        let slot = counts.slot(self.kind);
        *slot = slot.saturating_sub(1);
    }
}

/// An item travelling through a queue, with its ticket attached
#[derive(Debug)]
pub struct Queued<T> {
    item: T,
    _ticket: Ticket,
}

impl<T> Queued<T> {
    pub fn item(&self) -> &T {
        &self.item
    }
}

/// The sending half of a work queue
#[derive(Debug)]
pub struct WorkSender<T> {
    tx: mpsc::Sender<Queued<T>>,
    ledger: WorkLedger,
    kind: WorkKind,
}

// Derived Clone would require T: Clone
impl<T> Clone for WorkSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            ledger: self.ledger.clone(),
            kind: self.kind,
        }
    }
}

impl<T> WorkSender<T> {
    // Sends an item, registering it in the ledger first
    //
    // Waits while the queue is full. Returns the item back if the receiving
    // stage is gone; the ticket is released either way.
    pub async fn send(&self, item: T) -> Result<(), T> {
        let queued = Queued {
            item,
            _ticket: self.ledger.ticket(self.kind),
        };

        self.tx.send(queued).await.map_err(|err| err.0.item)
    }
}

/// Creates a bounded queue whose items are tracked by `ledger`
pub fn work_queue<T>(
    ledger: &WorkLedger,
    kind: WorkKind,
    capacity: usize,
) -> (WorkSender<T>, mpsc::Receiver<Queued<T>>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let sender = WorkSender {
        tx,
        ledger: ledger.clone(),
        kind,
    };
    (sender, rx)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why not just check if the channel is empty?
//    - An item can be "in between": received by the fetch stage, and its
//      go.mod not yet sent to the parse stage
//    - Both channels look empty at that moment, yet work is still going on
//    - The ledger counts items until they are finished, not until received
//
// 2. Why does Queued hold the Ticket?
//    - Whoever owns the item owns its ticket
//    - When the task processing it returns, the item is dropped, and
//      Drop for Ticket decrements the counter automatically
//
// 3. What is err.0 in the send error?
//    - tokio's SendError gives back the value that couldn't be sent
//    - We hand the item back and let its ticket drop
// -----------------------------------------------------------------------------
