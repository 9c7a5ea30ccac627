// src/crawl/sink.rs
// =============================================================================
// The error sink: where failed fetches and scans end up.
//
// It logs every error and counts them. It doesn't retry, doesn't stop the
// crawl, and never touches the graph.
//
// Every stage and every task holds an ErrorSender clone. The sink keeps
// running until the last clone is dropped, which makes it the last part of
// the pipeline to finish.
// =============================================================================

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::CrawlError;

/// Handle used by stages to report a failure
#[derive(Debug, Clone)]
pub struct ErrorSender {
    tx: mpsc::UnboundedSender<CrawlError>,
}

impl ErrorSender {
    // Never blocks: a slow sink must not hold up fetches
    pub fn report(&self, error: CrawlError) {
        if let Err(err) = self.tx.send(error) {
            // Only possible once the sink is gone, i.e. after shutdown
            warn!(error = %err.0, "error reported after the error sink stopped");
        }
    }
}

/// Receiving end of the error queue
#[derive(Debug)]
pub struct ErrorSink {
    rx: mpsc::UnboundedReceiver<CrawlError>,
}

// Unbounded: reporting an error must never wait on the sink
pub fn error_channel() -> (ErrorSender, ErrorSink) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ErrorSender { tx }, ErrorSink { rx })
}

impl ErrorSink {
    /// Drains the queue until every sender is dropped
    ///
    /// Returns the number of errors seen
    pub async fn run(mut self) -> usize {
        let mut count = 0;

        while let Some(error) = self.rx.recv().await {
            count += 1;
            warn!(%error, "crawl error");
        }

        debug!(count, "error sink stopped");
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sink_counts_until_all_senders_drop() {
        let (sender, sink) = error_channel();
        let other = sender.clone();
        let handle = tokio::spawn(sink.run());

        sender.report(CrawlError::transport("a/b", "connection refused"));
        other.report(CrawlError::scan("github.com/a/b", "line too long"));
        drop(sender);
        other.report(CrawlError::invalid_request("late but still open"));
        drop(other);

        assert_eq!(handle.await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_report_after_sink_stopped_does_not_panic() {
        let (sender, sink) = error_channel();
        drop(sink);
        sender.report(CrawlError::transport("a/b", "timeout"));
    }
}
