// src/error.rs
// =============================================================================
// Error types for the crawl pipeline.
//
// Every failure that happens *inside* a crawl is local: it is sent to the
// error sink, logged, and the item that caused it is dropped. Only a bad
// seed address (InvalidRequest) stops a crawl, and it does so before any
// stage has started.
//
// "Not found" is deliberately absent here. A repository without a go.mod is
// a normal outcome and is modeled as `Ok(None)` by the manifest source.
// =============================================================================

use thiserror::Error;

/// Errors raised while crawling a dependency tree
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The manifest lookup could not be completed (network failure,
    /// unexpected HTTP status, unparsable envelope)
    #[error("transport failure for {address}: {message}")]
    Transport { address: String, message: String },

    /// A manifest could not be tokenized
    #[error("could not scan manifest of {parent}: {message}")]
    Scan { parent: String, message: String },

    /// The seed address was empty or malformed
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A per-item task panicked before it could finish
    #[error("{stage} task panicked: {message}")]
    TaskPanicked { stage: &'static str, message: String },
}

impl CrawlError {
    pub fn transport(address: impl Into<String>, message: impl ToString) -> Self {
        Self::Transport {
            address: address.into(),
            message: message.to_string(),
        }
    }

    pub fn scan(parent: impl Into<String>, message: impl ToString) -> Self {
        Self::Scan {
            parent: parent.into(),
            message: message.to_string(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }
}
