// src/crawl/testing.rs
// =============================================================================
// An in-memory ManifestSource for pipeline tests (compiled only for tests).
//
// Repositories are keyed by "owner/repo"; anything not registered is
// "not found". Each repository can also be set up to answer slowly, fail,
// or panic, and every lookup is counted so tests can check that a module
// was fetched exactly once.
// =============================================================================

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::CrawlError;
use crate::github::{ManifestSource, RepoRef};

#[derive(Debug, Clone)]
enum Reply {
    Manifest(String),
    Slow(Duration, String),
    Failure,
    Panic,
}

#[derive(Debug, Default)]
pub struct StaticSource {
    replies: HashMap<String, Reply>,
    calls: Mutex<HashMap<String, usize>>,
}

impl StaticSource {
    pub fn with_manifest(mut self, repo: &str, content: &str) -> Self {
        self.replies
            .insert(repo.to_string(), Reply::Manifest(content.to_string()));
        self
    }

    pub fn with_slow_manifest(mut self, repo: &str, delay: Duration, content: &str) -> Self {
        self.replies
            .insert(repo.to_string(), Reply::Slow(delay, content.to_string()));
        self
    }

    pub fn with_failure(mut self, repo: &str) -> Self {
        self.replies.insert(repo.to_string(), Reply::Failure);
        self
    }

    pub fn with_panic(mut self, repo: &str) -> Self {
        self.replies.insert(repo.to_string(), Reply::Panic);
        self
    }

    /// How many times `repo` was looked up
    pub fn calls(&self, repo: &str) -> usize {
        self.calls.lock().unwrap().get(repo).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl ManifestSource for StaticSource {
    async fn fetch_manifest(&self, repo: &RepoRef) -> Result<Option<String>, CrawlError> {
        let key = repo.to_string();
        *self.calls.lock().unwrap().entry(key.clone()).or_default() += 1;

        match self.replies.get(&key).cloned() {
            None => Ok(None),
            Some(Reply::Manifest(content)) => Ok(Some(content)),
            Some(Reply::Slow(delay, content)) => {
                tokio::time::sleep(delay).await;
                Ok(Some(content))
            }
            Some(Reply::Failure) => Err(CrawlError::transport(key, "connection refused")),
            Some(Reply::Panic) => panic!("lookup of {} blew up", key),
        }
    }
}
