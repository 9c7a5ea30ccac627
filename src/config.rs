// src/config.rs
// =============================================================================
// Runtime configuration for a crawl.
//
// Two groups of settings:
// - CrawlConfig:  how the pipeline behaves (idle windows, concurrency cap)
// - GitHubConfig: where and how manifests are looked up
//
// Both have sensible defaults, so `CrawlConfig::default()` is all a caller
// needs. The CLI fills them from flags / DEPENDENCY_TREE_* variables.
// =============================================================================

use std::time::Duration;

/// Default idle window for both stages
pub const DEFAULT_IDLE_WINDOW: Duration = Duration::from_secs(5);

/// Pipeline settings
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// How long the fetch stage waits without activity before it checks
    /// whether the crawl has gone quiet
    pub fetch_idle: Duration,
    /// Same, for the parse stage (an independent timer)
    pub parse_idle: Duration,
    /// Maximum number of concurrent lookups / scans per stage.
    /// `None` means one task per item with no cap.
    pub max_concurrency: Option<usize>,
    /// Capacity of the identifier and manifest queues.
    /// Small on purpose: a full queue makes producers wait.
    pub queue_capacity: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            fetch_idle: DEFAULT_IDLE_WINDOW,
            parse_idle: DEFAULT_IDLE_WINDOW,
            max_concurrency: None,
            queue_capacity: 1,
        }
    }
}

impl CrawlConfig {
    /// Uses the same idle window for both stages
    pub fn with_idle_window(mut self, window: Duration) -> Self {
        self.fetch_idle = window;
        self.parse_idle = window;
        self
    }

    pub fn with_max_concurrency(mut self, limit: Option<usize>) -> Self {
        // A cap of zero would never admit any work
        self.max_concurrency = limit.filter(|n| *n > 0);
        self
    }
}

/// Settings for the GitHub contents API client
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// Base URL of the API (overridable for GitHub Enterprise or tests)
    pub api_base: String,
    /// Path of the manifest inside a repository
    pub manifest_path: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// GitHub rejects requests without a User-Agent
    pub user_agent: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            manifest_path: "go.mod".to_string(),
            request_timeout: Duration::from_secs(10),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CrawlConfig::default();
        assert_eq!(config.fetch_idle, Duration::from_secs(5));
        assert_eq!(config.parse_idle, Duration::from_secs(5));
        assert!(config.max_concurrency.is_none());
        assert_eq!(config.queue_capacity, 1);
    }

    #[test]
    fn test_zero_concurrency_means_no_cap() {
        let config = CrawlConfig::default().with_max_concurrency(Some(0));
        assert!(config.max_concurrency.is_none());

        let config = CrawlConfig::default().with_max_concurrency(Some(4));
        assert_eq!(config.max_concurrency, Some(4));
    }

    #[test]
    fn test_github_defaults() {
        let config = GitHubConfig::default();
        assert_eq!(config.api_base, "https://api.github.com");
        assert_eq!(config.manifest_path, "go.mod");
        assert!(config.user_agent.starts_with("dependency-tree/"));
    }
}
