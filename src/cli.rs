// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Every option can also come from the environment (DEPENDENCY_TREE_*), which
// is handy in CI where the same settings are reused across runs.
// =============================================================================

use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use dependency_tree::config::{CrawlConfig, GitHubConfig};

#[derive(Parser, Debug)]
#[command(
    name = "dependency-tree",
    version,
    about = "Crawl a GitHub repository's go.mod and build its dependency tree",
    long_about = "dependency-tree reads a repository's go.mod, follows every dependency that lives \
                  on GitHub, and prints the resulting tree. Modules hosted elsewhere are listed \
                  but not expanded."
)]
pub struct Cli {
    /// Log pipeline activity at debug level (overridden by DEPENDENCY_TREE_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the dependency tree of a repository
    ///
    /// Example: dependency-tree tree https://github.com/gin-gonic/gin
    Tree {
        /// Repository address: https://github.com/owner/repo or github.com/owner/repo
        repo_url: String,

        /// Output the tree as JSON instead of an indented list
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        crawl: CrawlArgs,

        #[command(flatten)]
        github: GitHubArgs,
    },
}

/// Pipeline tuning
#[derive(Args, Debug)]
pub struct CrawlArgs {
    /// Idle window of the fetch stage, in milliseconds
    #[arg(long, env = "DEPENDENCY_TREE_FETCH_IDLE_MS", default_value_t = 5000)]
    pub fetch_idle_ms: u64,

    /// Idle window of the parse stage, in milliseconds
    #[arg(long, env = "DEPENDENCY_TREE_PARSE_IDLE_MS", default_value_t = 5000)]
    pub parse_idle_ms: u64,

    /// Maximum concurrent lookups (and scans); unlimited when omitted
    #[arg(long, env = "DEPENDENCY_TREE_MAX_CONCURRENCY")]
    pub max_concurrency: Option<usize>,
}

/// Where manifests are fetched from
#[derive(Args, Debug)]
pub struct GitHubArgs {
    /// GitHub API base URL
    #[arg(long, env = "DEPENDENCY_TREE_API_BASE", default_value = "https://api.github.com")]
    pub api_base: String,

    /// Manifest path inside each repository
    #[arg(long, env = "DEPENDENCY_TREE_MANIFEST_PATH", default_value = "go.mod")]
    pub manifest_path: String,

    /// Per-request timeout, in seconds
    #[arg(long, env = "DEPENDENCY_TREE_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,
}

impl CrawlArgs {
    pub fn to_config(&self) -> CrawlConfig {
        CrawlConfig {
            fetch_idle: Duration::from_millis(self.fetch_idle_ms),
            parse_idle: Duration::from_millis(self.parse_idle_ms),
            ..CrawlConfig::default()
        }
        .with_max_concurrency(self.max_concurrency)
    }
}

impl GitHubArgs {
    pub fn to_config(&self) -> GitHubConfig {
        GitHubConfig {
            api_base: self.api_base.clone(),
            manifest_path: self.manifest_path.clone(),
            request_timeout: Duration::from_secs(self.timeout_secs),
            ..GitHubConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_tree_defaults() {
        let cli = Cli::try_parse_from(["dependency-tree", "tree", "github.com/user/repo"]).unwrap();
        let Commands::Tree {
            repo_url,
            json,
            crawl,
            github,
        } = cli.command;

        assert_eq!(repo_url, "github.com/user/repo");
        assert!(!json);

        let config = crawl.to_config();
        assert_eq!(config.fetch_idle, Duration::from_secs(5));
        assert_eq!(config.parse_idle, Duration::from_secs(5));
        assert!(config.max_concurrency.is_none());

        let github = github.to_config();
        assert_eq!(github.api_base, "https://api.github.com");
        assert_eq!(github.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_tree_overrides() {
        let cli = Cli::try_parse_from([
            "dependency-tree",
            "-v",
            "tree",
            "https://github.com/user/repo",
            "--json",
            "--fetch-idle-ms",
            "250",
            "--parse-idle-ms",
            "400",
            "--max-concurrency",
            "8",
        ])
        .unwrap();
        assert!(cli.verbose);

        let Commands::Tree { json, crawl, .. } = cli.command;
        assert!(json);

        let config = crawl.to_config();
        assert_eq!(config.fetch_idle, Duration::from_millis(250));
        assert_eq!(config.parse_idle, Duration::from_millis(400));
        assert_eq!(config.max_concurrency, Some(8));
    }
}
