// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing) on stderr
// 3. Run the crawl and print the tree
// 4. Exit with proper code (0 = success, 1 = some lookups failed, 2 = error)
// =============================================================================

mod cli; // src/cli.rs - command-line parsing

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};
use dependency_tree::crawl::{CrawlReport, Crawler};
use dependency_tree::github::GitHubSource;
use dependency_tree::graph::Artifact;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = tree built, no errors
//   Ok(1) = tree built, but some manifests couldn't be fetched or scanned
//   Err   = invalid address or setup failure
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Tree {
            repo_url,
            json,
            crawl,
            github,
        } => {
            let source = GitHubSource::new(github.to_config())
                .context("could not create the GitHub client")?;
            let crawler = Crawler::new(Arc::new(source), crawl.to_config());
            handle_tree(&crawler, &repo_url, json).await
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("DEPENDENCY_TREE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "dependency_tree=debug,info"
        } else {
            "dependency_tree=info,warn"
        })
    });

    // stderr, so `--json` output on stdout stays machine-readable
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

// Handles the 'tree' subcommand
async fn handle_tree(crawler: &Crawler, repo_url: &str, json: bool) -> Result<i32> {
    if !json {
        println!("🔍 Crawling dependencies of: {}", repo_url);
    }

    let report = crawler
        .crawl(repo_url)
        .await
        .with_context(|| format!("could not crawl {}", repo_url))?;

    print_report(&report, json)?;

    if report.stats.errors > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}

fn print_report(report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        // Tree, module count and stats in one document
        let json_output = serde_json::to_string_pretty(report)?;
        println!("{}", json_output);
        return Ok(());
    }

    println!();
    print_tree(&report.tree, "", true, true);
    println!();

    let stats = &report.stats;
    println!("📊 Summary:");
    println!("   📦 Modules: {}", report.modules);
    println!("   🌲 Tree entries: {} (depth {})", report.tree.size(), report.tree.depth());
    println!("   📄 Manifests parsed: {}", stats.parsed);
    println!("   ⏭️  Not on GitHub: {}", stats.skipped);
    println!("   🔎 No go.mod: {}", stats.not_found);
    println!("   ❌ Errors: {}", stats.errors);
    Ok(())
}

// Prints one artifact and its dependencies as an indented tree
//
//   github.com/user/repo
//   ├── github.com/a/b v1.0.0
//   │   └── golang.org/x/net v0.10.0
//   └── github.com/c/d v2.0.0
fn print_tree(artifact: &Artifact, prefix: &str, is_last: bool, is_root: bool) {
    let mut line = artifact.name.clone();
    if !artifact.version.is_empty() {
        line.push(' ');
        line.push_str(&artifact.version);
    }
    if artifact.cycle {
        line.push_str(" (cycle)");
    }

    let child_prefix = if is_root {
        println!("{}", line);
        String::new()
    } else {
        let branch = if is_last { "└── " } else { "├── " };
        println!("{}{}{}", prefix, branch, line);
        format!("{}{}", prefix, if is_last { "    " } else { "│   " })
    };

    let count = artifact.dependencies.len();
    for (i, dependency) in artifact.dependencies.iter().enumerate() {
        print_tree(dependency, &child_prefix, i + 1 == count, false);
    }
}
