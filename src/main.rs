//! Harvestman main entry point
//!
//! Command-line interface: runs one crawl session from a seed URL and
//! emits the result as JSON.

use anyhow::Context;
use clap::Parser;
use harvestman::config::ConfigStore;
use harvestman::crawler::{CancelToken, CrawlRequest, HttpFetcher, Orchestrator, OverrideTable};
use harvestman::output::{render_summary, write_json, write_json_to};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Harvestman: a bounded recursive web-content harvester
///
/// Crawls from a seed URL breadth-first, deduplicating URLs, restricting
/// domains, and enforcing depth and page budgets, then prints the
/// aggregated result as JSON.
#[derive(Parser, Debug)]
#[command(name = "harvestman")]
#[command(version)]
#[command(about = "A bounded recursive web-content harvester", long_about = None)]
struct Cli {
    /// Seed URL to crawl (https:// is assumed when no scheme is given)
    #[arg(value_name = "SEED_URL")]
    seed: String,

    /// Path to a TOML settings file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum link depth from the seed
    #[arg(long)]
    max_depth: Option<u32>,

    /// Maximum number of pages to fetch
    #[arg(long)]
    max_pages: Option<u32>,

    /// Apply the page budget per domain instead of per session
    #[arg(long)]
    per_domain_budget: bool,

    /// Restrict traversal to a domain and its subdomains (repeatable)
    #[arg(long = "restrict-domain", value_name = "DOMAIN")]
    restrict_domains: Vec<String>,

    /// Follow links to hosts outside the restriction list
    #[arg(long)]
    follow_external_links: bool,

    /// Exclude URLs matching a regex (repeatable, evaluated in order)
    #[arg(long = "exclude", value_name = "PATTERN")]
    exclude_patterns: Vec<String>,

    /// Treat URLs differing only in query string as distinct pages
    #[arg(long)]
    keep_query_strings: bool,

    /// Number of fetches dispatched concurrently
    #[arg(long, value_name = "N")]
    concurrency: Option<u32>,

    /// Record the parent/child link graph in the result
    #[arg(long)]
    link_graph: bool,

    /// User agent catalog key (chrome-windows, firefox, safari, ...)
    #[arg(long, value_name = "KEY")]
    user_agent: Option<String>,

    /// Write the JSON result to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Load settings (or defaults) and take the session's snapshot
    let store = match &cli.config {
        Some(path) => ConfigStore::open(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => ConfigStore::defaults(),
    };
    tracing::debug!("Configuration version: {}", &store.version()[..8]);
    let settings = store.load();

    let mut request = CrawlRequest::from_settings(&cli.seed, &settings);
    apply_cli_overrides(&cli, &mut request);

    let fetcher = HttpFetcher::new().context("Failed to build HTTP client")?;
    let mut orchestrator = Orchestrator::new(fetcher);
    if !settings.overrides.is_empty() {
        orchestrator =
            orchestrator.with_overrides(OverrideTable::from_entries(&settings.overrides)?);
    }

    // Ctrl-C aborts the session; the partial result is still written
    let cancel = CancelToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Cancellation requested, finishing in-flight fetches");
            signal_token.cancel();
        }
    });

    let result = orchestrator.crawl(&request, &cancel).await?;

    match &cli.output {
        Some(path) => {
            write_json_to(&result, path)?;
            if !cli.quiet {
                print!("{}", render_summary(&result));
            }
        }
        None => {
            println!("{}", write_json(&result)?);
        }
    }

    Ok(())
}

/// Applies command-line flags on top of the settings snapshot
fn apply_cli_overrides(cli: &Cli, request: &mut CrawlRequest) {
    let policy = &mut request.policy;

    if let Some(depth) = cli.max_depth {
        policy.max_depth = depth;
    }
    if let Some(pages) = cli.max_pages {
        policy.max_pages = pages;
    }
    if cli.per_domain_budget {
        policy.per_domain_budget = true;
    }
    if !cli.restrict_domains.is_empty() {
        policy.restrict_to_domains = cli.restrict_domains.clone();
    }
    if cli.follow_external_links {
        policy.follow_external_links = true;
    }
    if !cli.exclude_patterns.is_empty() {
        policy
            .exclude_url_patterns
            .extend(cli.exclude_patterns.iter().cloned());
    }
    if cli.keep_query_strings {
        policy.ignore_query_strings = false;
    }
    if let Some(n) = cli.concurrency {
        policy.max_concurrent_fetches = n;
    }
    if cli.link_graph {
        policy.record_link_graph = true;
    }
    if let Some(ua) = &cli.user_agent {
        request.render.user_agent = ua.clone();
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("harvestman=info,warn"),
            1 => EnvFilter::new("harvestman=debug,info"),
            2 => EnvFilter::new("harvestman=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}
