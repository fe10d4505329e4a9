//! Site-Sweep main entry point
//!
//! This is the command-line interface for the Site-Sweep single-host crawler.

use anyhow::Context;
use clap::Parser;
use site_sweep::config::{load_config_with_hash, validate, Config, FullFrontierPolicy};
use site_sweep::crawler::Coordinator;
use site_sweep::output::print_statistics;
use site_sweep::url::{normalize_seed, MediaFilter, ScopeDomain};
use std::path::PathBuf;
use tokio::signal;
use tracing_subscriber::EnvFilter;

/// Site-Sweep: crawl every page of one host
///
/// Starting from a seed URL, Site-Sweep follows links that stay on the seed's
/// host, skipping media files, and prints each newly discovered page as it
/// goes. Ctrl+C stops the crawl and still prints the statistics.
#[derive(Parser, Debug)]
#[command(name = "site-sweep")]
#[command(version = "1.0.0")]
#[command(about = "A concurrent single-host web crawler", long_about = None)]
struct Cli {
    /// Absolute http(s) URL to start crawling from
    #[arg(value_name = "SEED")]
    seed: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(long)]
    workers: Option<usize>,

    /// Maximum number of queued URLs
    #[arg(long)]
    frontier_capacity: Option<usize>,

    /// What to do when the frontier is full (revert or block)
    #[arg(long)]
    policy: Option<FullFrontierPolicy>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and seed and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Do not print discovered URLs while crawling
    #[arg(long)]
    no_stream: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_effective_config(&cli)?;

    if cli.dry_run {
        return handle_dry_run(&config, &cli.seed);
    }

    handle_crawl(config, &cli.seed, !cli.no_stream).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_sweep=info,warn"),
            1 => EnvFilter::new("site_sweep=debug,info"),
            2 => EnvFilter::new("site_sweep=trace,debug"),
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

/// Loads the config file if one was given, then applies flag overrides
fn load_effective_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if let Some(capacity) = cli.frontier_capacity {
        config.crawler.frontier_capacity = capacity;
    }
    if let Some(policy) = cli.policy {
        config.crawler.full_frontier_policy = policy;
    }
    if let Some(timeout) = cli.timeout_ms {
        config.crawler.request_timeout_ms = timeout;
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, seed: &str) -> anyhow::Result<()> {
    let seed_url =
        normalize_seed(seed).with_context(|| format!("invalid seed URL '{}'", seed))?;
    let scope = ScopeDomain::from_seed(&seed_url);
    let filter = MediaFilter::from_config(&config.filter);

    println!("=== Site-Sweep Dry Run ===\n");

    println!("Seed:");
    println!("  URL: {}", seed_url);
    println!("  Scope: {}", scope);

    println!("\nCrawler Configuration:");
    println!("  Workers: {}", config.crawler.workers);
    println!("  Frontier capacity: {}", config.crawler.frontier_capacity);
    println!(
        "  Full-frontier policy: {:?}",
        config.crawler.full_frontier_policy
    );
    if config.crawler.full_frontier_policy == FullFrontierPolicy::Block {
        println!("  Block timeout: {}ms", config.crawler.block_timeout_ms);
    }
    println!("  Request timeout: {}ms", config.crawler.request_timeout_ms);
    println!(
        "  Abort fetches on cancel: {}",
        config.crawler.abort_fetch_on_cancel
    );

    println!("\nRequest Headers:");
    println!("  User-Agent: {}", config.user_agent.value);
    println!("  Accept-Language: {}", config.user_agent.accept_language);

    println!("\nFilter:");
    println!("  Blocked extensions: {}", filter.len());
    println!("  Static assets blocked: {}", config.filter.block_static_assets);

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} starting from {}", scope, seed_url);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, seed: &str, stream: bool) -> anyhow::Result<()> {
    let mut coordinator =
        Coordinator::new(config, seed).context("failed to start crawl")?;

    let printer = if stream {
        let mut discovered = coordinator.subscribe();
        Some(tokio::spawn(async move {
            while let Some(url) = discovered.recv().await {
                println!("{}", url);
            }
        }))
    } else {
        None
    };

    let cancel = coordinator.cancellation_token();
    tokio::spawn(async move {
        tokio::select! {
            _ = signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, stopping crawl");
            }
            _ = wait_for_sigterm() => {
                tracing::info!("Received SIGTERM, stopping crawl");
            }
            _ = cancel.cancelled() => return,
        }
        cancel.cancel();
    });

    let result = coordinator.run().await;

    if let Some(printer) = printer {
        printer.await.context("discovery printer failed")?;
    }

    let stats = result.context("crawl failed")?;
    println!();
    print_statistics(&stats);

    Ok(())
}

/// Wait for SIGTERM signal
#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::warn!("Failed to register SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await
}
