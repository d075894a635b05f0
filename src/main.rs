//! Path-Mirror main entry point
//!
//! This is the command-line interface for the Path-Mirror page archiver.

use anyhow::{Context, Result};
use clap::Parser;
use path_mirror::config::{compute_config_hash, config_fingerprint, parse_config, validate, Config};
use path_mirror::crawler::Coordinator;
use path_mirror::output::{generate_markdown_summary, print_statistics, CrawlSummary};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Seed used when neither a config file nor `--seed-url` names one
const DEFAULT_SEED_URL: &str = "https://tlidb.com/cn/";

/// Path-Mirror: a bounded-depth, same-site page archiver
///
/// Path-Mirror crawls every page reachable from a seed URL that stays on the
/// seed's host and under a required path prefix, and saves each page into a
/// directory tree that mirrors the URL paths.
#[derive(Parser, Debug)]
#[command(name = "path-mirror")]
#[command(version)]
#[command(about = "A bounded-depth, same-site page archiver", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// URL to start crawling from
    #[arg(long, value_name = "URL")]
    seed_url: Option<String>,

    /// Directory pages are saved under
    #[arg(long, value_name = "DIR")]
    save_dir: Option<PathBuf>,

    /// Maximum link depth, counting the seed as 1
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Number of concurrent workers
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Courtesy delay before each fetch, in milliseconds
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Per-request timeout, in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Path prefix every crawled URL must start with
    #[arg(long, value_name = "PREFIX")]
    prefix: Option<String>,

    /// Write a markdown run summary to this path
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Applies command-line overrides on top of a loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(seed) = &self.seed_url {
            config.crawler.seed_url = seed.clone();
        }
        if let Some(dir) = &self.save_dir {
            config.output.save_directory = dir.clone();
        }
        if let Some(depth) = self.max_depth {
            config.crawler.max_depth = depth;
        }
        if let Some(workers) = self.workers {
            config.crawler.worker_count = workers;
        }
        if let Some(delay) = self.delay_ms {
            config.crawler.request_delay = delay;
        }
        if let Some(timeout) = self.timeout_ms {
            config.crawler.fetch_timeout = timeout;
        }
        if let Some(prefix) = &self.prefix {
            config.crawler.required_path_prefix = prefix.clone();
        }
        if let Some(summary) = &self.summary {
            config.output.summary_path = Some(summary.clone());
        }
    }

    fn has_overrides(&self) -> bool {
        self.seed_url.is_some()
            || self.save_dir.is_some()
            || self.max_depth.is_some()
            || self.workers.is_some()
            || self.delay_ms.is_some()
            || self.timeout_ms.is_some()
            || self.prefix.is_some()
            || self.summary.is_some()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load_effective_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config, &config_hash);
        return Ok(());
    }

    handle_crawl(config, config_hash).await
}

/// Builds the configuration from the optional file plus CLI overrides, then validates it
fn load_effective_config(cli: &Cli) -> Result<(Config, String)> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            parse_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    cli.apply_overrides(&mut config);
    if cli.config.is_none() && config.crawler.seed_url.is_empty() {
        config.crawler.seed_url = DEFAULT_SEED_URL.to_string();
    }

    validate(&config).context("Invalid configuration")?;

    // Hash the file when the run is fully described by it
    let config_hash = match &cli.config {
        Some(path) if !cli.has_overrides() => compute_config_hash(path)?,
        _ => config_fingerprint(&config)?,
    };
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    Ok((config, config_hash))
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("path_mirror=info,warn"),
            1 => EnvFilter::new("path_mirror=debug,info"),
            2 => EnvFilter::new("path_mirror=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config, config_hash: &str) {
    println!("=== Path-Mirror Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed URL: {}", config.crawler.seed_url);
    println!("  Path prefix: {}", config.crawler.required_path_prefix);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Workers: {}", config.crawler.worker_count);
    println!("  Request delay: {}ms", config.crawler.request_delay);
    println!("  Fetch timeout: {}ms", config.crawler.fetch_timeout);
    println!("  Idle poll: {}ms", config.crawler.idle_poll);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Save directory: {}", config.output.save_directory.display());
    match &config.output.summary_path {
        Some(path) => println!("  Summary: {}", path.display()),
        None => println!("  Summary: (none)"),
    }

    println!("\n✓ Configuration is valid (hash: {})", config_hash);
    println!(
        "✓ Would crawl {} with {} workers",
        config.crawler.seed_url, config.crawler.worker_count
    );
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: String) -> Result<()> {
    let coordinator = Coordinator::new(config).context("Failed to initialize crawler")?;

    let stats = match coordinator.run().await {
        Ok(stats) => stats,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    print_statistics(&stats);
    println!();
    println!("Crawling complete. Visited {} URLs.", stats.visited_count);
    println!("Pages saved to: {}", coordinator.output_dir().display());

    let config = coordinator.config();
    if let Some(path) = &config.output.summary_path {
        let summary = CrawlSummary::new(config, config_hash, stats);
        generate_markdown_summary(&summary, path)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        println!("✓ Summary exported to: {}", path.display());
    }

    Ok(())
}
