//! Sitewalk main entry point
//!
//! This is the command-line interface for the Sitewalk link walker.

use anyhow::{bail, Context};
use clap::Parser;
use sitewalk::config::{load_config_with_hash, validate, Config};
use sitewalk::crawler::crawl_seed_until;
use sitewalk::output::{print_statistics, CrawlStatistics, JsonOutputHandler, OutputHandler};
use sitewalk::url::SeedContext;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sitewalk: a single-host link walker
///
/// Sitewalk fetches every page reachable from a seed URL on the seed's host,
/// checks the status of every outbound link once, and writes a JSON report
/// of visited pages, redirects and broken or anomalous anchors.
#[derive(Parser, Debug)]
#[command(name = "sitewalk")]
#[command(version)]
#[command(about = "A single-host link walker", long_about = None)]
struct Cli {
    /// Seed URL (prompted for when omitted)
    #[arg(short, long)]
    url: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Report file (overrides output.report-path)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Maximum fetches in flight
    #[arg(long)]
    concurrency: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Abort the crawl after this many seconds
    #[arg(long)]
    deadline: Option<u64>,

    /// Treat query strings as part of page identity
    #[arg(long)]
    keep_query: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate seed and config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load_settings(&cli)?;

    let raw_seed = match &cli.url {
        Some(url) => url.clone(),
        None => prompt_for_seed()?,
    };

    // Seed errors are fatal and happen before any report exists
    let seed = SeedContext::parse(&raw_seed)
        .with_context(|| format!("Invalid seed URL {:?}", raw_seed))?
        .with_query_stripping(config.crawler.strip_query);

    if cli.dry_run {
        handle_dry_run(&config, &seed, config_hash.as_deref());
        return Ok(());
    }

    handle_crawl(config, seed, config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitewalk=info,warn"),
            1 => EnvFilter::new("sitewalk=debug,info"),
            2 => EnvFilter::new("sitewalk=trace,debug"),
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

/// Loads the optional config file and applies command-line overrides
fn load_settings(cli: &Cli) -> anyhow::Result<(Config, Option<String>)> {
    let (mut config, hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    if let Some(concurrency) = cli.concurrency {
        config.crawler.max_concurrent_fetches = concurrency;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.request_timeout_secs = timeout;
    }
    if let Some(deadline) = cli.deadline {
        config.crawler.run_deadline_secs = deadline;
    }
    if cli.keep_query {
        config.crawler.strip_query = false;
    }
    if let Some(output) = &cli.output {
        config.output.report_path = output.display().to_string();
    }

    validate(&config).context("Invalid settings")?;
    Ok((config, hash))
}

/// Asks for the seed URL on stdin
fn prompt_for_seed() -> anyhow::Result<String> {
    print!("Seed URL: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read seed URL from stdin")?;

    let line = line.trim().to_string();
    if line.is_empty() {
        bail!("No seed URL given");
    }
    Ok(line)
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, seed: &SeedContext, config_hash: Option<&str>) {
    println!("=== Sitewalk Dry Run ===\n");

    println!("Seed:");
    println!("  URL: {}", seed.url());
    println!("  Host: {}", seed.host());
    println!("  Alias host: {}", seed.alias_host());
    println!();

    println!("Crawler Configuration:");
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    match config.crawler.run_deadline() {
        Some(deadline) => println!("  Run deadline: {}s", deadline.as_secs()),
        None => println!("  Run deadline: none"),
    }
    println!("  Strip query strings: {}", config.crawler.strip_query);
    println!("  Max redirects: {}", config.crawler.max_redirects);

    println!("\nUser Agent: {}", config.user_agent.header_value());
    println!("\nReport: {}", config.output.report_path);
    if let Some(hash) = config_hash {
        println!("Config hash: {}", hash);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    seed: SeedContext,
    config_hash: Option<String>,
) -> anyhow::Result<()> {
    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
        tracing::warn!("Interrupt received, stopping crawl");
    };

    let report = crawl_seed_until(&config, seed, config_hash, shutdown)
        .await
        .context("Crawl failed")?;

    let handler = JsonOutputHandler::new(&config.output.report_path);
    handler
        .write_report(&report)
        .with_context(|| format!("Failed to write report {}", config.output.report_path))?;

    print_statistics(&CrawlStatistics::from_report(&report));
    Ok(())
}
