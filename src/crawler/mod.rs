//! Crawler module for web page fetching and traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with manual redirect capture
//! - HTML parsing and anchor extraction
//! - Frontier scheduling and concurrency limiting
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{Coordinator, CrawlSettings};
pub use fetcher::{
    build_http_client, fetch_url, is_html, FetchError, FetchMode, FetchedPage, HttpFetcher,
    PageFetcher,
};
pub use parser::{parse_html, AnchorTag, ParsedPage, INNER_TEXT_LIMIT};
pub use scheduler::{QueuedUrl, ScheduledFetch, Scheduler};

use crate::config::Config;
use crate::output::CrawlReport;
use crate::url::SeedContext;
use std::future::Future;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the seed URL
/// 2. Build the HTTP client
/// 3. Fetch every in-site page reachable from the seed
/// 4. Return the report
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed` - The seed URL as supplied by the user
/// * `config_hash` - Hash of the configuration file, if one was loaded
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished
/// * `Err(WalkError)` - The seed was invalid or the client could not be built
pub async fn crawl(
    config: &Config,
    seed: &str,
    config_hash: Option<String>,
) -> crate::Result<CrawlReport> {
    crawl_until(config, seed, config_hash, std::future::pending::<()>()).await
}

/// Like [`crawl`], but stops early when `shutdown` resolves
pub async fn crawl_until<S>(
    config: &Config,
    seed: &str,
    config_hash: Option<String>,
    shutdown: S,
) -> crate::Result<CrawlReport>
where
    S: Future<Output = ()>,
{
    let seed = SeedContext::parse(seed)?.with_query_stripping(config.crawler.strip_query);
    crawl_seed_until(config, seed, config_hash, shutdown).await
}

/// Like [`crawl_until`], for a seed that has already been validated
///
/// The seed's own query-stripping setting decides page identity.
pub async fn crawl_seed_until<S>(
    config: &Config,
    seed: SeedContext,
    config_hash: Option<String>,
    shutdown: S,
) -> crate::Result<CrawlReport>
where
    S: Future<Output = ()>,
{
    let fetcher = HttpFetcher::from_config(config)?;

    let mut coordinator = Coordinator::new(seed, fetcher, CrawlSettings::from(&config.crawler));
    if let Some(hash) = config_hash {
        coordinator = coordinator.with_config_hash(hash);
    }

    coordinator.run_until(shutdown).await
}
