//! Statistics generation from a crawl report
//!
//! This module provides functionality for summarizing a finished report and
//! displaying the summary on the console.

use crate::output::traits::{CrawlReport, VisitedPage};
use crate::url::LinkKind;
use std::collections::BTreeMap;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Pages fetched on the seed host
    pub internal_pages: u64,

    /// Pages fetched on the seed's `www.` alias host
    pub alias_pages: u64,

    /// Pages fetched on other hosts
    pub external_pages: u64,

    /// Count of fetched pages by status class ("2xx", "4xx", ...)
    pub pages_by_status: BTreeMap<String, u64>,

    /// Pages reached through at least one redirect
    pub redirected_pages: u64,

    pub missing_href: u64,
    pub malformed_links: u64,
    pub out_of_scope_links: u64,
    pub failed_visits: u64,

    /// Number of keys in the visited set
    pub claimed_keys: u64,

    pub completed: bool,
    pub outstanding: u64,
    pub duration_ms: u64,
}

impl CrawlStatistics {
    /// Builds statistics from a report
    pub fn from_report(report: &CrawlReport) -> Self {
        let results = &report.results;
        let pages = || results.internal_pages.iter().chain(&results.external_pages);

        let mut pages_by_status = BTreeMap::new();
        for page in pages() {
            *pages_by_status
                .entry(status_class(page.status_code).to_string())
                .or_insert(0) += 1;
        }

        let count_kind = |kind: LinkKind| {
            results
                .internal_pages
                .iter()
                .filter(|p| p.classification == kind)
                .count() as u64
        };

        Self {
            internal_pages: count_kind(LinkKind::Internal),
            alias_pages: count_kind(LinkKind::ExternalAlias),
            external_pages: results.external_pages.len() as u64,
            pages_by_status,
            redirected_pages: pages().filter(|p| is_redirected(p)).count() as u64,
            missing_href: results.missing_href.len() as u64,
            malformed_links: results.malformed_links.len() as u64,
            out_of_scope_links: results.out_of_scope_links.len() as u64,
            failed_visits: results.failed_visits.len() as u64,
            claimed_keys: report.seen_urls.len() as u64,
            completed: report.completed,
            outstanding: report.outstanding as u64,
            duration_ms: report.duration_ms,
        }
    }

    /// Total number of fetched pages
    pub fn total_pages(&self) -> u64 {
        self.internal_pages + self.alias_pages + self.external_pages
    }

    /// Total number of anomalies
    pub fn total_anomalies(&self) -> u64 {
        self.missing_href + self.malformed_links
    }
}

/// Status class label for an HTTP status code
pub fn status_class(status: u16) -> &'static str {
    match status {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

fn is_redirected(page: &VisitedPage) -> bool {
    !page.redirect_chain.is_empty()
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages fetched: {}", stats.total_pages());
    println!("  Internal: {}", stats.internal_pages);
    println!("  Alias host: {}", stats.alias_pages);
    println!("  External: {}", stats.external_pages);
    println!("  Redirected: {}", stats.redirected_pages);
    println!("  Claimed keys: {}", stats.claimed_keys);
    println!("  Duration: {:.2}s", stats.duration_ms as f64 / 1000.0);
    println!();

    println!("Pages by Status:");
    let total = stats.total_pages();
    for (class, count) in &stats.pages_by_status {
        let percentage = if total > 0 {
            (*count as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", class, count, percentage);
    }
    println!();

    println!("Anomalies:");
    println!("  Missing href: {}", stats.missing_href);
    println!("  Malformed links: {}", stats.malformed_links);
    println!("  Out of scope links: {}", stats.out_of_scope_links);
    println!("  Failed visits: {}", stats.failed_visits);
    println!();

    if stats.completed {
        println!("Crawl completed");
    } else {
        println!(
            "Crawl cancelled with {} unit(s) outstanding",
            stats.outstanding
        );
    }
}
