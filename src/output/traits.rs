//! Output handler traits and report types
//!
//! This module defines the records collected during a crawl, the final
//! report document, and the trait interface for report writers.

use crate::crawler::AnchorTag;
use crate::url::LinkKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// One claimed and fetched page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitedPage {
    /// The href as written on the referring page (or the raw seed)
    pub requested_href: String,

    /// Final URL after redirects
    pub resolved_url: String,

    /// HTTP status code of the final response
    pub status_code: u16,

    /// Every redirect hop, in order
    pub redirect_chain: Vec<String>,

    /// Page title (if available)
    pub title: Option<String>,

    /// Content type
    pub content_type: Option<String>,

    pub classification: LinkKind,

    /// The href carried no host of its own
    pub relative: bool,

    /// Referring page; `None` for the seed
    pub found_on: Option<String>,
}

/// Error information for a page whose fetch failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedVisit {
    pub requested_href: String,

    /// The URL that failed
    pub url: String,

    pub classification: LinkKind,

    pub found_on: Option<String>,

    /// Short failure kind (`timeout`, `connect`, ...)
    pub error_kind: String,

    /// Error message
    pub message: String,
}

/// An href that could not be parsed or resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedLink {
    pub href: String,
    pub found_on: String,
    pub reason: String,
}

/// A link with a scheme the crawler never fetches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLink {
    pub href: String,
    pub target: String,
    pub found_on: String,
}

/// Everything the result sink collected
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlResults {
    /// Pages on the seed host and its alias
    pub internal_pages: Vec<VisitedPage>,

    /// Pages on other hosts, fetched for their status only
    pub external_pages: Vec<VisitedPage>,

    /// `<a>` elements without an `href`
    pub missing_href: Vec<AnchorTag>,

    pub malformed_links: Vec<MalformedLink>,

    pub out_of_scope_links: Vec<SkippedLink>,

    pub failed_visits: Vec<FailedVisit>,
}

/// Why the crawl loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// No work left
    Completed,
    /// The run-level deadline passed
    Deadline,
    /// The caller requested a shutdown
    Shutdown,
}

/// The final report document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlReport {
    // Run metadata
    pub seed: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub config_hash: Option<String>,
    pub completed: bool,
    pub stop_reason: StopReason,

    /// Units abandoned by cancellation (queued or in flight)
    pub outstanding: usize,

    #[serde(flatten)]
    pub results: CrawlResults,

    /// Every claimed key with the number of times it was seen
    pub seen_urls: BTreeMap<String, u32>,
}

/// Trait for report writers
///
/// Output handlers receive the finished report once, after the crawl loop
/// has stopped.
pub trait OutputHandler {
    /// Writes the report
    ///
    /// # Arguments
    ///
    /// * `report` - The final crawl report
    fn write_report(&self, report: &CrawlReport) -> OutputResult<()>;
}
