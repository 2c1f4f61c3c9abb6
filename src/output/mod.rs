//! Output module for collecting crawl results and writing reports
//!
//! This module handles:
//! - Accumulating visited pages and anomalies while the crawl runs
//! - Assembling the final report
//! - Writing the report as JSON
//! - Console statistics

mod json_output;
mod sink;
pub mod stats;
mod traits;

pub use json_output::{load_report, JsonOutputHandler};
pub use sink::ResultSink;
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{
    CrawlReport, CrawlResults, FailedVisit, MalformedLink, OutputError, OutputHandler,
    OutputResult, SkippedLink, StopReason, VisitedPage,
};

use crate::state::VisitedSet;
use chrono::{DateTime, Utc};

/// Run-level facts the report is stamped with
#[derive(Debug, Clone)]
pub struct RunMetadata {
    pub seed: String,
    pub started_at: DateTime<Utc>,
    pub config_hash: Option<String>,
    pub stop_reason: StopReason,
    /// Units abandoned by cancellation
    pub outstanding: usize,
}

/// Generates the crawl report
///
/// Must only be called once no fetch is running, so the visited table and
/// the collections are final.
///
/// # Arguments
///
/// * `run` - Run metadata
/// * `sink` - Collected results
/// * `visited` - The claim table
pub fn generate_report(run: RunMetadata, sink: &ResultSink, visited: &VisitedSet) -> CrawlReport {
    let finished_at = Utc::now();
    let duration_ms = (finished_at - run.started_at).num_milliseconds().max(0) as u64;

    CrawlReport {
        seed: run.seed,
        started_at: run.started_at,
        finished_at,
        duration_ms,
        config_hash: run.config_hash,
        completed: run.stop_reason == StopReason::Completed,
        stop_reason: run.stop_reason,
        outstanding: run.outstanding,
        results: sink.snapshot(),
        seen_urls: visited.snapshot(),
    }
}
