//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Claiming the seed and seeding the frontier
//! - Starting fetches as permits free up
//! - Classifying, claiming and recording discovered links
//! - Detecting completion and handling cancellation
//! - Generating the final report
//!
//! # Concurrency
//!
//! The coordinator loop owns the [`Scheduler`]. Each claimed URL becomes one
//! task in a [`JoinSet`]; the task fetches the page, classifies its anchors,
//! claims the new ones in the shared [`VisitedSet`] and records outcomes in
//! the shared [`ResultSink`]. It hands the claimed children back to the loop,
//! which queues them before marking the parent complete, so the run is idle
//! exactly when every reachable page has been handled.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{FetchMode, FetchedPage, PageFetcher};
use crate::crawler::parser::AnchorTag;
use crate::crawler::scheduler::{QueuedUrl, ScheduledFetch, Scheduler};
use crate::output::{
    generate_report, CrawlReport, FailedVisit, MalformedLink, ResultSink, RunMetadata,
    SkippedLink, StopReason, VisitedPage,
};
use crate::state::{UnitState, VisitedSet};
use crate::url::{canonical_keys, classify, seed_keys, LinkKind, SeedContext};
use crate::WalkError;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use url::Url;

/// Children claimed by one finished unit
type UnitResult = Result<Vec<QueuedUrl>, WalkError>;

/// Traversal limits for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSettings {
    /// Fetches allowed in flight at once
    pub max_concurrent_fetches: usize,

    /// Abort the whole traversal after this long
    pub run_deadline: Option<Duration>,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self::from(&CrawlerConfig::default())
    }
}

impl From<&CrawlerConfig> for CrawlSettings {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            max_concurrent_fetches: config.max_concurrent_fetches as usize,
            run_deadline: config.run_deadline(),
        }
    }
}

/// State shared by the coordinator and every fetch task
struct Shared<F> {
    seed: Arc<SeedContext>,
    fetcher: Arc<F>,
    visited: Arc<VisitedSet>,
    sink: Arc<ResultSink>,
}

impl<F> Clone for Shared<F> {
    fn clone(&self) -> Self {
        Self {
            seed: Arc::clone(&self.seed),
            fetcher: Arc::clone(&self.fetcher),
            visited: Arc::clone(&self.visited),
            sink: Arc::clone(&self.sink),
        }
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<F: PageFetcher> {
    shared: Shared<F>,
    settings: CrawlSettings,
    config_hash: Option<String>,
}

impl<F: PageFetcher> Coordinator<F> {
    /// Creates a new coordinator with an empty visited set and result sink
    ///
    /// # Arguments
    ///
    /// * `seed` - The validated seed
    /// * `fetcher` - Network boundary
    /// * `settings` - Concurrency and deadline limits
    pub fn new(seed: SeedContext, fetcher: F, settings: CrawlSettings) -> Self {
        Self {
            shared: Shared {
                seed: Arc::new(seed),
                fetcher: Arc::new(fetcher),
                visited: Arc::new(VisitedSet::new()),
                sink: Arc::new(ResultSink::new()),
            },
            settings,
            config_hash: None,
        }
    }

    /// Uses caller-owned visited set and result sink
    pub fn with_state(mut self, visited: Arc<VisitedSet>, sink: Arc<ResultSink>) -> Self {
        self.shared.visited = visited;
        self.shared.sink = sink;
        self
    }

    /// Stamps the report with the configuration hash
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    pub fn seed(&self) -> &SeedContext {
        &self.shared.seed
    }

    pub fn visited(&self) -> &Arc<VisitedSet> {
        &self.shared.visited
    }

    pub fn sink(&self) -> &Arc<ResultSink> {
        &self.shared.sink
    }

    /// Runs the crawl to completion (or until the run deadline)
    pub async fn run(&self) -> Result<CrawlReport, WalkError> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Runs the main crawl loop until completion, the run deadline, or until
    /// `shutdown` resolves
    ///
    /// On cancellation every in-flight fetch is aborted and awaited before
    /// the report is assembled; the report is marked incomplete and carries
    /// the number of abandoned units.
    pub async fn run_until<S>(&self, shutdown: S) -> Result<CrawlReport, WalkError>
    where
        S: Future<Output = ()>,
    {
        let started_at = Utc::now();
        let seed = &self.shared.seed;
        tracing::info!(
            "Starting crawl of {} ({} concurrent fetches)",
            seed.url(),
            self.settings.max_concurrent_fetches
        );

        let mut scheduler =
            Scheduler::new(self.settings.max_concurrent_fetches, self.initial_frontier()?);

        let mut tasks: JoinSet<UnitResult> = JoinSet::new();

        let deadline = self.settings.run_deadline;
        let deadline_elapsed = async move {
            match deadline {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline_elapsed);
        tokio::pin!(shutdown);

        let mut units_finished: u64 = 0;

        let stop_reason = loop {
            while let Some(scheduled) = scheduler.next_ready() {
                self.spawn_fetch(&mut tasks, scheduled);
            }

            if scheduler.is_idle() || tasks.is_empty() {
                debug_assert!(scheduler.is_idle());
                break StopReason::Completed;
            }

            tokio::select! {
                Some(joined) = tasks.join_next() => {
                    match joined {
                        Ok(result) => {
                            for child in result? {
                                scheduler.add_to_frontier(child);
                            }
                        }
                        Err(e) => tracing::error!("Fetch task failed: {}", e),
                    }
                    // Children are queued first so the run is never seen idle early
                    scheduler.complete();

                    units_finished += 1;
                    if units_finished % 25 == 0 {
                        tracing::info!(
                            "Progress: {} units finished, {} in flight, {} queued",
                            units_finished,
                            scheduler.in_flight(),
                            scheduler.frontier_size()
                        );
                    }
                }
                _ = &mut deadline_elapsed => break StopReason::Deadline,
                _ = &mut shutdown => break StopReason::Shutdown,
            }
        };

        let outstanding = if stop_reason == StopReason::Completed {
            0
        } else {
            tracing::warn!(
                "Crawl cancelled ({:?}); aborting {} in-flight fetches",
                stop_reason,
                scheduler.in_flight()
            );
            tasks.shutdown().await;
            scheduler.drain()
        };

        let report = generate_report(
            RunMetadata {
                seed: seed.raw().to_string(),
                started_at,
                config_hash: self.config_hash.clone(),
                stop_reason,
                outstanding,
            },
            &self.shared.sink,
            &self.shared.visited,
        );

        tracing::info!(
            "Crawl finished: {} internal, {} external, {} failed in {}ms",
            report.results.internal_pages.len(),
            report.results.external_pages.len(),
            report.results.failed_visits.len(),
            report.duration_ms
        );

        Ok(report)
    }

    /// Claims the seed's keys; the seed is the whole initial frontier
    fn initial_frontier(&self) -> Result<Vec<QueuedUrl>, WalkError> {
        let seed = &self.shared.seed;

        if self.shared.visited.claim(seed_keys(seed)) {
            tracing::warn!("Seed {} is already claimed, nothing to crawl", seed.url());
            return Ok(Vec::new());
        }

        Ok(vec![QueuedUrl::claimed(
            seed.url().clone(),
            seed.raw(),
            None,
            LinkKind::Internal,
            false,
        )?])
    }

    fn spawn_fetch(&self, tasks: &mut JoinSet<UnitResult>, scheduled: ScheduledFetch) {
        let shared = self.shared.clone();
        let ScheduledFetch { url: unit, permit } = scheduled;

        tracing::debug!("Fetching {} ({})", unit.url, unit.kind);
        tasks.spawn(async move {
            let result = process_unit(&shared, unit).await;
            drop(permit);
            result
        });
    }
}

/// Fetches one claimed unit and handles its anchors
///
/// Expandable pages have their anchors classified and claimed; external
/// pages are only fetched for their status. A failed fetch is recorded and
/// yields no children.
async fn process_unit<F: PageFetcher>(shared: &Shared<F>, mut unit: QueuedUrl) -> UnitResult {
    let mode = if unit.kind.expands() {
        FetchMode::Expand
    } else {
        FetchMode::StatusOnly
    };

    let page = match shared.fetcher.fetch(&unit.url, mode).await {
        Ok(page) => page,
        Err(error) => {
            unit.mark(UnitState::Failed)?;
            tracing::warn!(
                url = %unit.url,
                classification = %unit.kind,
                error_kind = error.kind(),
                "Fetch failed: {}",
                error
            );
            shared.sink.record_failure(FailedVisit {
                requested_href: unit.requested_href,
                url: unit.url.to_string(),
                classification: unit.kind,
                found_on: unit.found_on,
                error_kind: error.kind().to_string(),
                message: error.to_string(),
            });
            return Ok(Vec::new());
        }
    };
    unit.mark(UnitState::Fetched)?;

    let FetchedPage {
        final_url,
        status_code,
        redirect_chain,
        content_type,
        title,
        anchors,
    } = page;

    tracing::info!(
        url = %unit.url,
        status = status_code,
        classification = %unit.kind,
        relative = unit.relative,
        redirects = redirect_chain.len(),
        "{} {}",
        status_code,
        final_url
    );

    // A redirect off the site ends expansion
    let expand = unit.kind.expands() && shared.seed.scope_of(&final_url).expands();
    if unit.kind.expands() && !expand {
        tracing::debug!("{} redirected off-site to {}, not expanding", unit.url, final_url);
    }

    shared.sink.record_visit(VisitedPage {
        requested_href: unit.requested_href.clone(),
        resolved_url: final_url.to_string(),
        status_code,
        redirect_chain,
        title,
        content_type,
        classification: unit.kind,
        relative: unit.relative,
        found_on: unit.found_on.clone(),
    });

    let children = if expand {
        expand_anchors(shared, &final_url, anchors)?
    } else {
        Vec::new()
    };

    unit.mark(UnitState::LinksExpanded)?;
    Ok(children)
}

/// Classifies every anchor of a page, recording anomalies and claiming new
/// fetch targets
fn expand_anchors<F>(
    shared: &Shared<F>,
    found_on: &Url,
    anchors: Vec<AnchorTag>,
) -> Result<Vec<QueuedUrl>, WalkError> {
    let mut children = Vec::new();

    for anchor in anchors {
        if !anchor.href_present {
            tracing::warn!(
                anomaly = "missing_href",
                found_on = %anchor.found_on,
                "Anchor without href: {:?}",
                anchor.inner_text
            );
            shared.sink.record_missing_href(anchor);
            continue;
        }

        if let Some(child) = submit_link(shared, &anchor.href, found_on)? {
            children.push(child);
        }
    }

    Ok(children)
}

/// Classifies one href and claims it
///
/// # Returns
///
/// * `Some(QueuedUrl)` - a newly claimed target to fetch
/// * `None` - skipped, anomalous, or already claimed
fn submit_link<F>(
    shared: &Shared<F>,
    href: &str,
    found_on: &Url,
) -> Result<Option<QueuedUrl>, WalkError> {
    let link = classify(href, found_on, &shared.seed);

    match link.kind {
        LinkKind::Malformed => {
            let reason = link.reason.unwrap_or_default();
            tracing::warn!(
                anomaly = "malformed",
                found_on = %found_on,
                "Malformed link {:?}: {}",
                href,
                reason
            );
            shared.sink.record_malformed(MalformedLink {
                href: href.to_string(),
                found_on: found_on.to_string(),
                reason,
            });
            Ok(None)
        }
        LinkKind::OutOfScope => {
            // Only the first occurrence is recorded
            if !shared.visited.claim([link.target.as_str()]) {
                tracing::debug!("Out of scope: {}", link.target);
                shared.sink.record_out_of_scope(SkippedLink {
                    href: href.to_string(),
                    target: link.target,
                    found_on: found_on.to_string(),
                });
            }
            Ok(None)
        }
        LinkKind::Internal | LinkKind::ExternalAlias | LinkKind::External => {
            let keys = canonical_keys(href, &link, &shared.seed);
            if shared.visited.claim(&keys) {
                tracing::trace!("Already claimed: {}", link.target);
                return Ok(None);
            }

            let Some(url) = link.url().cloned() else {
                return Ok(None);
            };

            let unit = QueuedUrl::claimed(
                url,
                href.trim(),
                Some(found_on.to_string()),
                link.kind,
                link.relative,
            )?;
            Ok(Some(unit))
        }
    }
}
