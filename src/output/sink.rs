//! In-memory result sink shared by every fetch of a run

use crate::crawler::AnchorTag;
use crate::output::traits::{CrawlResults, FailedVisit, MalformedLink, SkippedLink, VisitedPage};
use std::sync::{Mutex, PoisonError};

/// Accumulates crawl outcomes behind one lock
///
/// Each record is appended exactly once and never mutated afterwards. The
/// lock is only held for a push, never across a network call.
#[derive(Debug, Default)]
pub struct ResultSink {
    results: Mutex<CrawlResults>,
}

impl ResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a fetched page in the internal or external list
    ///
    /// Alias pages go with the internal pages; their classification tells
    /// them apart.
    pub fn record_visit(&self, page: VisitedPage) {
        let mut results = self.lock();
        if page.classification.expands() {
            results.internal_pages.push(page);
        } else {
            results.external_pages.push(page);
        }
    }

    pub fn record_failure(&self, failure: FailedVisit) {
        self.lock().failed_visits.push(failure);
    }

    pub fn record_missing_href(&self, anchor: AnchorTag) {
        self.lock().missing_href.push(anchor);
    }

    pub fn record_malformed(&self, link: MalformedLink) {
        self.lock().malformed_links.push(link);
    }

    pub fn record_out_of_scope(&self, link: SkippedLink) {
        self.lock().out_of_scope_links.push(link);
    }

    /// Copy of everything recorded so far
    pub fn snapshot(&self) -> CrawlResults {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CrawlResults> {
        self.results.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
