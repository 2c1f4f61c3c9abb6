//! Scheduler for managing the crawl frontier and concurrency
//!
//! This module handles:
//! - FIFO queue of claimed URLs waiting for a fetch slot
//! - Global concurrency limiting via a semaphore
//! - The in-flight counter used for completion detection

use crate::state::UnitState;
use crate::url::LinkKind;
use crate::WalkError;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use url::Url;

/// A claimed URL queued for fetching
#[derive(Debug, Clone)]
pub struct QueuedUrl {
    /// The URL to fetch
    pub url: Url,

    /// The href exactly as it appeared in the page (or the raw seed)
    pub requested_href: String,

    /// Page the href was found on; `None` for the seed
    pub found_on: Option<String>,

    /// Classification of the target
    pub kind: LinkKind,

    /// The href carried no host of its own
    pub relative: bool,

    /// Lifecycle state of this unit
    pub state: UnitState,
}

impl QueuedUrl {
    /// Creates a unit that has just been claimed in the visited set
    pub fn claimed(
        url: Url,
        requested_href: impl Into<String>,
        found_on: Option<String>,
        kind: LinkKind,
        relative: bool,
    ) -> Result<Self, WalkError> {
        let mut state = UnitState::Discovered;
        state.advance(UnitState::Claimed)?;

        Ok(Self {
            url,
            requested_href: requested_href.into(),
            found_on,
            kind,
            relative,
            state,
        })
    }

    /// Moves the unit to its next lifecycle state
    pub fn mark(&mut self, next: UnitState) -> Result<(), WalkError> {
        self.state.advance(next)
    }
}

/// A scheduled fetch with a semaphore permit
///
/// The permit is released when the fetch task drops it.
pub struct ScheduledFetch {
    /// The URL to fetch
    pub url: QueuedUrl,

    /// The semaphore permit for this fetch
    pub permit: OwnedSemaphorePermit,
}

/// Scheduler manages the frontier queue and the fetch budget
///
/// The scheduler coordinates:
/// - Global concurrency limits (max fetches in flight)
/// - FIFO selection from the frontier
/// - Completion detection: the run is done exactly when the frontier is
///   empty and nothing is in flight
pub struct Scheduler {
    /// Global semaphore for limiting concurrent fetches
    permits: Arc<Semaphore>,

    /// URLs claimed but not yet started
    frontier: VecDeque<QueuedUrl>,

    /// Fetches started and not yet completed
    in_flight: usize,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `max_concurrent_fetches` - Semaphore size (at least 1)
    /// * `initial_frontier` - Initial URLs to crawl
    pub fn new(max_concurrent_fetches: usize, initial_frontier: Vec<QueuedUrl>) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent_fetches.max(1))),
            frontier: VecDeque::from(initial_frontier),
            in_flight: 0,
        }
    }

    /// Adds a URL to the back of the frontier
    pub fn add_to_frontier(&mut self, url: QueuedUrl) {
        self.frontier.push_back(url);
    }

    /// Gets the next URL to fetch if a permit is free
    ///
    /// Never waits: permits are only returned by completing fetches, which
    /// the caller observes on its own. A returned fetch is counted as in
    /// flight until [`Scheduler::complete`] is called for it.
    ///
    /// # Returns
    ///
    /// * `Some(ScheduledFetch)` - A URL that may be fetched now
    /// * `None` - The frontier is empty or every permit is taken
    pub fn next_ready(&mut self) -> Option<ScheduledFetch> {
        if self.frontier.is_empty() {
            return None;
        }

        let permit = Arc::clone(&self.permits).try_acquire_owned().ok()?;
        let url = self.frontier.pop_front()?;
        self.in_flight += 1;

        tracing::trace!(
            "Scheduling {} ({} in flight, {} queued)",
            url.url,
            self.in_flight,
            self.frontier.len()
        );

        Some(ScheduledFetch { url, permit })
    }

    /// Records that a fetch finished
    ///
    /// Callers must add the finished unit's children to the frontier before
    /// calling this, so the run is never observed idle in between.
    pub fn complete(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Returns the number of fetches in flight
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Returns the number of URLs in the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Returns true when no work is queued or running
    pub fn is_idle(&self) -> bool {
        self.frontier.is_empty() && self.in_flight == 0
    }

    /// Empties the frontier, returning how many units were abandoned
    /// (queued plus in flight)
    pub fn drain(&mut self) -> usize {
        let abandoned = self.frontier.len() + self.in_flight;
        self.frontier.clear();
        self.in_flight = 0;
        abandoned
    }
}
