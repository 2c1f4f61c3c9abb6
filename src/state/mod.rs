//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `UnitState`: lifecycle of one orchestration unit (discovered, claimed,
//!   fetched, expanded or failed)
//! - `VisitedSet`: the shared claim table deciding which unit owns a page

mod unit_state;
mod visited;

// Re-export main types
pub use unit_state::UnitState;
pub use visited::VisitedSet;
