/// Unit state definitions for tracking crawl progress
///
/// Every discovered URL moves through these states at most once.
use crate::WalkError;
use serde::Serialize;
use std::fmt;

/// Represents the current state of one orchestration unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitState {
    // ===== Active States =====
    /// Link found on a page (or the seed), not yet claimed
    Discovered,

    /// Keys registered in the visited set; this unit owns the page
    Claimed,

    /// Response received and, for expandable pages, anchors extracted
    Fetched,

    // ===== Terminal States =====
    /// Page recorded and its anchors submitted
    LinksExpanded,

    /// Fetch or parse failed; no children expanded
    Failed,
}

impl UnitState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::LinksExpanded | Self::Failed)
    }

    /// Returns true if this is an active state
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// ```text
    /// Discovered -> Claimed -> Fetched -> LinksExpanded
    ///                  |          |
    ///                  +----------+-----> Failed
    /// ```
    pub fn can_transition_to(&self, next: UnitState) -> bool {
        matches!(
            (self, next),
            (Self::Discovered, Self::Claimed)
                | (Self::Claimed, Self::Fetched)
                | (Self::Claimed, Self::Failed)
                | (Self::Fetched, Self::LinksExpanded)
                | (Self::Fetched, Self::Failed)
        )
    }

    /// Moves to `next`, rejecting illegal transitions
    pub fn advance(&mut self, next: UnitState) -> Result<(), WalkError> {
        if !self.can_transition_to(next) {
            return Err(WalkError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Claimed => "claimed",
            Self::Fetched => "fetched",
            Self::LinksExpanded => "links_expanded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
