//! Storyline lifecycle states and the transition table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a contribution.
///
/// Declared in forward order, so `Ord` matches lifecycle progress:
/// Open < Drafting < DraftingEnd < FinalReview < Published
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorylineState {
    /// Accepting public continuations and draft votes.
    Open,
    /// Closed to the public; waiting for the leader's final draft.
    Drafting,
    /// The leader's final draft was appended under this node.
    DraftingEnd,
    /// A final draft awaiting publish votes.
    FinalReview,
    /// Permanently published.
    Published,
}

/// Event that can move a storyline forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorylineEvent {
    /// A strict majority of path authors voted to draft.
    DraftQuorumReached,
    /// The elected leader appended the final draft.
    FinalDraftSubmitted,
    /// A strict majority of path authors voted to publish.
    PublishQuorumReached,
}

impl StorylineState {
    /// Apply an event, returning the next state or `None` if the
    /// event is not accepted in this state.
    pub fn on(self, event: StorylineEvent) -> Option<Self> {
        use StorylineEvent::*;
        match (self, event) {
            (Self::Open, DraftQuorumReached) => Some(Self::Drafting),
            (Self::Drafting, FinalDraftSubmitted) => Some(Self::DraftingEnd),
            (Self::FinalReview, PublishQuorumReached) => Some(Self::Published),
            (Self::DraftingEnd, PublishQuorumReached) => Some(Self::Published),
            _ => None,
        }
    }

    /// Parse a state from its wire name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "OPEN" => Some(Self::Open),
            "DRAFTING" => Some(Self::Drafting),
            "DRAFTING_END" => Some(Self::DraftingEnd),
            "FINAL_REVIEW" => Some(Self::FinalReview),
            "PUBLISHED" => Some(Self::Published),
            _ => None,
        }
    }
}

impl Default for StorylineState {
    fn default() -> Self {
        Self::Open
    }
}

impl fmt::Display for StorylineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Drafting => write!(f, "DRAFTING"),
            Self::DraftingEnd => write!(f, "DRAFTING_END"),
            Self::FinalReview => write!(f, "FINAL_REVIEW"),
            Self::Published => write!(f, "PUBLISHED"),
        }
    }
}
