//! Story journal events.
//!
//! Every successful mutation of a story appends one or more events to the
//! story's journal. Rejected operations append nothing, so the journal is a
//! faithful replay log of accepted operations.
//!
//! | Event | Emitted by |
//! |-------|------------|
//! | `StoryCreated` | story creation |
//! | `ContributionAdded` | every accepted submission |
//! | `ReputationAwarded` | submission under another author's node |
//! | `DraftVoteCast` | accepted draft vote |
//! | `PublishVoteCast` | accepted publish vote (including the automatic one) |
//! | `StateChanged` | every lifecycle transition |

use serde::{Deserialize, Serialize};

use super::ids::{AuthorId, ContentId};
use super::state::{StorylineEvent, StorylineState};

/// An entry in a story's journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoryEvent {
    /// The story root was created.
    StoryCreated {
        /// Root content identifier.
        root: ContentId,
        /// Author of the root.
        creator: AuthorId,
    },
    /// A contribution was accepted.
    ContributionAdded {
        /// New contribution.
        cid: ContentId,
        /// Contribution it continues.
        parent: ContentId,
        /// Submitting author.
        author: AuthorId,
    },
    /// An author gained reputation from a derivative work.
    ReputationAwarded {
        /// Rewarded author.
        author: AuthorId,
        /// The contribution that was continued.
        derived_from: ContentId,
    },
    /// A draft vote was recorded.
    DraftVoteCast {
        /// Storyline tip voted on.
        cid: ContentId,
        /// Voter.
        voter: AuthorId,
    },
    /// A publish vote was recorded.
    PublishVoteCast {
        /// Final draft voted on.
        cid: ContentId,
        /// Voter.
        voter: AuthorId,
    },
    /// A contribution moved to a new lifecycle state.
    StateChanged {
        /// Contribution whose state changed.
        cid: ContentId,
        /// Previous state.
        from: StorylineState,
        /// New state.
        to: StorylineState,
        /// What triggered it.
        trigger: StorylineEvent,
    },
}

impl StoryEvent {
    /// Short event name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::StoryCreated { .. } => "story_created",
            Self::ContributionAdded { .. } => "contribution_added",
            Self::ReputationAwarded { .. } => "reputation_awarded",
            Self::DraftVoteCast { .. } => "draft_vote_cast",
            Self::PublishVoteCast { .. } => "publish_vote_cast",
            Self::StateChanged { .. } => "state_changed",
        }
    }
}
