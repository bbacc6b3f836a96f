//! Error taxonomy for story operations.
//!
//! Every variant except `Serialization` is a precondition violation
//! detected before any mutation. None are transient: retrying the same
//! request yields the same error.

use std::fmt;

use crate::types::{AuthorId, ContentId, StorylineState};

/// The kind of entity a lookup failed to find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    /// No contribution with this identifier in the story.
    Contribution(ContentId),
    /// No registered author with this identity.
    Author(AuthorId),
    /// No story rooted at this identifier.
    Story(ContentId),
    /// Nothing has been featured yet.
    FeaturedStory,
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contribution(cid) => write!(f, "contribution {cid}"),
            Self::Author(id) => write!(f, "author {id}"),
            Self::Story(cid) => write!(f, "story {cid}"),
            Self::FeaturedStory => write!(f, "featured story"),
        }
    }
}

/// Error type for story operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoryError {
    /// The content identifier is already used in this story.
    #[error("Content id already used in this story: {0}")]
    DuplicateContentId(ContentId),

    /// The parent of a submission does not exist.
    #[error("Parent contribution not found: {0}")]
    ParentNotFound(ContentId),

    /// The author already continued this parent once.
    #[error("Author {author} already has a continuation of {parent}")]
    DuplicateAuthorEdge {
        /// Submitting author.
        author: AuthorId,
        /// Parent they already continued.
        parent: ContentId,
    },

    /// The storyline is closed to this submission.
    #[error("Storyline closed at {cid} (state {state})")]
    BranchClosed {
        /// The node whose state closes the branch.
        cid: ContentId,
        /// Its current state.
        state: StorylineState,
    },

    /// The voter authored nothing along the storyline.
    #[error("{voter} has no contribution on the storyline ending at {cid}")]
    NotAnAuthor {
        /// Rejected voter.
        voter: AuthorId,
        /// Storyline tip.
        cid: ContentId,
    },

    /// The voter already cast this kind of vote on this node.
    #[error("{voter} already voted on {cid}")]
    AlreadyVoted {
        /// Rejected voter.
        voter: AuthorId,
        /// Node voted on.
        cid: ContentId,
    },

    /// The node is not in a state that accepts this operation.
    #[error("Invalid state for {cid}: {state}")]
    InvalidState {
        /// The node whose state blocks the operation (the target itself
        /// or an ancestor on the same storyline).
        cid: ContentId,
        /// Its current state.
        state: StorylineState,
    },

    /// An author with this identity is already registered.
    #[error("Author already registered: {0}")]
    DuplicateAuthor(AuthorId),

    /// A lookup failed.
    #[error("Not found: {0}")]
    NotFound(Missing),

    /// Encoding story state as canonical JSON failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl StoryError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateContentId(_) => "DUPLICATE_CONTENT_ID",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::DuplicateAuthorEdge { .. } => "DUPLICATE_AUTHOR_EDGE",
            Self::BranchClosed { .. } => "BRANCH_CLOSED",
            Self::NotAnAuthor { .. } => "NOT_AN_AUTHOR",
            Self::AlreadyVoted { .. } => "ALREADY_VOTED",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::DuplicateAuthor(_) => "DUPLICATE_AUTHOR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Serialization(_) => "SERIALIZATION_FAILED",
        }
    }

    pub(crate) fn contribution_not_found(cid: &ContentId) -> Self {
        Self::NotFound(Missing::Contribution(cid.clone()))
    }

    pub(crate) fn author_not_found(id: &AuthorId) -> Self {
        Self::NotFound(Missing::Author(id.clone()))
    }

    pub(crate) fn story_not_found(cid: &ContentId) -> Self {
        Self::NotFound(Missing::Story(cid.clone()))
    }
}

impl From<serde_json::Error> for StoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
