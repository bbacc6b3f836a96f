//! Contribution nodes of the story graph.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::{AuthorId, ContentId};
use super::state::StorylineState;

/// A single node in a story's contribution tree.
///
/// Records are only ever handed out by reference or as clones; the graph is
/// the sole writer. After creation only `children`, `state` and the vote
/// lists change.
#[derive(Debug, Clone, Serialize)]
pub struct Contribution {
    /// Content identifier of this contribution.
    pub cid: ContentId,
    /// The contribution this one continues. `None` only for the story root.
    pub parent: Option<ContentId>,
    /// Who submitted it.
    pub author: AuthorId,
    /// Direct continuations, in submission order.
    pub children: Vec<ContentId>,
    /// Lifecycle state.
    pub state: StorylineState,
    /// Authors who voted to close this storyline, in vote order.
    pub draft_votes: Vec<AuthorId>,
    /// Authors who voted to publish this final draft, in vote order.
    pub publish_votes: Vec<AuthorId>,
    /// Distance from the story root (root = 0).
    pub depth: u32,
    /// When the contribution was accepted.
    pub created_at: DateTime<Utc>,
}

impl Contribution {
    /// Create the root contribution of a story.
    pub fn root(cid: ContentId, author: AuthorId) -> Self {
        Self::new(cid, None, author, 0)
    }

    /// Create a continuation of `parent`.
    pub fn child(cid: ContentId, parent: ContentId, author: AuthorId, depth: u32) -> Self {
        Self::new(cid, Some(parent), author, depth)
    }

    fn new(cid: ContentId, parent: Option<ContentId>, author: AuthorId, depth: u32) -> Self {
        Self {
            cid,
            parent,
            author,
            children: Vec::new(),
            state: StorylineState::Open,
            draft_votes: Vec::new(),
            publish_votes: Vec::new(),
            depth,
            created_at: Utc::now(),
        }
    }

    /// Whether nothing continues this contribution yet.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether `author` already voted to draft this storyline.
    pub fn has_draft_vote(&self, author: &AuthorId) -> bool {
        self.draft_votes.contains(author)
    }

    /// Whether `author` already voted to publish this final draft.
    pub fn has_publish_vote(&self, author: &AuthorId) -> bool {
        self.publish_votes.contains(author)
    }
}
