//! Contribution graph for a single story.
//!
//! Nodes live in an arena keyed by content identifier; links are
//! identifiers, never owned references. Parents must exist before their
//! children, so the graph is a tree by construction.
//!
//! ## Submission checks (in order)
//!
//! 1. `DuplicateContentId`: identifier already used anywhere in the story
//! 2. `ParentNotFound`: parent is not a node
//! 3. `BranchClosed`: an ancestor of the parent, or the parent itself, has
//!    left OPEN (the elected leader may still continue a DRAFTING parent)
//! 4. `DuplicateAuthorEdge`: author already continued this parent
//! 5. `NotFound`: author is not registered
//!
//! All checks run before the first write.

pub mod voting;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::StoryError;
use crate::leader::storyline_leader;
use crate::registry::AuthorDirectory;
use crate::types::{AuthorId, ContentId, Contribution, StoryEvent, StorylineEvent, StorylineState};

pub use voting::{has_quorum, required_votes, VoteTally};

/// How a submission was let through the branch gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Admission {
    /// Ordinary continuation of an open storyline.
    Open,
    /// The leader's final draft under a DRAFTING parent.
    FinalDraft,
}

/// The tree of contributions for one story.
///
/// Serialize-only: every node enters through [`ContributionGraph::submit`].
#[derive(Debug, Clone, Serialize)]
pub struct ContributionGraph {
    root: ContentId,
    /// Arena of nodes by content identifier.
    nodes: BTreeMap<ContentId, Contribution>,
    /// Identifiers in submission order (root first).
    order: Vec<ContentId>,
    journal: Vec<StoryEvent>,
}

impl ContributionGraph {
    /// Create a graph holding only the root contribution.
    pub fn new(root: ContentId, creator: AuthorId) -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(root.clone(), Contribution::root(root.clone(), creator.clone()));
        Self {
            order: vec![root.clone()],
            journal: vec![StoryEvent::StoryCreated {
                root: root.clone(),
                creator,
            }],
            root,
            nodes,
        }
    }

    /// Root content identifier.
    pub fn root(&self) -> &ContentId {
        &self.root
    }

    /// Number of contributions, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a graph holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `cid` is used in this story.
    pub fn contains(&self, cid: &ContentId) -> bool {
        self.nodes.contains_key(cid)
    }

    /// Fetch a contribution.
    pub fn get(&self, cid: &ContentId) -> Result<&Contribution, StoryError> {
        self.nodes
            .get(cid)
            .ok_or_else(|| StoryError::contribution_not_found(cid))
    }

    /// Direct continuations of `cid`, in submission order.
    pub fn children(&self, cid: &ContentId) -> Result<&[ContentId], StoryError> {
        Ok(&self.get(cid)?.children)
    }

    /// All contributions in submission order.
    pub fn contributions(&self) -> impl Iterator<Item = &Contribution> {
        self.order.iter().filter_map(|cid| self.nodes.get(cid))
    }

    /// Events recorded for this story, oldest first.
    pub fn journal(&self) -> &[StoryEvent] {
        &self.journal
    }

    /// Journal as JSON lines, one event per line.
    pub fn journal_jsonl(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for event in &self.journal {
            out.push_str(&serde_json::to_string(event)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Content identifiers from the root down to `leaf`.
    ///
    /// Length is always `depth + 1`.
    pub fn storyline(&self, leaf: &ContentId) -> Result<Vec<ContentId>, StoryError> {
        Ok(self
            .lineage(leaf)?
            .into_iter()
            .rev()
            .map(|node| node.cid.clone())
            .collect())
    }

    /// Authors along the storyline ending at `leaf`, root first, one entry
    /// per contribution.
    pub fn storyline_authors(&self, leaf: &ContentId) -> Result<Vec<AuthorId>, StoryError> {
        Ok(self
            .lineage(leaf)?
            .into_iter()
            .rev()
            .map(|node| node.author.clone())
            .collect())
    }

    /// Number of distinct authors along the storyline ending at `leaf`.
    pub fn distinct_authors(&self, leaf: &ContentId) -> Result<usize, StoryError> {
        let lineage = self.lineage(leaf)?;
        Ok(lineage
            .iter()
            .map(|node| &node.author)
            .collect::<BTreeSet<_>>()
            .len())
    }

    /// Current leader of the storyline ending at `leaf`.
    pub fn storyline_leader(&self, leaf: &ContentId) -> Result<AuthorId, StoryError> {
        let authors = self.storyline_authors(leaf)?;
        storyline_leader(&authors)
            .cloned()
            .ok_or_else(|| StoryError::contribution_not_found(leaf))
    }

    /// Submit `cid` as a continuation of `parent` by `author`.
    ///
    /// On success the parent's author gains one reputation point through
    /// `directory` if it is someone other than `author`.
    pub fn submit<D: AuthorDirectory + ?Sized>(
        &mut self,
        cid: ContentId,
        parent: &ContentId,
        author: &AuthorId,
        directory: &mut D,
    ) -> Result<ContentId, StoryError> {
        let admission = self.admit(&cid, parent, author, &*directory)?;

        let parent_node = self
            .nodes
            .get_mut(parent)
            .ok_or_else(|| StoryError::ParentNotFound(parent.clone()))?;
        parent_node.children.push(cid.clone());
        let parent_author = parent_node.author.clone();
        let depth = parent_node.depth + 1;

        let mut node = Contribution::child(cid.clone(), parent.clone(), author.clone(), depth);
        if admission == Admission::FinalDraft {
            node.state = StorylineState::FinalReview;
        }
        self.nodes.insert(cid.clone(), node);
        self.order.push(cid.clone());
        self.journal.push(StoryEvent::ContributionAdded {
            cid: cid.clone(),
            parent: parent.clone(),
            author: author.clone(),
        });
        debug!(cid = %cid, parent = %parent, author = %author, depth, "contribution added");

        if parent_author != *author {
            directory.award_reputation(&parent_author);
            self.journal.push(StoryEvent::ReputationAwarded {
                author: parent_author,
                derived_from: parent.clone(),
            });
        }

        if admission == Admission::FinalDraft {
            self.open_final_review(&cid, parent, author)?;
        }

        Ok(cid)
    }

    /// Run every submission check without mutating anything.
    fn admit<D: AuthorDirectory + ?Sized>(
        &self,
        cid: &ContentId,
        parent: &ContentId,
        author: &AuthorId,
        directory: &D,
    ) -> Result<Admission, StoryError> {
        if self.nodes.contains_key(cid) {
            return Err(StoryError::DuplicateContentId(cid.clone()));
        }
        if !self.nodes.contains_key(parent) {
            return Err(StoryError::ParentNotFound(parent.clone()));
        }

        // Parent first, root last.
        let lineage = self.lineage(parent)?;
        if let Some(closed) = lineage
            .iter()
            .skip(1)
            .find(|node| node.state != StorylineState::Open)
        {
            return Err(StoryError::BranchClosed {
                cid: closed.cid.clone(),
                state: closed.state,
            });
        }

        let parent_node = lineage[0];
        let admission = match parent_node.state {
            StorylineState::Open => Admission::Open,
            StorylineState::Drafting => {
                let authors: Vec<AuthorId> =
                    lineage.iter().rev().map(|node| node.author.clone()).collect();
                if storyline_leader(&authors) == Some(author) {
                    Admission::FinalDraft
                } else {
                    return Err(StoryError::BranchClosed {
                        cid: parent.clone(),
                        state: parent_node.state,
                    });
                }
            }
            state => {
                return Err(StoryError::BranchClosed {
                    cid: parent.clone(),
                    state,
                })
            }
        };

        let already_continued = parent_node
            .children
            .iter()
            .filter_map(|child| self.nodes.get(child))
            .any(|child| &child.author == author);
        if already_continued {
            return Err(StoryError::DuplicateAuthorEdge {
                author: author.clone(),
                parent: parent.clone(),
            });
        }

        if !directory.is_registered(author) {
            return Err(StoryError::author_not_found(author));
        }

        Ok(admission)
    }

    /// Nodes from `cid` up to the root (tip first). O(depth).
    fn lineage(&self, cid: &ContentId) -> Result<Vec<&Contribution>, StoryError> {
        let tip = self.get(cid)?;
        let mut lineage = Vec::with_capacity(tip.depth as usize + 1);
        let mut current = Some(tip);
        while let Some(node) = current {
            lineage.push(node);
            current = match &node.parent {
                Some(parent) => Some(self.get(parent)?),
                None => None,
            };
        }
        Ok(lineage)
    }

    /// Apply `trigger` to `cid` through the transition table.
    fn advance(
        &mut self,
        cid: &ContentId,
        trigger: StorylineEvent,
    ) -> Result<StorylineState, StoryError> {
        let node = self
            .nodes
            .get_mut(cid)
            .ok_or_else(|| StoryError::contribution_not_found(cid))?;
        let from = node.state;
        let to = from.on(trigger).ok_or_else(|| StoryError::InvalidState {
            cid: cid.clone(),
            state: from,
        })?;
        node.state = to;

        info!(cid = %cid, from = %from, to = %to, trigger = ?trigger, "storyline state changed");
        self.journal.push(StoryEvent::StateChanged {
            cid: cid.clone(),
            from,
            to,
            trigger,
        });
        Ok(to)
    }
}
