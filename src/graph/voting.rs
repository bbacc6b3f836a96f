//! Per-storyline voting.
//!
//! A storyline is identified by its leaf, so draft votes are only taken on
//! a contribution nothing continues yet. Eligible voters are the distinct
//! authors along the path from the root to that node, and a vote passes
//! once voters strictly outnumber half of them:
//!
//! ```text
//! OPEN --draft quorum--> DRAFTING --leader's final draft--> DRAFTING_END
//!                                        |
//!                                        +--> new child in FINAL_REVIEW
//!
//! FINAL_REVIEW --publish quorum--> PUBLISHED (and DRAFTING_END parent too)
//! ```
//!
//! Every check runs before the vote is recorded.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoryError;
use crate::types::{AuthorId, ContentId, StoryEvent, StorylineEvent, StorylineState};
use super::ContributionGraph;

/// Whether `votes` is a strict majority of `eligible` voters.
pub fn has_quorum(votes: usize, eligible: usize) -> bool {
    votes * 2 > eligible
}

/// Smallest number of votes that reaches quorum among `eligible` voters.
pub fn required_votes(eligible: usize) -> usize {
    eligible / 2 + 1
}

/// Current standing of a draft or publish vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    /// Node being voted on.
    pub cid: ContentId,
    /// Its current state.
    pub state: StorylineState,
    /// Voters so far, in vote order.
    pub votes: Vec<AuthorId>,
    /// Distinct authors on the storyline.
    pub eligible: usize,
    /// Votes needed for quorum.
    pub required: usize,
}

impl VoteTally {
    /// Whether the recorded votes reach quorum.
    pub fn has_quorum(&self) -> bool {
        has_quorum(self.votes.len(), self.eligible)
    }
}

impl ContributionGraph {
    /// Vote to close the storyline ending at `cid` to public submissions.
    ///
    /// Returns the node's state after the vote.
    pub fn vote_to_draft(
        &mut self,
        cid: &ContentId,
        voter: &AuthorId,
    ) -> Result<StorylineState, StoryError> {
        let eligible = self.eligible_voters(cid, voter)?;
        if self.get(cid)?.has_draft_vote(voter) {
            return Err(StoryError::AlreadyVoted {
                voter: voter.clone(),
                cid: cid.clone(),
            });
        }
        self.ensure_draftable(cid)?;

        let node = self
            .nodes
            .get_mut(cid)
            .ok_or_else(|| StoryError::contribution_not_found(cid))?;
        node.draft_votes.push(voter.clone());
        let votes = node.draft_votes.len();
        self.journal.push(StoryEvent::DraftVoteCast {
            cid: cid.clone(),
            voter: voter.clone(),
        });
        debug!(cid = %cid, voter = %voter, votes, eligible, "draft vote recorded");

        if has_quorum(votes, eligible) {
            let state = self.advance(cid, StorylineEvent::DraftQuorumReached)?;
            let leader = self.storyline_leader(cid)?;
            info!(cid = %cid, leader = %leader, "storyline closed for drafting");
            return Ok(state);
        }
        Ok(StorylineState::Open)
    }

    /// Vote to publish the final draft `cid`.
    ///
    /// Returns the node's state after the vote.
    pub fn vote_to_publish(
        &mut self,
        cid: &ContentId,
        voter: &AuthorId,
    ) -> Result<StorylineState, StoryError> {
        let eligible = self.eligible_voters(cid, voter)?;
        let node = self.get(cid)?;
        if node.has_publish_vote(voter) {
            return Err(StoryError::AlreadyVoted {
                voter: voter.clone(),
                cid: cid.clone(),
            });
        }
        if node.state != StorylineState::FinalReview {
            return Err(StoryError::InvalidState {
                cid: cid.clone(),
                state: node.state,
            });
        }
        let publishes = has_quorum(node.publish_votes.len() + 1, eligible);
        if publishes {
            self.ensure_publishable_predecessor(cid)?;
        }

        self.record_publish_vote(cid, voter)?;
        if publishes {
            self.publish(cid)?;
        }
        Ok(self.get(cid)?.state)
    }

    /// Voters who asked to draft `cid`, in vote order.
    pub fn draft_votes(&self, cid: &ContentId) -> Result<&[AuthorId], StoryError> {
        Ok(&self.get(cid)?.draft_votes)
    }

    /// Voters who asked to publish `cid`, in vote order.
    pub fn publish_votes(&self, cid: &ContentId) -> Result<&[AuthorId], StoryError> {
        Ok(&self.get(cid)?.publish_votes)
    }

    /// Standing of the draft vote on `cid`.
    pub fn draft_tally(&self, cid: &ContentId) -> Result<VoteTally, StoryError> {
        let votes = self.draft_votes(cid)?.to_vec();
        self.tally(cid, votes)
    }

    /// Standing of the publish vote on `cid`.
    pub fn publish_tally(&self, cid: &ContentId) -> Result<VoteTally, StoryError> {
        let votes = self.publish_votes(cid)?.to_vec();
        self.tally(cid, votes)
    }

    /// Finish a leader's final draft: close the drafting parent, count the
    /// leader's own publish vote, and publish at once if that is quorum.
    pub(super) fn open_final_review(
        &mut self,
        cid: &ContentId,
        parent: &ContentId,
        leader: &AuthorId,
    ) -> Result<(), StoryError> {
        self.advance(parent, StorylineEvent::FinalDraftSubmitted)?;
        self.record_publish_vote(cid, leader)?;

        let eligible = self.distinct_authors(cid)?;
        if has_quorum(1, eligible) {
            self.publish(cid)?;
        }
        Ok(())
    }

    fn tally(&self, cid: &ContentId, votes: Vec<AuthorId>) -> Result<VoteTally, StoryError> {
        let eligible = self.distinct_authors(cid)?;
        Ok(VoteTally {
            cid: cid.clone(),
            state: self.get(cid)?.state,
            votes,
            eligible,
            required: required_votes(eligible),
        })
    }

    /// Distinct path authors, failing `NotAnAuthor` if `voter` is not one.
    fn eligible_voters(&self, cid: &ContentId, voter: &AuthorId) -> Result<usize, StoryError> {
        let authors = self.storyline_authors(cid)?;
        if !authors.contains(voter) {
            return Err(StoryError::NotAnAuthor {
                voter: voter.clone(),
                cid: cid.clone(),
            });
        }
        Ok(authors.iter().collect::<BTreeSet<_>>().len())
    }

    /// Only an OPEN leaf under an all-OPEN path can be drafted.
    fn ensure_draftable(&self, cid: &ContentId) -> Result<(), StoryError> {
        let lineage = self.lineage(cid)?;
        let tip = lineage[0];
        if tip.state != StorylineState::Open || !tip.is_leaf() {
            return Err(StoryError::InvalidState {
                cid: tip.cid.clone(),
                state: tip.state,
            });
        }
        if let Some(blocking) = lineage
            .iter()
            .skip(1)
            .find(|node| node.state != StorylineState::Open)
        {
            return Err(StoryError::InvalidState {
                cid: blocking.cid.clone(),
                state: blocking.state,
            });
        }
        Ok(())
    }

    fn ensure_publishable_predecessor(&self, cid: &ContentId) -> Result<(), StoryError> {
        let Some(parent) = &self.get(cid)?.parent else {
            return Ok(());
        };
        let predecessor = self.get(parent)?;
        if predecessor
            .state
            .on(StorylineEvent::PublishQuorumReached)
            .is_none()
        {
            return Err(StoryError::InvalidState {
                cid: parent.clone(),
                state: predecessor.state,
            });
        }
        Ok(())
    }

    fn record_publish_vote(&mut self, cid: &ContentId, voter: &AuthorId) -> Result<(), StoryError> {
        let node = self
            .nodes
            .get_mut(cid)
            .ok_or_else(|| StoryError::contribution_not_found(cid))?;
        node.publish_votes.push(voter.clone());
        let votes = node.publish_votes.len();
        self.journal.push(StoryEvent::PublishVoteCast {
            cid: cid.clone(),
            voter: voter.clone(),
        });
        debug!(cid = %cid, voter = %voter, votes, "publish vote recorded");
        Ok(())
    }

    /// Publish the final draft and the DRAFTING_END node it closed.
    fn publish(&mut self, cid: &ContentId) -> Result<(), StoryError> {
        self.advance(cid, StorylineEvent::PublishQuorumReached)?;
        if let Some(parent) = self.get(cid)?.parent.clone() {
            self.advance(&parent, StorylineEvent::PublishQuorumReached)?;
        }
        info!(cid = %cid, "storyline published");
        Ok(())
    }
}
