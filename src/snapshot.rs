//! Story snapshot identity.
//!
//! A `StorySnapshot` fingerprints the state of one story's contribution
//! graph so two replicas can tell whether they agree. Timestamps are
//! excluded: identical operation sequences yield identical snapshot ids.

use std::hash::Hasher;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh64::Xxh64;

use crate::canonical::canonical_hash_hex;
use crate::graph::ContributionGraph;
use crate::types::StorylineState;
use crate::STORYSHARE_SCHEMA_VERSION;

/// A deterministic fingerprint of a story's graph state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorySnapshot {
    /// xxh64 of all components below.
    pub snapshot_id: String,
    /// Root content identifier.
    pub root: String,
    /// Number of contributions, root included.
    pub contribution_count: u64,
    /// Number of published contributions.
    pub published_count: u64,
    /// Deepest contribution (root = 0).
    pub max_depth: u32,
    /// Schema version used for types.
    pub schema_version: String,
    /// Hash of sorted (cid, parent, author, state) rows.
    pub structure_hash: String,
    /// Hash of every node's draft and publish votes, in vote order.
    pub vote_hash: String,
    /// Unix timestamp when this snapshot was computed. Not hashed.
    pub computed_at: i64,
}

#[derive(Serialize)]
struct StructureRow<'a> {
    cid: &'a str,
    parent: Option<&'a str>,
    author: &'a str,
    state: StorylineState,
}

#[derive(Serialize)]
struct SnapshotIdInput<'a> {
    root: &'a str,
    contribution_count: u64,
    published_count: u64,
    max_depth: u32,
    schema_version: &'a str,
    structure_hash: &'a str,
    vote_hash: &'a str,
}

impl StorySnapshot {
    /// Fingerprint `graph` as it stands now.
    pub fn compute(graph: &ContributionGraph) -> Result<Self, serde_json::Error> {
        let mut nodes: Vec<_> = graph.contributions().collect();
        nodes.sort_by(|a, b| a.cid.cmp(&b.cid));

        let rows: Vec<StructureRow<'_>> = nodes
            .iter()
            .map(|node| StructureRow {
                cid: node.cid.as_str(),
                parent: node.parent.as_ref().map(|p| p.as_str()),
                author: node.author.as_str(),
                state: node.state,
            })
            .collect();
        let structure_hash = canonical_hash_hex(&rows)?;

        let mut hasher = Xxh64::new(0);
        for node in &nodes {
            hasher.write(node.cid.as_str().as_bytes());
            hasher.write(&(node.draft_votes.len() as u64).to_le_bytes());
            for voter in &node.draft_votes {
                hasher.write(voter.as_str().as_bytes());
                hasher.write(&[0]);
            }
            hasher.write(&(node.publish_votes.len() as u64).to_le_bytes());
            for voter in &node.publish_votes {
                hasher.write(voter.as_str().as_bytes());
                hasher.write(&[0]);
            }
        }
        let vote_hash = format!("{:016x}", hasher.finish());

        let contribution_count = nodes.len() as u64;
        let published_count = nodes
            .iter()
            .filter(|node| node.state == StorylineState::Published)
            .count() as u64;
        let max_depth = nodes.iter().map(|node| node.depth).max().unwrap_or(0);

        let snapshot_id = canonical_hash_hex(&SnapshotIdInput {
            root: graph.root().as_str(),
            contribution_count,
            published_count,
            max_depth,
            schema_version: STORYSHARE_SCHEMA_VERSION,
            structure_hash: &structure_hash,
            vote_hash: &vote_hash,
        })?;

        Ok(Self {
            snapshot_id,
            root: graph.root().to_string(),
            contribution_count,
            published_count,
            max_depth,
            schema_version: STORYSHARE_SCHEMA_VERSION.to_string(),
            structure_hash,
            vote_hash,
            computed_at: chrono::Utc::now().timestamp(),
        })
    }

    /// Whether `graph` still matches this snapshot.
    pub fn verify(&self, graph: &ContributionGraph) -> Result<bool, serde_json::Error> {
        Ok(Self::compute(graph)?.snapshot_id == self.snapshot_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::AuthorRegistry;
    use crate::types::{AuthorId, ContentId};

    fn build(order: &[(&str, &str, &str)]) -> ContributionGraph {
        let mut authors = AuthorRegistry::new();
        for id in ["owner", "x", "y"] {
            authors.create(AuthorId::from(id), id, ContentId::from("pic")).unwrap();
        }
        let mut graph = ContributionGraph::new(ContentId::from("R"), AuthorId::from("owner"));
        for (cid, parent, author) in order {
            graph
                .submit(
                    ContentId::from(*cid),
                    &ContentId::from(*parent),
                    &AuthorId::from(*author),
                    &mut authors,
                )
                .unwrap();
        }
        graph
    }

    #[test]
    fn test_same_operations_same_snapshot() {
        let ops = [("A", "R", "x"), ("B", "A", "y")];
        let a = StorySnapshot::compute(&build(&ops)).unwrap();
        let b = StorySnapshot::compute(&build(&ops)).unwrap();

        assert_eq!(a.snapshot_id, b.snapshot_id);
        assert_eq!(a.contribution_count, 3);
        assert_eq!(a.max_depth, 2);
        assert_eq!(a.schema_version, STORYSHARE_SCHEMA_VERSION);
    }

    #[test]
    fn test_structure_change_changes_snapshot() {
        let a = StorySnapshot::compute(&build(&[("A", "R", "x")])).unwrap();
        let b = StorySnapshot::compute(&build(&[("A", "R", "y")])).unwrap();
        assert_ne!(a.structure_hash, b.structure_hash);
        assert_ne!(a.snapshot_id, b.snapshot_id);
    }

    #[test]
    fn test_vote_changes_snapshot() {
        let mut graph = build(&[("A", "R", "x")]);
        let before = StorySnapshot::compute(&graph).unwrap();

        graph
            .vote_to_draft(&ContentId::from("A"), &AuthorId::from("x"))
            .unwrap();

        assert_ne!(StorySnapshot::compute(&graph).unwrap().vote_hash, before.vote_hash);
        assert!(!before.verify(&graph).unwrap());
    }
}
