//! # storyshare-kernel
//!
//! Collaborative branching stories with per-storyline publication votes.
//!
//! A story is a tree of contributions. Every root-to-node path is a
//! storyline, and its authors vote first to close it for drafting and then
//! to publish the leader's final draft.
//!
//! ## Core Contract
//!
//! 1. Content identifiers are unique within a story, root included
//! 2. An author continues any given contribution at most once
//! 3. Lifecycle states only move forward, one voting phase per path
//! 4. A rejected operation mutates nothing
//!
//! ## Architecture
//!
//! ```text
//! submit ──→ ContributionGraph ──→ AuthorDirectory (reputation)
//!                  │
//! vote ─────→ voting ──→ leader election (final draft gate)
//!                  │
//!            StorySnapshot (xxh64 fingerprint)
//! ```
//!
//! [`StoryShare`] owns both registries behind one `parking_lot::RwLock`.
//!
//! ## Lifecycle
//!
//! ```text
//! OPEN → DRAFTING → DRAFTING_END → PUBLISHED
//!                        │
//!                        └─ leader's final draft: FINAL_REVIEW → PUBLISHED
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod error;
pub mod leader;
pub mod graph;
pub mod registry;
pub mod canonical;
pub mod snapshot;
pub mod platform;
pub mod telemetry;

// Re-exports
pub use types::{Author, AuthorId, ContentId, Contribution, StoryEvent, StorylineEvent, StorylineState};
pub use error::{Missing, StoryError};
pub use leader::storyline_leader;
pub use graph::{has_quorum, required_votes, ContributionGraph, VoteTally};
pub use registry::{AuthorDirectory, AuthorRegistry, Story, StoryHandle, StoryRegistry};
pub use canonical::{canonical_hash, canonical_hash_hex, to_canonical_bytes};
pub use snapshot::StorySnapshot;
pub use platform::StoryShare;
pub use telemetry::{init_tracing, LogFormat, TelemetryConfig, TelemetryError};

/// Schema version for hashed story state.
///
/// Bump this when a change alters snapshot ids for the same operations.
pub const STORYSHARE_SCHEMA_VERSION: &str = "1.0.0";
