//! The StoryShare platform: one author registry and one story registry
//! behind a single reader/writer lock.
//!
//! Every mutating call holds the write lock for its whole duration, and
//! every check runs before the first write, so a rejected call leaves no
//! trace. Reads return owned clones taken under the read lock.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use crate::error::StoryError;
use crate::graph::VoteTally;
use crate::registry::{AuthorRegistry, Story, StoryHandle, StoryRegistry};
use crate::snapshot::StorySnapshot;
use crate::types::{Author, AuthorId, ContentId, Contribution, StoryEvent, StorylineState};

#[derive(Debug, Default)]
struct PlatformState {
    authors: AuthorRegistry,
    stories: StoryRegistry,
}

/// Shared handle to the platform. Clones share state.
#[derive(Default)]
pub struct StoryShare {
    state: Arc<RwLock<PlatformState>>,
}

impl Clone for StoryShare {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

/// Log a rejected mutation with its error code and pass the error through.
fn rejected(operation: &'static str) -> impl Fn(StoryError) -> StoryError {
    move |err| {
        warn!(operation, code = err.code(), error = %err, "request rejected");
        err
    }
}

impl StoryShare {
    /// Create an empty platform.
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Authors
    // ─────────────────────────────────────────────────────────────────────

    /// Register an author with zero reputation.
    pub fn create_author(
        &self,
        id: AuthorId,
        name: impl Into<String>,
        profile_pic: ContentId,
    ) -> Result<Author, StoryError> {
        self.state
            .write()
            .authors
            .create(id, name, profile_pic)
            .cloned()
            .map_err(rejected("create_author"))
    }

    /// Look up an author.
    pub fn author(&self, id: &AuthorId) -> Result<Author, StoryError> {
        self.state.read().authors.get(id).cloned()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Stories
    // ─────────────────────────────────────────────────────────────────────

    /// Create a story rooted at `root`, authored by `creator`.
    pub fn create_story(
        &self,
        creator: AuthorId,
        root: ContentId,
        title: impl Into<String>,
        summary: impl Into<String>,
        genre: impl Into<String>,
    ) -> Result<StoryHandle, StoryError> {
        let mut guard = self.state.write();
        let PlatformState { authors, stories } = &mut *guard;
        stories
            .create(&*authors, creator, root, title, summary, genre)
            .map_err(rejected("create_story"))
    }

    /// Resolve a story by its root content identifier.
    pub fn story_by_content_id(&self, root: &ContentId) -> Result<StoryHandle, StoryError> {
        self.state.read().stories.handle_for(root)
    }

    /// Clone of a story, graph included.
    pub fn story(&self, handle: &StoryHandle) -> Result<Story, StoryError> {
        self.state.read().stories.get(handle).cloned()
    }

    /// Handles of every story in creation order.
    pub fn stories(&self) -> Vec<StoryHandle> {
        self.state.read().stories.iter().map(Story::handle).collect()
    }

    /// Pin the featured story. The identifier need not name a story yet.
    pub fn set_featured_story_cid(&self, cid: ContentId) {
        self.state.write().stories.set_featured(cid);
    }

    /// Identifier the featured pointer names, if any.
    pub fn featured_story_cid(&self) -> Option<ContentId> {
        self.state.read().stories.featured_cid().cloned()
    }

    /// Whether the featured story was pinned, so creation no longer moves it.
    pub fn is_featured_story_pinned(&self) -> bool {
        self.state.read().stories.is_featured_pinned()
    }

    /// The featured story.
    pub fn featured_story(&self) -> Result<Story, StoryError> {
        self.state.read().stories.featured().cloned()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Contributions
    // ─────────────────────────────────────────────────────────────────────

    /// Submit `cid` as `author`'s continuation of `parent`.
    pub fn contribute(
        &self,
        handle: &StoryHandle,
        author: &AuthorId,
        cid: ContentId,
        parent: &ContentId,
    ) -> Result<ContentId, StoryError> {
        let mut guard = self.state.write();
        let PlatformState { authors, stories } = &mut *guard;
        stories
            .get_mut(handle)
            .and_then(|story| story.graph_mut().submit(cid, parent, author, authors))
            .map_err(rejected("contribute"))
    }

    /// Fetch a contribution.
    pub fn contribution(
        &self,
        handle: &StoryHandle,
        cid: &ContentId,
    ) -> Result<Contribution, StoryError> {
        self.read_story(handle, |story| story.graph().get(cid).cloned())
    }

    /// Direct continuations of `cid`, in submission order.
    pub fn children(
        &self,
        handle: &StoryHandle,
        cid: &ContentId,
    ) -> Result<Vec<ContentId>, StoryError> {
        self.read_story(handle, |story| Ok(story.graph().children(cid)?.to_vec()))
    }

    /// Identifiers from the root down to `leaf`.
    pub fn storyline(
        &self,
        handle: &StoryHandle,
        leaf: &ContentId,
    ) -> Result<Vec<ContentId>, StoryError> {
        self.read_story(handle, |story| story.graph().storyline(leaf))
    }

    /// Authors along the storyline ending at `leaf`, one per contribution.
    pub fn storyline_authors(
        &self,
        handle: &StoryHandle,
        leaf: &ContentId,
    ) -> Result<Vec<AuthorId>, StoryError> {
        self.read_story(handle, |story| story.graph().storyline_authors(leaf))
    }

    /// Current leader of the storyline ending at `leaf`.
    pub fn storyline_leader(
        &self,
        handle: &StoryHandle,
        leaf: &ContentId,
    ) -> Result<AuthorId, StoryError> {
        self.read_story(handle, |story| story.graph().storyline_leader(leaf))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Voting
    // ─────────────────────────────────────────────────────────────────────

    /// Vote to close the storyline ending at `cid` for drafting.
    pub fn vote_to_draft(
        &self,
        handle: &StoryHandle,
        cid: &ContentId,
        voter: &AuthorId,
    ) -> Result<StorylineState, StoryError> {
        self.write_story(handle, |story| story.graph_mut().vote_to_draft(cid, voter))
            .map_err(rejected("vote_to_draft"))
    }

    /// Vote to publish the final draft `cid`.
    pub fn vote_to_publish(
        &self,
        handle: &StoryHandle,
        cid: &ContentId,
        voter: &AuthorId,
    ) -> Result<StorylineState, StoryError> {
        self.write_story(handle, |story| story.graph_mut().vote_to_publish(cid, voter))
            .map_err(rejected("vote_to_publish"))
    }

    /// Draft voters on `cid`, in vote order.
    pub fn draft_votes(
        &self,
        handle: &StoryHandle,
        cid: &ContentId,
    ) -> Result<Vec<AuthorId>, StoryError> {
        self.read_story(handle, |story| Ok(story.graph().draft_votes(cid)?.to_vec()))
    }

    /// Publish voters on `cid`, in vote order.
    pub fn publish_votes(
        &self,
        handle: &StoryHandle,
        cid: &ContentId,
    ) -> Result<Vec<AuthorId>, StoryError> {
        self.read_story(handle, |story| Ok(story.graph().publish_votes(cid)?.to_vec()))
    }

    /// Standing of the draft vote on `cid`.
    pub fn draft_tally(&self, handle: &StoryHandle, cid: &ContentId) -> Result<VoteTally, StoryError> {
        self.read_story(handle, |story| story.graph().draft_tally(cid))
    }

    /// Standing of the publish vote on `cid`.
    pub fn publish_tally(&self, handle: &StoryHandle, cid: &ContentId) -> Result<VoteTally, StoryError> {
        self.read_story(handle, |story| story.graph().publish_tally(cid))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Bookmarks, journal, snapshot
    // ─────────────────────────────────────────────────────────────────────

    /// Save `reader`'s place in a story.
    pub fn bookmark(
        &self,
        handle: &StoryHandle,
        reader: AuthorId,
        cid: ContentId,
    ) -> Result<(), StoryError> {
        self.write_story(handle, |story| story.bookmark(reader, cid))
            .map_err(rejected("bookmark"))
    }

    /// Where `reader` last saved their place.
    pub fn bookmark_of(
        &self,
        handle: &StoryHandle,
        reader: &AuthorId,
    ) -> Result<Option<ContentId>, StoryError> {
        self.read_story(handle, |story| Ok(story.bookmark_of(reader).cloned()))
    }

    /// Events recorded for a story, oldest first.
    pub fn events(&self, handle: &StoryHandle) -> Result<Vec<StoryEvent>, StoryError> {
        self.read_story(handle, |story| Ok(story.graph().journal().to_vec()))
    }

    /// Fingerprint of a story's current graph state.
    pub fn snapshot(&self, handle: &StoryHandle) -> Result<StorySnapshot, StoryError> {
        self.read_story(handle, |story| Ok(StorySnapshot::compute(story.graph())?))
    }

    fn read_story<T>(
        &self,
        handle: &StoryHandle,
        f: impl FnOnce(&Story) -> Result<T, StoryError>,
    ) -> Result<T, StoryError> {
        let state = self.state.read();
        let story = state.stories.get(handle)?;
        f(story)
    }

    fn write_story<T>(
        &self,
        handle: &StoryHandle,
        f: impl FnOnce(&mut Story) -> Result<T, StoryError>,
    ) -> Result<T, StoryError> {
        let mut state = self.state.write();
        let story = state.stories.get_mut(handle)?;
        f(story)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform() -> StoryShare {
        let platform = StoryShare::new();
        for id in ["owner", "x"] {
            platform
                .create_author(AuthorId::from(id), id, ContentId::from("pic"))
                .unwrap();
        }
        platform
    }

    #[test]
    fn test_clones_share_state() {
        let platform = platform();
        let other = platform.clone();

        other
            .create_story(AuthorId::from("owner"), ContentId::from("R"), "t", "s", "g")
            .unwrap();

        assert_eq!(platform.stories().len(), 1);
        assert_eq!(platform.featured_story_cid(), Some(ContentId::from("R")));
    }

    #[test]
    fn test_contribute_awards_reputation() {
        let platform = platform();
        let story = platform
            .create_story(AuthorId::from("owner"), ContentId::from("R"), "t", "s", "g")
            .unwrap();

        platform
            .contribute(&story, &AuthorId::from("x"), ContentId::from("C1"), &ContentId::from("R"))
            .unwrap();

        assert_eq!(platform.author(&AuthorId::from("owner")).unwrap().reputation, 1);
        assert_eq!(
            platform.children(&story, &ContentId::from("R")).unwrap(),
            vec![ContentId::from("C1")]
        );
    }

    #[test]
    fn test_unknown_story_handle() {
        let platform = platform();
        let err = platform.story_by_content_id(&ContentId::from("nope")).unwrap_err();
        assert_eq!(err, StoryError::story_not_found(&ContentId::from("nope")));
    }

    #[test]
    fn test_rejection_leaves_no_trace() {
        let platform = platform();
        let story = platform
            .create_story(AuthorId::from("owner"), ContentId::from("R"), "t", "s", "g")
            .unwrap();
        let before = platform.snapshot(&story).unwrap();
        let events = platform.events(&story).unwrap().len();

        let err = platform
            .contribute(&story, &AuthorId::from("x"), ContentId::from("R"), &ContentId::from("R"))
            .unwrap_err();

        assert_eq!(err.code(), "DUPLICATE_CONTENT_ID");
        assert_eq!(platform.events(&story).unwrap().len(), events);
        assert_eq!(platform.snapshot(&story).unwrap().snapshot_id, before.snapshot_id);
    }
}
