//! Story registry and featured-story selection.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Missing, StoryError};
use crate::graph::ContributionGraph;
use crate::types::{AuthorId, ContentId};
use super::AuthorDirectory;

/// Stable reference to a story, by its root content identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryHandle(ContentId);

impl StoryHandle {
    /// Root content identifier of the story.
    pub fn root(&self) -> &ContentId {
        &self.0
    }
}

impl std::fmt::Display for StoryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "story:{}", self.0)
    }
}

/// A story: immutable metadata plus the contribution graph it owns.
#[derive(Debug, Clone)]
pub struct Story {
    /// Root content identifier.
    pub root: ContentId,
    /// Title.
    pub title: String,
    /// Short summary.
    pub summary: String,
    /// Genre tag.
    pub genre: String,
    /// Author of the root contribution.
    pub creator: AuthorId,
    /// When the story was created.
    pub created_at: DateTime<Utc>,
    graph: ContributionGraph,
    bookmarks: BTreeMap<AuthorId, ContentId>,
}

impl Story {
    /// Handle for this story.
    pub fn handle(&self) -> StoryHandle {
        StoryHandle(self.root.clone())
    }

    /// The story's contribution graph.
    pub fn graph(&self) -> &ContributionGraph {
        &self.graph
    }

    pub(crate) fn graph_mut(&mut self) -> &mut ContributionGraph {
        &mut self.graph
    }

    /// Save `reader`'s place at `cid`, replacing any earlier bookmark.
    pub fn bookmark(&mut self, reader: AuthorId, cid: ContentId) -> Result<(), StoryError> {
        if !self.graph.contains(&cid) {
            return Err(StoryError::contribution_not_found(&cid));
        }
        self.bookmarks.insert(reader, cid);
        Ok(())
    }

    /// Where `reader` last saved their place, if anywhere.
    pub fn bookmark_of(&self, reader: &AuthorId) -> Option<&ContentId> {
        self.bookmarks.get(reader)
    }
}

/// Registry of stories.
///
/// The featured story follows the most recently created story until a
/// caller pins one with [`StoryRegistry::set_featured`]; after that,
/// creation never moves the pointer again.
#[derive(Debug, Clone, Default)]
pub struct StoryRegistry {
    stories: BTreeMap<ContentId, Story>,
    /// Root ids in creation order.
    order: Vec<ContentId>,
    featured: Option<ContentId>,
    pinned: bool,
}

impl StoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a story whose root contribution is authored by `creator`.
    pub fn create<D: AuthorDirectory + ?Sized>(
        &mut self,
        directory: &D,
        creator: AuthorId,
        root: ContentId,
        title: impl Into<String>,
        summary: impl Into<String>,
        genre: impl Into<String>,
    ) -> Result<StoryHandle, StoryError> {
        if self.stories.contains_key(&root) {
            return Err(StoryError::DuplicateContentId(root));
        }
        if !directory.is_registered(&creator) {
            return Err(StoryError::author_not_found(&creator));
        }

        let story = Story {
            root: root.clone(),
            title: title.into(),
            summary: summary.into(),
            genre: genre.into(),
            creator: creator.clone(),
            created_at: Utc::now(),
            graph: ContributionGraph::new(root.clone(), creator.clone()),
            bookmarks: BTreeMap::new(),
        };
        self.stories.insert(root.clone(), story);
        self.order.push(root.clone());

        if !self.pinned {
            self.featured = Some(root.clone());
        }

        info!(
            root = %root,
            creator = %creator,
            featured = !self.pinned,
            "story created"
        );
        Ok(StoryHandle(root))
    }

    /// Resolve a story by its root content identifier.
    pub fn handle_for(&self, root: &ContentId) -> Result<StoryHandle, StoryError> {
        self.stories
            .get(root)
            .map(Story::handle)
            .ok_or_else(|| StoryError::story_not_found(root))
    }

    /// Look up a story.
    pub fn get(&self, handle: &StoryHandle) -> Result<&Story, StoryError> {
        self.stories
            .get(handle.root())
            .ok_or_else(|| StoryError::story_not_found(handle.root()))
    }

    /// Look up a story for mutation.
    pub fn get_mut(&mut self, handle: &StoryHandle) -> Result<&mut Story, StoryError> {
        self.stories
            .get_mut(handle.root())
            .ok_or_else(|| StoryError::story_not_found(handle.root()))
    }

    /// Pin the featured story. The story need not exist yet.
    pub fn set_featured(&mut self, cid: ContentId) {
        info!(cid = %cid, "featured story pinned");
        self.featured = Some(cid);
        self.pinned = true;
    }

    /// Content identifier the featured pointer names.
    pub fn featured_cid(&self) -> Option<&ContentId> {
        self.featured.as_ref()
    }

    /// Whether a caller has pinned the featured story.
    pub fn is_featured_pinned(&self) -> bool {
        self.pinned
    }

    /// The featured story.
    ///
    /// Fails `NotFound` when nothing is featured or the pinned identifier
    /// names no story.
    pub fn featured(&self) -> Result<&Story, StoryError> {
        let cid = self
            .featured
            .as_ref()
            .ok_or(StoryError::NotFound(Missing::FeaturedStory))?;
        self.stories
            .get(cid)
            .ok_or_else(|| StoryError::story_not_found(cid))
    }

    /// Stories in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Story> {
        self.order.iter().filter_map(|root| self.stories.get(root))
    }

    /// Number of stories.
    pub fn len(&self) -> usize {
        self.stories.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::AuthorRegistry;

    const STORY_CID: &str = "bafykbzacea5alvq742sh5aakjhbhychtgs3ihol7dk4t2xtiye32vxz2tyd3m";
    const OTHER_STORY_CID: &str = "safykbzacea5alvq742sh5aakjhbhychtgs3ihol7dk4t2xtiye32vxz2tyd3m";

    fn authors() -> AuthorRegistry {
        let mut authors = AuthorRegistry::new();
        authors
            .create(AuthorId::from("creator"), "creator", ContentId::from("pic"))
            .unwrap();
        authors
    }

    fn create(registry: &mut StoryRegistry, authors: &AuthorRegistry, cid: &str) -> Result<StoryHandle, StoryError> {
        registry.create(
            authors,
            AuthorId::from("creator"),
            ContentId::from(cid),
            "title",
            "a thriller about a boy born with wings",
            "thriller",
        )
    }

    #[test]
    fn test_create_and_lookup() {
        let authors = authors();
        let mut registry = StoryRegistry::new();

        let handle = create(&mut registry, &authors, STORY_CID).unwrap();
        let found = registry.handle_for(&ContentId::from(STORY_CID)).unwrap();

        assert_eq!(handle, found);
        let story = registry.get(&handle).unwrap();
        assert_eq!(story.genre, "thriller");
        assert_eq!(story.graph().len(), 1);
    }

    #[test]
    fn test_missing_story_not_found() {
        let registry = StoryRegistry::new();
        let err = registry.handle_for(&ContentId::from(STORY_CID)).unwrap_err();
        assert_eq!(err, StoryError::story_not_found(&ContentId::from(STORY_CID)));
    }

    #[test]
    fn test_duplicate_story_rejected() {
        let authors = authors();
        let mut registry = StoryRegistry::new();

        create(&mut registry, &authors, STORY_CID).unwrap();
        let err = create(&mut registry, &authors, STORY_CID).unwrap_err();

        assert_eq!(err.code(), "DUPLICATE_CONTENT_ID");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregistered_creator_rejected() {
        let authors = AuthorRegistry::new();
        let mut registry = StoryRegistry::new();

        let err = create(&mut registry, &authors, STORY_CID).unwrap_err();
        assert_eq!(err, StoryError::author_not_found(&AuthorId::from("creator")));
        assert!(registry.is_empty());
        assert_eq!(registry.featured_cid(), None);
    }

    #[test]
    fn test_latest_story_is_featured_when_not_pinned() {
        let authors = authors();
        let mut registry = StoryRegistry::new();

        create(&mut registry, &authors, STORY_CID).unwrap();
        assert_eq!(registry.featured().unwrap().root, ContentId::from(STORY_CID));

        create(&mut registry, &authors, OTHER_STORY_CID).unwrap();
        assert_eq!(registry.featured_cid(), Some(&ContentId::from(OTHER_STORY_CID)));
    }

    #[test]
    fn test_pinned_featured_story_is_kept() {
        let authors = authors();
        let mut registry = StoryRegistry::new();

        registry.set_featured(ContentId::from(STORY_CID));
        create(&mut registry, &authors, OTHER_STORY_CID).unwrap();

        assert!(registry.is_featured_pinned());
        assert_eq!(registry.featured_cid(), Some(&ContentId::from(STORY_CID)));
        // Pinned id names no story yet.
        assert!(registry.featured().is_err());

        create(&mut registry, &authors, STORY_CID).unwrap();
        assert_eq!(registry.featured().unwrap().root, ContentId::from(STORY_CID));
    }

    #[test]
    fn test_bookmarks() {
        let authors = authors();
        let mut registry = StoryRegistry::new();
        let handle = create(&mut registry, &authors, STORY_CID).unwrap();
        let reader = AuthorId::from("reader");

        let story = registry.get_mut(&handle).unwrap();
        assert_eq!(story.bookmark_of(&reader), None);

        story.bookmark(reader.clone(), ContentId::from(STORY_CID)).unwrap();
        assert_eq!(story.bookmark_of(&reader), Some(&ContentId::from(STORY_CID)));

        let err = story.bookmark(reader.clone(), ContentId::from("missing")).unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
        assert_eq!(story.bookmark_of(&reader), Some(&ContentId::from(STORY_CID)));
    }

    #[test]
    fn test_iter_in_creation_order() {
        let authors = authors();
        let mut registry = StoryRegistry::new();
        create(&mut registry, &authors, OTHER_STORY_CID).unwrap();
        create(&mut registry, &authors, STORY_CID).unwrap();

        let roots: Vec<_> = registry.iter().map(|s| s.root.as_str().to_string()).collect();
        assert_eq!(roots, vec![OTHER_STORY_CID.to_string(), STORY_CID.to_string()]);
    }
}
