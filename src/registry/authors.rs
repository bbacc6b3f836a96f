//! In-memory author registry.

use std::collections::BTreeMap;

use crate::error::StoryError;
use crate::types::{Author, AuthorId, ContentId};
use super::AuthorDirectory;

/// Registry of authors keyed by identity.
///
/// Uses BTreeMap for deterministic iteration order.
#[derive(Debug, Clone, Default)]
pub struct AuthorRegistry {
    authors: BTreeMap<AuthorId, Author>,
}

impl AuthorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new author with zero reputation.
    pub fn create(
        &mut self,
        id: AuthorId,
        name: impl Into<String>,
        profile_pic: ContentId,
    ) -> Result<&Author, StoryError> {
        if self.authors.contains_key(&id) {
            return Err(StoryError::DuplicateAuthor(id));
        }
        let author = Author::new(id.clone(), name, profile_pic);
        Ok(self.authors.entry(id).or_insert(author))
    }

    /// Look up an author.
    pub fn get(&self, id: &AuthorId) -> Result<&Author, StoryError> {
        self.authors
            .get(id)
            .ok_or_else(|| StoryError::author_not_found(id))
    }

    /// All authors, ordered by identity.
    pub fn iter(&self) -> impl Iterator<Item = &Author> {
        self.authors.values()
    }

    /// Number of registered authors.
    pub fn len(&self) -> usize {
        self.authors.len()
    }

    /// Check if no author is registered.
    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }
}

impl AuthorDirectory for AuthorRegistry {
    fn is_registered(&self, id: &AuthorId) -> bool {
        self.authors.contains_key(id)
    }

    fn award_reputation(&mut self, id: &AuthorId) {
        if let Some(author) = self.authors.get_mut(id) {
            author.reputation += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pic() -> ContentId {
        ContentId::from("QmDefaultPic")
    }

    #[test]
    fn test_create_and_get_author() {
        let mut registry = AuthorRegistry::new();
        let id = AuthorId::from("0x5ADB");

        registry.create(id.clone(), "the_light_of_aiur", pic()).unwrap();

        let author = registry.get(&id).unwrap();
        assert_eq!(author.name, "the_light_of_aiur");
        assert_eq!(author.reputation, 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_author_rejected() {
        let mut registry = AuthorRegistry::new();
        let id = AuthorId::from("0x5ADB");

        registry.create(id.clone(), "first", pic()).unwrap();
        let err = registry.create(id.clone(), "second", pic()).unwrap_err();

        assert_eq!(err, StoryError::DuplicateAuthor(id.clone()));
        assert_eq!(registry.get(&id).unwrap().name, "first");
    }

    #[test]
    fn test_unknown_author_not_found() {
        let registry = AuthorRegistry::new();
        let err = registry.get(&AuthorId::from("nobody")).unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_award_reputation() {
        let mut registry = AuthorRegistry::new();
        let id = AuthorId::from("0x5ADB");
        registry.create(id.clone(), "writer", pic()).unwrap();

        registry.award_reputation(&id);
        registry.award_reputation(&id);
        registry.award_reputation(&AuthorId::from("ghost"));

        assert_eq!(registry.get(&id).unwrap().reputation, 2);
        assert!(!registry.is_registered(&AuthorId::from("ghost")));
    }
}
