//! Author and story registries.

pub mod authors;
pub mod stories;

use crate::types::AuthorId;

/// The narrow view of the author table the contribution graph needs.
///
/// The graph validates that submitters are registered and awards
/// reputation through this trait; it never reads reputation values.
pub trait AuthorDirectory {
    /// Whether `id` is a registered author.
    fn is_registered(&self, id: &AuthorId) -> bool;

    /// Add one reputation point to `id`. Unknown authors are ignored.
    fn award_reputation(&mut self, id: &AuthorId);
}

pub use authors::AuthorRegistry;
pub use stories::{Story, StoryHandle, StoryRegistry};
