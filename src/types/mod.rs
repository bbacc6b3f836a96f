//! Core types for the story kernel.

pub mod ids;
pub mod state;
pub mod contribution;
pub mod author;
pub mod event;

pub use ids::{ContentId, AuthorId};
pub use state::{StorylineState, StorylineEvent};
pub use contribution::Contribution;
pub use author::Author;
pub use event::StoryEvent;
