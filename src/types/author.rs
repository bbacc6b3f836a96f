//! Author profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{AuthorId, ContentId};

/// A registered author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Unique identity.
    pub id: AuthorId,
    /// Display name.
    pub name: String,
    /// Content identifier of the profile picture.
    pub profile_pic: ContentId,
    /// Number of times another author continued this author's work.
    pub reputation: u64,
    /// When the author registered.
    pub created_at: DateTime<Utc>,
}

impl Author {
    /// Create a new author with zero reputation.
    pub fn new(id: AuthorId, name: impl Into<String>, profile_pic: ContentId) -> Self {
        Self {
            id,
            name: name.into(),
            profile_pic,
            reputation: 0,
            created_at: Utc::now(),
        }
    }
}
