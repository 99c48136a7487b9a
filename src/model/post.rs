use crate::model::AuthorId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identifier assigned to a post by the posts service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PostId(pub u64);

impl From<u64> for PostId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A published micro-post.
///
/// Posts are created by the service only, in response to a successful
/// create request. The client keeps read-only copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author_id: AuthorId,
}

impl Post {
    /// Creates a new Post record.
    ///
    /// # Arguments
    /// * `id` - Identifier assigned by the service
    /// * `author_id` - Who wrote the post
    /// * `content` - Post body
    /// * `created_at` - Service timestamp
    pub fn new(
        id: impl Into<PostId>,
        author_id: impl Into<AuthorId>,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            created_at,
            author_id: author_id.into(),
        }
    }
}
