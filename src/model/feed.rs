use crate::model::{Author, Post};
use serde::{Deserialize, Serialize};

/// A post paired with an author record, as returned by a service that joins
/// server-side. The pairing is not trusted until it passes the author join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author: Author,
}

/// One row of the feed: a post with its resolved author.
///
/// Entries are only built by [`crate::join`], which guarantees that
/// `author().id == post().author_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEntry {
    post: Post,
    author: Author,
}

impl FeedEntry {
    pub(crate) fn joined(post: Post, author: Author) -> Self {
        debug_assert_eq!(post.author_id, author.id);
        Self { post, author }
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    pub fn author(&self) -> &Author {
        &self.author
    }
}

/// Feed entries in the order the service returned them (newest first).
pub type Feed = Vec<FeedEntry>;
