//! # Author Join
//!
//! Resolves the author of each post into a [`FeedEntry`]. The service usually
//! joins server-side ([`PostListing::Joined`](crate::service::PostListing)),
//! in which case every pair is re-checked through [`verify_pair`]. Unjoined
//! listings go through [`join_feed`] with an [`AuthorDirectory`].
//!
//! Joining never reorders, filters or deduplicates: the feed comes out in the
//! order the posts went in, or not at all.

pub mod error;

pub use error::*;

use crate::model::{Author, AuthorId, Feed, FeedEntry, Post, PostWithAuthor};
use std::collections::HashMap;
use tracing::warn;

/// Sparse lookup from author id to author record.
#[derive(Debug, Clone, Default)]
pub struct AuthorDirectory {
    authors: HashMap<AuthorId, Author>,
}

impl AuthorDirectory {
    pub fn new(authors: impl IntoIterator<Item = Author>) -> Self {
        authors.into_iter().collect()
    }

    pub fn get(&self, id: &AuthorId) -> Option<&Author> {
        self.authors.get(id)
    }

    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }
}

impl FromIterator<Author> for AuthorDirectory {
    fn from_iter<I: IntoIterator<Item = Author>>(iter: I) -> Self {
        Self {
            authors: iter
                .into_iter()
                .map(|author| (author.id.clone(), author))
                .collect(),
        }
    }
}

/// Pairs one post with its author.
pub fn join_post(post: Post, authors: &AuthorDirectory) -> Result<FeedEntry, MissingAuthorError> {
    match authors.get(&post.author_id) {
        Some(author) => Ok(FeedEntry::joined(post, author.clone())),
        None => {
            warn!(post_id = %post.id, author_id = %post.author_id, "Missing author");
            Err(MissingAuthorError {
                post_id: post.id,
                author_id: post.author_id,
            })
        }
    }
}

/// Joins every post in order. Fails on the first post without an author.
pub fn join_feed(
    posts: impl IntoIterator<Item = Post>,
    authors: &AuthorDirectory,
) -> Result<Feed, MissingAuthorError> {
    posts
        .into_iter()
        .map(|post| join_post(post, authors))
        .collect()
}

/// Checks a pair the service already joined.
///
/// A pair whose author id differs from the post's author id is treated the
/// same as a missing author.
pub fn verify_pair(pair: PostWithAuthor) -> Result<FeedEntry, MissingAuthorError> {
    let PostWithAuthor { post, author } = pair;
    join_post(post, &AuthorDirectory::new([author]))
}
