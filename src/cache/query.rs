//! # Query Definitions
//!
//! A [`Query`] tells the cache how to fetch the data behind a key. The cache
//! actor is generic over it, so the fetch pipeline for the feed lives here in
//! [`FeedQuery`] and the actor never knows about posts.

use crate::cache::{QueryError, QueryKey};
use crate::join::{join_feed, verify_pair, AuthorDirectory};
use crate::model::Feed;
use crate::service::{PostListing, PostsService};
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

/// Fetch pipeline for a family of cached queries.
#[async_trait]
pub trait Query: Send + Sync + 'static {
    /// The value stored under each key.
    type Data: Send + Sync + Debug + 'static;

    /// Fetches fresh data for `key`.
    async fn fetch(&self, key: &QueryKey) -> Result<Self::Data, QueryError>;
}

/// Lists posts from the service and joins each one with its author, in the
/// order the service returned them.
#[derive(Clone)]
pub struct FeedQuery {
    service: Arc<dyn PostsService>,
}

impl FeedQuery {
    pub fn new(service: Arc<dyn PostsService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Query for FeedQuery {
    type Data = Feed;

    async fn fetch(&self, key: &QueryKey) -> Result<Feed, QueryError> {
        let listing = self.service.list_posts().await?;
        debug!(%key, posts = listing.len(), "Listing received");

        let feed = match listing {
            PostListing::Joined(pairs) => pairs
                .into_iter()
                .map(verify_pair)
                .collect::<Result<Feed, _>>()?,
            PostListing::Unjoined { posts, authors } => {
                join_feed(posts, &AuthorDirectory::new(authors))?
            }
        };
        Ok(feed)
    }
}
