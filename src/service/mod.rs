//! # Posts Service Boundary
//!
//! The remote posts service is an external collaborator. The core only
//! depends on the [`PostsService`] trait:
//!
//! - `list_posts` answers the whole feed, newest first, either already paired
//!   with authors ([`PostListing::Joined`]) or as separate post and author
//!   records ([`PostListing::Unjoined`]).
//! - `create_post` publishes one post for the signed-in caller and returns the
//!   record the service stored.
//!
//! Implementations in this crate:
//!
//! - [`ChannelPostsService`]: forwards each call as a [`ServiceRequest`] over an
//!   mpsc channel and waits on a oneshot reply. Whatever owns the receiver
//!   decides how and when calls resolve.
//! - [`InMemoryPostsService`]: a service actor holding posts and authors in
//!   memory, used by the demo binary and the end-to-end tests.
//! - [`mock`]: expectation-driven and hand-driven test doubles.

pub mod config;
pub mod error;
pub mod memory;
pub mod mock;

pub use config::*;
pub use error::*;
pub use memory::*;

use crate::model::{Author, Post, PostWithAuthor};
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

/// A feed listing as answered by the service.
#[derive(Debug, Clone, PartialEq)]
pub enum PostListing {
    /// Posts already paired with their authors.
    Joined(Vec<PostWithAuthor>),
    /// Posts and a sparse set of author records, to be joined by the client.
    Unjoined {
        posts: Vec<Post>,
        authors: Vec<Author>,
    },
}

impl PostListing {
    pub fn len(&self) -> usize {
        match self {
            Self::Joined(pairs) => pairs.len(),
            Self::Unjoined { posts, .. } => posts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Query and mutation contract of the remote posts service.
#[async_trait]
pub trait PostsService: Send + Sync + 'static {
    /// Lists every post, newest first.
    async fn list_posts(&self) -> Result<PostListing, ServiceError>;

    /// Publishes a post on behalf of the signed-in caller.
    async fn create_post(&self, content: &str) -> Result<Post, ServiceError>;
}

/// One-shot reply channel for a [`ServiceRequest`].
pub type Reply<T> = oneshot::Sender<Result<T, ServiceError>>;

/// A service call in flight, as seen by whatever owns the receiving end.
#[derive(Debug)]
pub enum ServiceRequest {
    ListPosts {
        respond_to: Reply<PostListing>,
    },
    CreatePost {
        content: String,
        respond_to: Reply<Post>,
    },
}

/// A [`PostsService`] that forwards calls over a channel.
#[derive(Clone)]
pub struct ChannelPostsService {
    sender: mpsc::Sender<ServiceRequest>,
}

impl ChannelPostsService {
    pub fn new(sender: mpsc::Sender<ServiceRequest>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl PostsService for ChannelPostsService {
    async fn list_posts(&self) -> Result<PostListing, ServiceError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ServiceRequest::ListPosts { respond_to })
            .await
            .map_err(|_| ServiceError::Transport("service closed".into()))?;
        response
            .await
            .map_err(|_| ServiceError::Transport("service dropped the request".into()))?
    }

    async fn create_post(&self, content: &str) -> Result<Post, ServiceError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ServiceRequest::CreatePost {
                content: content.to_string(),
                respond_to,
            })
            .await
            .map_err(|_| ServiceError::Transport("service closed".into()))?;
        response
            .await
            .map_err(|_| ServiceError::Transport("service dropped the request".into()))?
    }
}
