//! # In-Memory Posts Service
//!
//! A stand-in for the remote posts service. One [`PostsStore`] task owns every
//! post and author and answers requests sequentially, so id assignment,
//! ordering and rate limiting need no locks.
//!
//! Rules it enforces on `create_post`:
//! - the caller must be signed in
//! - content length within `1..=max_content_len` UTF-16 code units
//! - emoji-only content, when `emoji_only` is set
//! - at most `rate_limit` posts per author per window

use crate::model::{Author, AuthorId, Post, PostId, PostWithAuthor};
use crate::service::{PostListing, PostsService, ServiceConfig, ServiceError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

type StoreReply<T> = oneshot::Sender<Result<T, ServiceError>>;

#[derive(Debug)]
enum StoreRequest {
    List {
        respond_to: StoreReply<PostListing>,
    },
    Create {
        caller: Option<AuthorId>,
        content: String,
        respond_to: StoreReply<Post>,
    },
    RegisterAuthor {
        author: Author,
        respond_to: StoreReply<()>,
    },
}

/// The service actor. Run it with [`PostsStore::run`].
pub struct PostsStore {
    receiver: mpsc::Receiver<StoreRequest>,
    config: ServiceConfig,
    posts: Vec<Post>,
    authors: HashMap<AuthorId, Author>,
    recent_posts: HashMap<AuthorId, VecDeque<Instant>>,
    next_id: u64,
}

impl PostsStore {
    /// Creates the store and a signed-out client for it.
    pub fn new(config: ServiceConfig) -> (Self, InMemoryPostsService) {
        let (sender, receiver) = mpsc::channel(config.buffer_size);
        let client = InMemoryPostsService {
            sender,
            caller: None,
            latency: config.latency(),
        };
        let store = Self {
            receiver,
            config,
            posts: Vec::new(),
            authors: HashMap::new(),
            recent_posts: HashMap::new(),
            next_id: 1,
        };
        (store, client)
    }

    /// Processes requests until every client is dropped.
    pub async fn run(mut self) {
        info!("Posts store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::List { respond_to } => {
                    let listing = self.listing();
                    match &listing {
                        Ok(listing) => debug!(posts = listing.len(), "List"),
                        Err(e) => warn!(error = %e, "List failed"),
                    }
                    let _ = respond_to.send(listing);
                }
                StoreRequest::Create {
                    caller,
                    content,
                    respond_to,
                } => {
                    debug!(?caller, %content, "Create");
                    let result = self.create(caller, content);
                    match &result {
                        Ok(post) => info!(post_id = %post.id, size = self.posts.len(), "Created"),
                        Err(e) => warn!(error = %e, "Create failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::RegisterAuthor { author, respond_to } => {
                    debug!(author_id = %author.id, "Register author");
                    self.authors.insert(author.id.clone(), author);
                    let _ = respond_to.send(Ok(()));
                }
            }
        }

        info!(size = self.posts.len(), "Shutdown");
    }

    fn listing(&self) -> Result<PostListing, ServiceError> {
        let newest_first = self.posts.iter().rev().cloned();

        if !self.config.server_side_join {
            return Ok(PostListing::Unjoined {
                posts: newest_first.collect(),
                authors: self.authors.values().cloned().collect(),
            });
        }

        newest_first
            .map(|post| match self.authors.get(&post.author_id) {
                Some(author) => Ok(PostWithAuthor {
                    author: author.clone(),
                    post,
                }),
                None => Err(ServiceError::Transport(format!(
                    "Author for post {} not found",
                    post.id
                ))),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(PostListing::Joined)
    }

    fn create(&mut self, caller: Option<AuthorId>, content: String) -> Result<Post, ServiceError> {
        let author_id = caller.ok_or(ServiceError::Unauthorized)?;

        let messages = self.content_errors(&content);
        if !messages.is_empty() {
            return Err(ServiceError::validation("content", messages));
        }

        self.check_rate_limit(&author_id)?;

        let post = Post::new(PostId(self.next_id), author_id, content, Utc::now());
        self.next_id += 1;
        self.posts.push(post.clone());
        Ok(post)
    }

    fn content_errors(&self, content: &str) -> Vec<String> {
        let len = content.encode_utf16().count();
        let mut messages = Vec::new();
        if self.config.emoji_only && !content.is_empty() && !is_emoji_only(content) {
            messages.push("Invalid emoji".to_string());
        }
        if len < 1 {
            messages.push("String must contain at least 1 character(s)".to_string());
        }
        if len > self.config.max_content_len {
            messages.push(format!(
                "String must contain at most {} character(s)",
                self.config.max_content_len
            ));
        }
        messages
    }

    fn check_rate_limit(&mut self, author_id: &AuthorId) -> Result<(), ServiceError> {
        let now = Instant::now();
        let window = self.config.rate_limit_window();
        let recent = self.recent_posts.entry(author_id.clone()).or_default();
        while recent
            .front()
            .is_some_and(|sent| now.duration_since(*sent) >= window)
        {
            recent.pop_front();
        }
        if recent.len() >= self.config.rate_limit {
            return Err(ServiceError::RateLimited);
        }
        recent.push_back(now);
        Ok(())
    }
}

fn is_emoji_only(content: &str) -> bool {
    content.chars().all(|c| {
        matches!(c,
            '\u{1F000}'..='\u{1FAFF}'
            | '\u{2600}'..='\u{27BF}'
            | '\u{2300}'..='\u{23FF}'
            | '\u{2B00}'..='\u{2BFF}'
            | '\u{E0020}'..='\u{E007F}'
            | '\u{200D}'
            | '\u{FE0F}'
            | '\u{20E3}'
            | '\u{00A9}'
            | '\u{00AE}'
            | '\u{2122}'
            | '\u{3030}'
            | '\u{303D}'
            | '\u{3297}'
            | '\u{3299}')
    })
}

/// Client handle for a [`PostsStore`].
///
/// Cloning is cheap. Each handle carries the identity it calls as; use
/// [`InMemoryPostsService::signed_in`] to act for an author.
#[derive(Clone)]
pub struct InMemoryPostsService {
    sender: mpsc::Sender<StoreRequest>,
    caller: Option<AuthorId>,
    latency: Duration,
}

impl InMemoryPostsService {
    /// Returns a handle that creates posts as `author_id`.
    pub fn signed_in(&self, author_id: impl Into<AuthorId>) -> Self {
        Self {
            caller: Some(author_id.into()),
            ..self.clone()
        }
    }

    pub fn signed_out(&self) -> Self {
        Self {
            caller: None,
            ..self.clone()
        }
    }

    /// Makes an author's profile available to listings.
    #[instrument(skip(self, author), fields(author_id = %author.id))]
    pub async fn register_author(&self, author: Author) -> Result<(), ServiceError> {
        self.call(|respond_to| StoreRequest::RegisterAuthor { author, respond_to })
            .await
    }

    async fn call<T>(
        &self,
        request: impl FnOnce(StoreReply<T>) -> StoreRequest,
    ) -> Result<T, ServiceError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(request(respond_to))
            .await
            .map_err(|_| ServiceError::Transport("posts store closed".into()))?;
        response
            .await
            .map_err(|_| ServiceError::Transport("posts store dropped the request".into()))?
    }
}

#[async_trait]
impl PostsService for InMemoryPostsService {
    async fn list_posts(&self) -> Result<PostListing, ServiceError> {
        self.call(|respond_to| StoreRequest::List { respond_to }).await
    }

    async fn create_post(&self, content: &str) -> Result<Post, ServiceError> {
        let caller = self.caller.clone();
        let content = content.to_string();
        self.call(|respond_to| StoreRequest::Create {
            caller,
            content,
            respond_to,
        })
        .await
    }
}
