//! # Posts Service Test Doubles
//!
//! Two styles, for two kinds of test:
//!
//! - [`MockPostsService`]: queue the answers up front with
//!   [`expect_list_posts`](MockPostsService::expect_list_posts) and
//!   [`expect_create_post`](MockPostsService::expect_create_post), then call
//!   [`verify`](MockPostsService::verify). Calls resolve immediately.
//! - [`create_manual_service`]: every call is handed to the test as a
//!   [`ServiceRequest`] carrying its reply channel. The test decides when, and
//!   in which order, calls resolve. This is how coalescing and out-of-order
//!   completion are exercised.
//!
//! ```ignore
//! let mut mock = MockPostsService::new();
//! mock.expect_create_post().return_err(ServiceError::RateLimited);
//! let service: Arc<dyn PostsService> = Arc::new(mock.clone());
//! // ...
//! mock.verify();
//! ```

use crate::model::Post;
use crate::service::{
    ChannelPostsService, PostListing, PostsService, Reply, ServiceError, ServiceRequest,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

enum Expectation {
    ListPosts {
        response: Result<PostListing, ServiceError>,
    },
    CreatePost {
        response: Result<Post, ServiceError>,
    },
}

/// A posts service that answers from a queue of expectations.
///
/// Clones share the queue and counters, so a test can hand one clone to the
/// code under test and keep another for assertions.
#[derive(Clone, Default)]
pub struct MockPostsService {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    list_calls: Arc<AtomicUsize>,
    created: Arc<Mutex<Vec<String>>>,
}

impl MockPostsService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a `list_posts` call.
    pub fn expect_list_posts(&mut self) -> ListPostsExpectationBuilder {
        ListPostsExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a `create_post` call.
    pub fn expect_create_post(&mut self) -> CreatePostExpectationBuilder {
        CreatePostExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Number of `list_posts` calls received so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of `create_post` calls received so far.
    pub fn create_calls(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    /// Content of every `create_post` call, in arrival order.
    pub fn created_contents(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }

    fn next_expectation(&self) -> Option<Expectation> {
        self.expectations.lock().unwrap().pop_front()
    }
}

#[async_trait]
impl PostsService for MockPostsService {
    async fn list_posts(&self) -> Result<PostListing, ServiceError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        match self.next_expectation() {
            Some(Expectation::ListPosts { response }) => response,
            _ => panic!("Unexpected list_posts call or expectation mismatch"),
        }
    }

    async fn create_post(&self, content: &str) -> Result<Post, ServiceError> {
        self.created.lock().unwrap().push(content.to_string());
        match self.next_expectation() {
            Some(Expectation::CreatePost { response }) => response,
            _ => panic!("Unexpected create_post call or expectation mismatch"),
        }
    }
}

/// Builder for `list_posts` expectations.
pub struct ListPostsExpectationBuilder {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl ListPostsExpectationBuilder {
    pub fn return_ok(self, listing: PostListing) {
        self.push(Ok(listing));
    }

    pub fn return_err(self, error: ServiceError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<PostListing, ServiceError>) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::ListPosts { response });
    }
}

/// Builder for `create_post` expectations.
pub struct CreatePostExpectationBuilder {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl CreatePostExpectationBuilder {
    pub fn return_ok(self, post: Post) {
        self.push(Ok(post));
    }

    pub fn return_err(self, error: ServiceError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<Post, ServiceError>) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::CreatePost { response });
    }
}

// =============================================================================
// HAND-DRIVEN SERVICE
// =============================================================================

/// Creates a channel-backed service and the receiver its calls arrive on.
pub fn create_manual_service(
    buffer_size: usize,
) -> (ChannelPostsService, mpsc::Receiver<ServiceRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ChannelPostsService::new(sender), receiver)
}

/// Waits for the next call and returns its reply channel if it is a `list_posts`.
pub async fn expect_list_posts(
    receiver: &mut mpsc::Receiver<ServiceRequest>,
) -> Option<Reply<PostListing>> {
    match receiver.recv().await {
        Some(ServiceRequest::ListPosts { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Waits for the next call and returns its content and reply channel if it is
/// a `create_post`.
pub async fn expect_create_post(
    receiver: &mut mpsc::Receiver<ServiceRequest>,
) -> Option<(String, Reply<Post>)> {
    match receiver.recv().await {
        Some(ServiceRequest::CreatePost {
            content,
            respond_to,
        }) => Some((content, respond_to)),
        _ => None,
    }
}
