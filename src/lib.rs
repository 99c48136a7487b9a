//! # Feed Sync
//!
//! > **The client-side core of a micro-post feed.**
//!
//! This crate keeps a feed of short posts in sync with a remote posts service:
//! it loads and caches the feed, publishes new posts, and refreshes the feed
//! once a post has been accepted. There is no optimistic insertion: a new post
//! appears when the service lists it.
//!
//! ## Architecture
//!
//! The [`cache`] is an actor: one Tokio task owns every cached query and
//! handles one message at a time, so entries need no locks. Everything else
//! talks to it through a cloneable [`QueryCache`](cache::QueryCache) handle and
//! observes state through `watch` channels. Presentation is pure: views are
//! recomputed from the latest published state.
//!
//! ## Module Tour
//!
//! ### 1. Data ([`model`], [`join`])
//! Posts, authors and feed entries. The join pairs each post with its author
//! and fails with [`MissingAuthorError`](join::MissingAuthorError) instead of
//! dropping entries.
//!
//! ### 2. The Service ([`service`])
//! The [`PostsService`](service::PostsService) contract, an actor-backed
//! in-memory implementation, and test doubles in [`service::mock`].
//!
//! ### 3. The Engine ([`cache`])
//! Request coalescing, ordered completion, invalidation and stale-while-error.
//!
//! ### 4. Writes ([`mutation`], [`composer`])
//! [`MutationGateway`](mutation::MutationGateway) submits posts and invalidates
//! the feed. [`Composer`](composer::Composer) is the input state machine in
//! front of it.
//!
//! ### 5. Reads ([`presenter`])
//! [`present`](presenter::present) turns cache state into a
//! [`FeedView`](presenter::FeedView); [`PostView`](presenter::PostView) formats
//! one row.
//!
//! ### 6. The Orchestrator ([`lifecycle`])
//! [`FeedSystem`](lifecycle::FeedSystem) wires and stops everything;
//! [`FeedPage`](lifecycle::FeedPage) is the page.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run the demo against the in-memory service
//! RUST_LOG=info cargo run
//!
//! cargo test
//! ```

pub mod cache;
pub mod composer;
pub mod join;
pub mod lifecycle;
pub mod model;
pub mod mutation;
pub mod presenter;
pub mod service;
