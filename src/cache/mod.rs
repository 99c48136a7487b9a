//! # Query Cache
//!
//! Holds the latest known result of each query, keyed by [`QueryKey`], and
//! publishes every state transition to subscribers.
//!
//! ## Main Components
//!
//! - [`Query`]: how data for a key is fetched ([`FeedQuery`] for the feed)
//! - [`QueryCacheActor`]: the task that owns all entries
//! - [`QueryCache`]: cloneable handle (`subscribe`, `invalidate`, `refetch`, ...)
//! - [`Subscription`]: reactive view of one key
//! - [`QueryState`]: what a subscriber sees
//!
//! ## Guarantees
//!
//! - Subscribers arriving while a fetch is in flight share that fetch.
//! - Completions apply in issue order; late, superseded completions are dropped.
//! - Invalidation never clears data and never stacks more than one follow-up fetch.
//! - Errors keep the last good data next to the cause.
//!
//! Entries are never evicted. Each [`FeedSystem`](crate::lifecycle::FeedSystem)
//! owns its own actor, so tests get isolated caches by building their own system.

pub mod actor;
pub mod client;
pub mod config;
pub mod error;
pub mod key;
pub mod message;
pub mod query;
pub mod state;

pub use actor::*;
pub use client::*;
pub use config::*;
pub use error::*;
pub use key::*;
pub use message::QueryStats;
pub use query::*;
pub use state::*;
