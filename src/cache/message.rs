//! # Cache Messages
//!
//! Requests sent from [`QueryCache`](super::QueryCache) handles to the
//! [`QueryCacheActor`](super::QueryCacheActor), plus the completion report a
//! fetch task sends back when it resolves.

use crate::cache::{QueryError, QueryKey, QueryState};
use tokio::sync::{oneshot, watch};

/// Per-key counters, for tests and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryStats {
    /// Live subscriptions.
    pub subscribers: usize,
    /// Fetches started for this key, including superseded ones.
    pub fetches_issued: u64,
    /// Completions thrown away because a newer fetch had already been applied.
    pub completions_discarded: u64,
    /// Data was invalidated and no fetch has replaced it yet.
    pub stale: bool,
    pub fetching: bool,
}

pub enum CacheRequest<T> {
    Subscribe {
        key: QueryKey,
        respond_to: oneshot::Sender<watch::Receiver<QueryState<T>>>,
    },
    Invalidate {
        key: QueryKey,
        respond_to: oneshot::Sender<()>,
    },
    Refetch {
        key: QueryKey,
        respond_to: oneshot::Sender<()>,
    },
    Snapshot {
        key: QueryKey,
        respond_to: oneshot::Sender<Option<QueryState<T>>>,
    },
    Stats {
        key: QueryKey,
        respond_to: oneshot::Sender<Option<QueryStats>>,
    },
}

/// Sent by a fetch task when its fetch resolves. `seq` is the stamp the actor
/// gave the fetch when issuing it.
pub(crate) struct FetchCompleted<T> {
    pub key: QueryKey,
    pub seq: u64,
    pub result: Result<T, QueryError>,
}
