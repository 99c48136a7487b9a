//! # Cache Handle & Subscriptions
//!
//! [`QueryCache`] is the cloneable handle every consumer holds. It hides the
//! message passing to the actor behind plain async methods.
//!
//! [`Subscription`] is the reactive side: it always holds the latest
//! [`QueryState`] for its key ([`Subscription::current`]) and can wait for the
//! next transition ([`Subscription::changed`]). Like any latest-value channel,
//! a slow consumer may skip intermediate states but always sees the newest.
//! Dropping a subscription unsubscribes; fetches it started still complete
//! and update the cache.

use crate::cache::message::{CacheRequest, QueryStats};
use crate::cache::{CacheError, QueryKey, QueryState};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, instrument};

/// A handle to a running [`QueryCacheActor`](super::QueryCacheActor).
pub struct QueryCache<T> {
    sender: mpsc::Sender<CacheRequest<T>>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: Send + Sync + 'static> QueryCache<T> {
    pub(crate) fn new(sender: mpsc::Sender<CacheRequest<T>>) -> Self {
        Self { sender }
    }

    /// Subscribes to `key`, fetching if nothing fresh is cached or in flight.
    #[instrument(skip(self))]
    pub async fn subscribe(&self, key: &QueryKey) -> Result<Subscription<T>, CacheError> {
        debug!("Sending request");
        let receiver = self
            .request(|respond_to| CacheRequest::Subscribe {
                key: key.clone(),
                respond_to,
            })
            .await?;
        Ok(Subscription {
            key: key.clone(),
            receiver,
        })
    }

    /// Marks `key` stale and schedules a refetch for its subscribers.
    ///
    /// Returns once the refetch has been scheduled (or queued behind the
    /// fetch in flight), not when it completes.
    #[instrument(skip(self))]
    pub async fn invalidate(&self, key: &QueryKey) -> Result<(), CacheError> {
        debug!("Sending request");
        self.request(|respond_to| CacheRequest::Invalidate {
            key: key.clone(),
            respond_to,
        })
        .await
    }

    /// Starts a fetch for `key` now, superseding any fetch in flight.
    #[instrument(skip(self))]
    pub async fn refetch(&self, key: &QueryKey) -> Result<(), CacheError> {
        debug!("Sending request");
        self.request(|respond_to| CacheRequest::Refetch {
            key: key.clone(),
            respond_to,
        })
        .await
    }

    /// Current state of `key` without subscribing. `None` if never requested.
    pub async fn snapshot(&self, key: &QueryKey) -> Result<Option<QueryState<T>>, CacheError> {
        self.request(|respond_to| CacheRequest::Snapshot {
            key: key.clone(),
            respond_to,
        })
        .await
    }

    pub async fn stats(&self, key: &QueryKey) -> Result<Option<QueryStats>, CacheError> {
        self.request(|respond_to| CacheRequest::Stats {
            key: key.clone(),
            respond_to,
        })
        .await
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(oneshot::Sender<R>) -> CacheRequest<T>,
    ) -> Result<R, CacheError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| CacheError::ActorClosed)?;
        response.await.map_err(|_| CacheError::ActorDropped)
    }
}

/// A live view of one query.
pub struct Subscription<T> {
    key: QueryKey,
    receiver: watch::Receiver<QueryState<T>>,
}

impl<T> Subscription<T> {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// The latest published state.
    pub fn current(&self) -> QueryState<T> {
        self.receiver.borrow().clone()
    }

    /// Waits for the next transition and returns the new state.
    pub async fn changed(&mut self) -> Result<QueryState<T>, CacheError> {
        self.receiver
            .changed()
            .await
            .map_err(|_| CacheError::ActorClosed)?;
        Ok(self.receiver.borrow_and_update().clone())
    }

    /// Waits until the state satisfies `predicate`, checking the current
    /// state first.
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&QueryState<T>) -> bool,
    ) -> Result<QueryState<T>, CacheError> {
        let state = self
            .receiver
            .wait_for(|state| predicate(state))
            .await
            .map_err(|_| CacheError::ActorClosed)?;
        Ok(state.clone())
    }
}
