//! # Query Cache Actor
//!
//! One task owns every cache entry and handles one message at a time, so all
//! reads and writes to an entry are serialized without locks. Fetches run in
//! their own tasks and report back through a completion channel that the
//! actor selects on alongside its request channel.
//!
//! ## Ordering
//!
//! Each fetch is stamped with a per-key sequence number when issued. A
//! completion is applied only if its stamp is newer than the last applied
//! one, so a slow fetch can never overwrite data from a fetch issued after it.
//!
//! ## Invalidation
//!
//! Invalidating marks the entry stale. With subscribers and nothing in
//! flight, a fetch starts right away. With a fetch in flight, one follow-up
//! fetch is queued to start when it resolves; further invalidations fold into
//! that same follow-up. If nobody is subscribed by then, the follow-up is
//! dropped and the entry stays stale. Without subscribers the entry just stays
//! stale until the next subscription. Data is never cleared by invalidation.

use crate::cache::message::{CacheRequest, FetchCompleted, QueryStats};
use crate::cache::{CacheConfig, Query, QueryCache, QueryError, QueryKey, QueryState};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

struct Fetched<T> {
    data: Arc<T>,
    fetched_at: DateTime<Utc>,
    received: Instant,
}

struct Entry<T> {
    publisher: watch::Sender<QueryState<T>>,
    data: Option<Fetched<T>>,
    last_error: Option<QueryError>,
    stale: bool,
    /// Stamp of the most recently issued fetch.
    issued_seq: u64,
    /// Stamp of the most recently applied completion.
    applied_seq: u64,
    /// The most recently issued fetch has not resolved yet.
    in_flight: bool,
    refetch_queued: bool,
    fetches_issued: u64,
    completions_discarded: u64,
}

impl<T> Entry<T> {
    fn new() -> Self {
        let (publisher, _) = watch::channel(QueryState::Idle);
        Self {
            publisher,
            data: None,
            last_error: None,
            stale: false,
            issued_seq: 0,
            applied_seq: 0,
            in_flight: false,
            refetch_queued: false,
            fetches_issued: 0,
            completions_discarded: 0,
        }
    }

    fn subscribers(&self) -> usize {
        self.publisher.receiver_count()
    }

    fn is_fresh(&self, stale_time: Duration) -> bool {
        !self.stale
            && self
                .data
                .as_ref()
                .is_some_and(|fetched| fetched.received.elapsed() < stale_time)
    }

    /// Stamps a new fetch. The caller spawns it and publishes.
    fn begin_fetch(&mut self) -> u64 {
        self.issued_seq += 1;
        self.fetches_issued += 1;
        self.in_flight = true;
        self.refetch_queued = false;
        self.issued_seq
    }

    fn state(&self) -> QueryState<T> {
        let refetching = self.in_flight;
        match (&self.last_error, &self.data) {
            (_, None) if self.in_flight => QueryState::Loading,
            (Some(cause), data) => QueryState::Error {
                cause: cause.clone(),
                last_data: data.as_ref().map(|fetched| Arc::clone(&fetched.data)),
                refetching,
            },
            (None, Some(fetched)) => QueryState::Success {
                data: Arc::clone(&fetched.data),
                fetched_at: fetched.fetched_at,
                refetching,
            },
            (None, None) => QueryState::Idle,
        }
    }

    fn publish(&self) {
        self.publisher.send_replace(self.state());
    }

    fn stats(&self) -> QueryStats {
        QueryStats {
            subscribers: self.subscribers(),
            fetches_issued: self.fetches_issued,
            completions_discarded: self.completions_discarded,
            stale: self.stale,
            fetching: self.in_flight,
        }
    }
}

/// The cache server. Create with [`QueryCacheActor::new`] and spawn
/// [`QueryCacheActor::run`]; talk to it through the returned [`QueryCache`].
pub struct QueryCacheActor<Q: Query> {
    receiver: mpsc::Receiver<CacheRequest<Q::Data>>,
    completions: mpsc::UnboundedReceiver<FetchCompleted<Q::Data>>,
    completions_tx: mpsc::UnboundedSender<FetchCompleted<Q::Data>>,
    query: Arc<Q>,
    entries: HashMap<QueryKey, Entry<Q::Data>>,
    stale_time: Duration,
}

impl<Q: Query> QueryCacheActor<Q> {
    pub fn new(query: Q, config: &CacheConfig) -> (Self, QueryCache<Q::Data>) {
        let (sender, receiver) = mpsc::channel(config.buffer_size);
        let (completions_tx, completions) = mpsc::unbounded_channel();
        let actor = Self {
            receiver,
            completions,
            completions_tx,
            query: Arc::new(query),
            entries: HashMap::new(),
            stale_time: config.stale_time(),
        };
        (actor, QueryCache::new(sender))
    }

    /// Runs the event loop until every [`QueryCache`] handle is dropped.
    ///
    /// Fetches still in flight at shutdown finish on their own; their
    /// completions are dropped.
    pub async fn run(mut self) {
        info!(stale_time = ?self.stale_time, "Query cache started");

        loop {
            tokio::select! {
                msg = self.receiver.recv() => match msg {
                    Some(msg) => self.handle_request(msg),
                    None => break,
                },
                Some(done) = self.completions.recv() => self.apply_completion(done),
            }
        }

        info!(entries = self.entries.len(), "Shutdown");
    }

    fn handle_request(&mut self, msg: CacheRequest<Q::Data>) {
        match msg {
            CacheRequest::Subscribe { key, respond_to } => {
                let entry = self.entries.entry(key.clone()).or_insert_with(Entry::new);
                let receiver = entry.publisher.subscribe();
                if !entry.in_flight && !entry.is_fresh(self.stale_time) {
                    let seq = entry.begin_fetch();
                    spawn_fetch(&self.query, &self.completions_tx, key.clone(), seq);
                    entry.publish();
                }
                debug!(%key, subscribers = entry.subscribers(), fetching = entry.in_flight, "Subscribe");
                let _ = respond_to.send(receiver);
            }
            CacheRequest::Invalidate { key, respond_to } => {
                match self.entries.get_mut(&key) {
                    None => debug!(%key, "Invalidate: nothing cached"),
                    Some(entry) => {
                        entry.stale = true;
                        if entry.in_flight {
                            // The fetch in flight predates this invalidation, so its
                            // completion must not count as fresh.
                            entry.refetch_queued = true;
                            debug!(
                                %key,
                                subscribers = entry.subscribers(),
                                "Invalidate: refetch queued behind in-flight fetch"
                            );
                        } else if entry.subscribers() == 0 {
                            debug!(%key, "Invalidate: marked stale, no subscribers");
                        } else {
                            let seq = entry.begin_fetch();
                            spawn_fetch(&self.query, &self.completions_tx, key.clone(), seq);
                            entry.publish();
                            debug!(%key, "Invalidate: refetch started");
                        }
                    }
                }
                let _ = respond_to.send(());
            }
            CacheRequest::Refetch { key, respond_to } => {
                let entry = self.entries.entry(key.clone()).or_insert_with(Entry::new);
                if entry.in_flight {
                    debug!(%key, superseded = entry.issued_seq, "Refetch supersedes in-flight fetch");
                }
                let seq = entry.begin_fetch();
                spawn_fetch(&self.query, &self.completions_tx, key, seq);
                entry.publish();
                let _ = respond_to.send(());
            }
            CacheRequest::Snapshot { key, respond_to } => {
                let _ = respond_to.send(self.entries.get(&key).map(Entry::state));
            }
            CacheRequest::Stats { key, respond_to } => {
                let _ = respond_to.send(self.entries.get(&key).map(Entry::stats));
            }
        }
    }

    fn apply_completion(&mut self, done: FetchCompleted<Q::Data>) {
        let FetchCompleted { key, seq, result } = done;
        let Some(entry) = self.entries.get_mut(&key) else {
            return;
        };

        if seq <= entry.applied_seq {
            entry.completions_discarded += 1;
            debug!(%key, seq, applied = entry.applied_seq, "Discarded out-of-order completion");
            return;
        }
        entry.applied_seq = seq;

        match result {
            Ok(data) => {
                entry.data = Some(Fetched {
                    data: Arc::new(data),
                    fetched_at: Utc::now(),
                    received: Instant::now(),
                });
                entry.last_error = None;
                entry.stale = entry.refetch_queued;
                info!(%key, seq, subscribers = entry.subscribers(), "Fetch applied");
            }
            Err(e) => {
                warn!(%key, seq, error = %e, "Fetch failed");
                entry.last_error = Some(e);
            }
        }

        if seq == entry.issued_seq {
            entry.in_flight = false;
            if entry.refetch_queued {
                if entry.subscribers() > 0 {
                    let seq = entry.begin_fetch();
                    spawn_fetch(&self.query, &self.completions_tx, key.clone(), seq);
                    debug!(%key, seq, "Queued refetch started");
                } else {
                    entry.refetch_queued = false;
                    entry.stale = true;
                }
            }
        }

        entry.publish();
    }
}

fn spawn_fetch<Q: Query>(
    query: &Arc<Q>,
    completions: &mpsc::UnboundedSender<FetchCompleted<Q::Data>>,
    key: QueryKey,
    seq: u64,
) {
    debug!(%key, seq, "Fetch issued");
    let query = Arc::clone(query);
    let completions = completions.clone();
    tokio::spawn(async move {
        let result = query.fetch(&key).await;
        let _ = completions.send(FetchCompleted { key, seq, result });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheError, FeedQuery, Subscription};
    use crate::model::{Author, Feed, Post, PostWithAuthor};
    use crate::service::mock::{create_manual_service, expect_list_posts};
    use crate::service::{PostListing, ServiceError, ServiceRequest};

    fn listing(ids: &[u64]) -> PostListing {
        PostListing::Joined(
            ids.iter()
                .map(|&id| PostWithAuthor {
                    post: Post::new(id, "alice", "🦀", Utc::now()),
                    author: Author::new("alice", Some("alice"), "alice.png"),
                })
                .collect(),
        )
    }

    fn ids(state: &QueryState<Feed>) -> Vec<u64> {
        state
            .data()
            .map(|feed| feed.iter().map(|e| e.post().id.0).collect())
            .unwrap_or_default()
    }

    fn start(config: CacheConfig) -> (QueryCache<Feed>, mpsc::Receiver<ServiceRequest>) {
        let (service, receiver) = create_manual_service(16);
        let (actor, cache) = QueryCacheActor::new(FeedQuery::new(Arc::new(service)), &config);
        tokio::spawn(actor.run());
        (cache, receiver)
    }

    async fn settled(sub: &mut Subscription<Feed>) -> QueryState<Feed> {
        sub.wait_for(|s| !matches!(s, QueryState::Idle) && s.is_settled())
            .await
            .unwrap()
    }

    async fn wait_for_stats(
        cache: &QueryCache<Feed>,
        key: &QueryKey,
        predicate: impl Fn(&QueryStats) -> bool,
    ) -> QueryStats {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Some(stats) = cache.stats(key).await.unwrap() {
                    if predicate(&stats) {
                        return stats;
                    }
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("Timed out waiting for cache stats")
    }

    #[tokio::test]
    async fn test_first_subscription_loads_then_succeeds() {
        let (cache, mut requests) = start(CacheConfig::default());
        let key = QueryKey::feed();

        let mut sub = cache.subscribe(&key).await.unwrap();
        assert_eq!(sub.current(), QueryState::Loading);

        let reply = expect_list_posts(&mut requests).await.expect("Expected ListPosts");
        reply.send(Ok(listing(&[3, 2, 1]))).unwrap();

        let state = settled(&mut sub).await;
        assert!(state.is_success());
        assert_eq!(ids(&state), vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_concurrent_subscribers_share_one_fetch() {
        let (cache, mut requests) = start(CacheConfig::default());
        let key = QueryKey::feed();

        let mut first = cache.subscribe(&key).await.unwrap();
        let mut second = cache.subscribe(&key).await.unwrap();
        assert_eq!(second.current(), QueryState::Loading);

        let reply = expect_list_posts(&mut requests).await.expect("Expected ListPosts");
        reply.send(Ok(listing(&[1]))).unwrap();

        assert_eq!(ids(&settled(&mut first).await), vec![1]);
        assert_eq!(ids(&settled(&mut second).await), vec![1]);

        let stats = cache.stats(&key).await.unwrap().unwrap();
        assert_eq!(stats.fetches_issued, 1);
        assert_eq!(stats.subscribers, 2);
        assert!(requests.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_repeat_mount_serves_fresh_data_without_fetching() {
        let config = CacheConfig::default().with_stale_time(Duration::from_secs(60));
        let (cache, mut requests) = start(config);
        let key = QueryKey::feed();

        let mut first = cache.subscribe(&key).await.unwrap();
        expect_list_posts(&mut requests)
            .await
            .unwrap()
            .send(Ok(listing(&[1])))
            .unwrap();
        settled(&mut first).await;
        drop(first);

        let second = cache.subscribe(&key).await.unwrap();
        let state = second.current();
        assert!(state.is_success());
        assert!(!state.is_fetching());
        assert_eq!(ids(&state), vec![1]);
        assert_eq!(cache.stats(&key).await.unwrap().unwrap().fetches_issued, 1);
    }

    #[tokio::test]
    async fn test_repeat_mount_of_stale_data_refetches_in_background() {
        let (cache, mut requests) = start(CacheConfig::default());
        let key = QueryKey::feed();

        let mut first = cache.subscribe(&key).await.unwrap();
        expect_list_posts(&mut requests)
            .await
            .unwrap()
            .send(Ok(listing(&[1])))
            .unwrap();
        settled(&mut first).await;

        let mut second = cache.subscribe(&key).await.unwrap();
        match second.current() {
            QueryState::Success { refetching, .. } => assert!(refetching),
            other => panic!("Expected cached data while refetching, got {other:?}"),
        }

        expect_list_posts(&mut requests)
            .await
            .unwrap()
            .send(Ok(listing(&[2, 1])))
            .unwrap();
        assert_eq!(ids(&settled(&mut second).await), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_invalidate_keeps_data_and_refetches() {
        let (cache, mut requests) = start(CacheConfig::default());
        let key = QueryKey::feed();

        let mut sub = cache.subscribe(&key).await.unwrap();
        expect_list_posts(&mut requests)
            .await
            .unwrap()
            .send(Ok(listing(&[1])))
            .unwrap();
        settled(&mut sub).await;

        cache.invalidate(&key).await.unwrap();

        // No flash to empty: the old feed is still there while refetching.
        let during = sub.current();
        assert!(during.is_fetching());
        assert_eq!(ids(&during), vec![1]);

        expect_list_posts(&mut requests)
            .await
            .unwrap()
            .send(Ok(listing(&[2, 1])))
            .unwrap();
        assert_eq!(ids(&settled(&mut sub).await), vec![2, 1]);
        assert!(!cache.stats(&key).await.unwrap().unwrap().stale);
    }

    #[tokio::test]
    async fn test_invalidate_during_fetch_queues_exactly_one_refetch() {
        let (cache, mut requests) = start(CacheConfig::default());
        let key = QueryKey::feed();

        let mut sub = cache.subscribe(&key).await.unwrap();
        let first = expect_list_posts(&mut requests).await.unwrap();

        for _ in 0..3 {
            cache.invalidate(&key).await.unwrap();
        }
        assert_eq!(cache.stats(&key).await.unwrap().unwrap().fetches_issued, 1);

        first.send(Ok(listing(&[1]))).unwrap();
        let second = expect_list_posts(&mut requests).await.unwrap();
        second.send(Ok(listing(&[2, 1]))).unwrap();

        assert_eq!(ids(&settled(&mut sub).await), vec![2, 1]);
        let stats = cache.stats(&key).await.unwrap().unwrap();
        assert_eq!(stats.fetches_issued, 2);
        assert!(!stats.stale);
        assert!(requests.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_invalidate_without_subscribers_defers_to_next_mount() {
        let config = CacheConfig::default().with_stale_time(Duration::from_secs(60));
        let (cache, mut requests) = start(config);
        let key = QueryKey::feed();

        let mut sub = cache.subscribe(&key).await.unwrap();
        expect_list_posts(&mut requests)
            .await
            .unwrap()
            .send(Ok(listing(&[1])))
            .unwrap();
        settled(&mut sub).await;
        drop(sub);

        cache.invalidate(&key).await.unwrap();
        let stats = cache.stats(&key).await.unwrap().unwrap();
        assert!(stats.stale);
        assert_eq!(stats.fetches_issued, 1);

        let mut sub = cache.subscribe(&key).await.unwrap();
        assert_eq!(ids(&sub.current()), vec![1]);
        expect_list_posts(&mut requests)
            .await
            .unwrap()
            .send(Ok(listing(&[5, 1])))
            .unwrap();
        assert_eq!(ids(&settled(&mut sub).await), vec![5, 1]);
    }

    #[tokio::test]
    async fn test_invalidate_during_unwatched_fetch_keeps_entry_stale() {
        let config = CacheConfig::default().with_stale_time(Duration::from_secs(60));
        let (cache, mut requests) = start(config);
        let key = QueryKey::feed();

        let sub = cache.subscribe(&key).await.unwrap();
        let old_fetch = expect_list_posts(&mut requests).await.unwrap();
        drop(sub);

        cache.invalidate(&key).await.unwrap();
        let stats = cache.stats(&key).await.unwrap().unwrap();
        assert!(stats.stale);
        assert!(stats.fetching);

        // Issued before the invalidation: applying it must not make the entry fresh.
        old_fetch.send(Ok(listing(&[1]))).unwrap();
        let stats = wait_for_stats(&cache, &key, |s| !s.fetching).await;
        assert!(stats.stale);
        assert_eq!(stats.fetches_issued, 1);

        let mut sub = cache.subscribe(&key).await.unwrap();
        assert_eq!(ids(&sub.current()), vec![1]);
        assert_eq!(cache.stats(&key).await.unwrap().unwrap().fetches_issued, 2);

        expect_list_posts(&mut requests)
            .await
            .unwrap()
            .send(Ok(listing(&[2, 1])))
            .unwrap();
        assert_eq!(ids(&settled(&mut sub).await), vec![2, 1]);
        assert!(!cache.stats(&key).await.unwrap().unwrap().stale);
    }

    #[tokio::test]
    async fn test_invalidate_unknown_key_is_noop() {
        let (cache, _requests) = start(CacheConfig::default());
        let key = QueryKey::new("posts.byUser");

        cache.invalidate(&key).await.unwrap();
        assert_eq!(cache.stats(&key).await.unwrap(), None);
        assert_eq!(cache.snapshot(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_late_completion_does_not_overwrite_newer_data() {
        let (cache, mut requests) = start(CacheConfig::default());
        let key = QueryKey::feed();

        let mut sub = cache.subscribe(&key).await.unwrap();
        let fetch_a = expect_list_posts(&mut requests).await.unwrap();
        cache.refetch(&key).await.unwrap();
        let fetch_b = expect_list_posts(&mut requests).await.unwrap();

        fetch_b.send(Ok(listing(&[2, 1]))).unwrap();
        assert_eq!(ids(&settled(&mut sub).await), vec![2, 1]);

        fetch_a.send(Ok(listing(&[1]))).unwrap();
        wait_for_stats(&cache, &key, |s| s.completions_discarded == 1).await;

        assert_eq!(ids(&sub.current()), vec![2, 1]);
        assert_eq!(ids(&cache.snapshot(&key).await.unwrap().unwrap()), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_older_completion_applies_while_newer_still_in_flight() {
        let (cache, mut requests) = start(CacheConfig::default());
        let key = QueryKey::feed();

        let mut sub = cache.subscribe(&key).await.unwrap();
        let fetch_a = expect_list_posts(&mut requests).await.unwrap();
        cache.refetch(&key).await.unwrap();
        let fetch_b = expect_list_posts(&mut requests).await.unwrap();

        fetch_a.send(Ok(listing(&[1]))).unwrap();
        let interim = sub.wait_for(|s| s.is_success()).await.unwrap();
        assert_eq!(ids(&interim), vec![1]);
        assert!(interim.is_fetching());

        fetch_b.send(Ok(listing(&[2, 1]))).unwrap();
        assert_eq!(ids(&settled(&mut sub).await), vec![2, 1]);
        assert_eq!(
            cache.stats(&key).await.unwrap().unwrap().completions_discarded,
            0
        );
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_last_data() {
        let (cache, mut requests) = start(CacheConfig::default());
        let key = QueryKey::feed();

        let mut sub = cache.subscribe(&key).await.unwrap();
        expect_list_posts(&mut requests)
            .await
            .unwrap()
            .send(Ok(listing(&[1])))
            .unwrap();
        settled(&mut sub).await;

        cache.invalidate(&key).await.unwrap();
        expect_list_posts(&mut requests)
            .await
            .unwrap()
            .send(Err(ServiceError::Transport("timeout".into())))
            .unwrap();

        let state = settled(&mut sub).await;
        assert_eq!(
            state.error(),
            Some(&QueryError::Service(ServiceError::Transport("timeout".into())))
        );
        assert_eq!(ids(&state), vec![1]);
    }

    #[tokio::test]
    async fn test_first_fetch_failure_has_no_data() {
        let (cache, mut requests) = start(CacheConfig::default());
        let key = QueryKey::feed();

        let mut sub = cache.subscribe(&key).await.unwrap();
        expect_list_posts(&mut requests)
            .await
            .unwrap()
            .send(Err(ServiceError::RateLimited))
            .unwrap();

        let state = settled(&mut sub).await;
        assert!(matches!(state, QueryState::Error { last_data: None, .. }));

        // Retrying from the error shows Loading again, not the old error.
        cache.refetch(&key).await.unwrap();
        assert_eq!(sub.current(), QueryState::Loading);
    }

    #[tokio::test]
    async fn test_unsubscribed_fetch_still_updates_cache() {
        let (cache, mut requests) = start(CacheConfig::default());
        let key = QueryKey::feed();

        let sub = cache.subscribe(&key).await.unwrap();
        let reply = expect_list_posts(&mut requests).await.unwrap();
        drop(sub);

        reply.send(Ok(listing(&[7]))).unwrap();
        wait_for_stats(&cache, &key, |s| !s.fetching).await;

        let state = cache.snapshot(&key).await.unwrap().unwrap();
        assert!(state.is_success());
        assert_eq!(ids(&state), vec![7]);
    }

    #[tokio::test]
    async fn test_cache_handles_fail_after_shutdown() {
        let (service, _requests) = create_manual_service(1);
        let (actor, cache) =
            QueryCacheActor::new(FeedQuery::new(Arc::new(service)), &CacheConfig::default());
        let handle = tokio::spawn(actor.run());
        let survivor = cache.clone();
        drop(cache);
        handle.abort();
        let _ = handle.await;

        assert_eq!(
            survivor.invalidate(&QueryKey::feed()).await,
            Err(CacheError::ActorClosed)
        );
    }
}
