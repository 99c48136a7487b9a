use crate::cache::{CacheConfig, CacheError, FeedQuery, QueryCache, QueryCacheActor, QueryKey};
use crate::composer::Composer;
use crate::lifecycle::{FeedPage, Session};
use crate::model::{Feed, Identity};
use crate::mutation::{MutationGateway, Notifier};
use crate::service::PostsService;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The running feed core for one process (or one test).
///
/// Every `FeedSystem` owns its own cache actor, so two systems never share
/// cached state.
pub struct FeedSystem {
    /// Handle to the feed query cache.
    pub cache: QueryCache<Feed>,

    /// Gateway every composer of this system submits through.
    pub gateway: MutationGateway,

    feed_key: QueryKey,

    /// Task handles for running actors (used for graceful shutdown)
    handles: Vec<JoinHandle<()>>,
}

impl FeedSystem {
    /// Spawns the query cache actor for `service` and wires the gateway to it.
    pub fn new(config: &CacheConfig, service: Arc<dyn PostsService>) -> Self {
        let (actor, cache) = QueryCacheActor::new(FeedQuery::new(Arc::clone(&service)), config);
        let handle = tokio::spawn(actor.run());

        let feed_key = QueryKey::feed();
        let gateway = MutationGateway::new(service, cache.clone(), feed_key.clone());

        Self {
            cache,
            gateway,
            feed_key,
            handles: vec![handle],
        }
    }

    pub fn feed_key(&self) -> &QueryKey {
        &self.feed_key
    }

    /// Mounts the feed page, which starts loading the feed right away.
    pub async fn mount_page(&self) -> Result<FeedPage, CacheError> {
        FeedPage::mount(&self.cache, &self.feed_key).await
    }

    /// A composer for `identity`, or `None` for a signed-out visitor.
    pub fn composer(
        &self,
        identity: Option<&Identity>,
        notifier: Arc<dyn Notifier>,
    ) -> Option<Composer> {
        Composer::mount(identity, self.gateway.clone(), notifier)
    }

    /// The session for a visitor whose identity has been resolved.
    pub fn session(&self, identity: Option<&Identity>, notifier: Arc<dyn Notifier>) -> Session {
        match self.composer(identity, notifier) {
            Some(composer) => Session::SignedIn(composer),
            None => Session::SignedOut,
        }
    }

    /// Stops the cache actor and waits for it.
    ///
    /// The actor stops once every cache handle is gone, so composers and
    /// sessions built from this system must be dropped first.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down feed system...");

        drop(self.gateway);
        drop(self.cache);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("Feed system shutdown complete.");
        Ok(())
    }
}
