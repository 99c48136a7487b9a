use serde::Deserialize;
use std::time::Duration;

/// Query cache settings, loadable from `FEED_CACHE_*` environment variables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Capacity of the request channel to the cache actor.
    pub buffer_size: usize,
    /// How long fetched data counts as fresh. A new subscription to data older
    /// than this triggers a background refetch. Zero refetches on every mount.
    pub stale_time_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            buffer_size: 32,
            stale_time_ms: 0,
        }
    }
}

impl CacheConfig {
    /// Reads overrides from the environment. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("FEED_CACHE_").from_env()
    }

    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time_ms = u64::try_from(stale_time.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_millis(self.stale_time_ms)
    }
}
