use crate::cache::CacheConfig;
use crate::service::ServiceConfig;

/// All settings of a feed process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedConfig {
    pub cache: CacheConfig,
    pub service: ServiceConfig,
}

impl FeedConfig {
    /// Loads `FEED_CACHE_*` and `FEED_SERVICE_*` variables over the defaults.
    pub fn from_env() -> Result<Self, envy::Error> {
        Ok(Self {
            cache: CacheConfig::from_env()?,
            service: ServiceConfig::from_env()?,
        })
    }
}
