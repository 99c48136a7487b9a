//! Settings for the in-memory posts service.

use serde::Deserialize;
use std::time::Duration;

/// Service rules, loadable from `FEED_SERVICE_*` environment variables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Upper bound on post length, in UTF-16 code units.
    pub max_content_len: usize,
    /// Reject content containing anything other than emoji.
    pub emoji_only: bool,
    /// Posts allowed per author within one window.
    pub rate_limit: usize,
    pub rate_limit_window_ms: u64,
    /// Artificial delay applied to every call.
    pub latency_ms: u64,
    /// Pair posts with authors before answering a listing.
    pub server_side_join: bool,
    pub buffer_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_content_len: 280,
            emoji_only: true,
            rate_limit: 3,
            rate_limit_window_ms: 60_000,
            latency_ms: 0,
            server_side_join: true,
            buffer_size: 32,
        }
    }
}

impl ServiceConfig {
    /// Reads overrides from the environment. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("FEED_SERVICE_").from_env()
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}
