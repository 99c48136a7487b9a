//! # System Lifecycle & Page Wiring
//!
//! Starting, wiring and stopping the feed core, plus the page that ties the
//! pieces together.
//!
//! - [`FeedSystem`]: spawns the query cache actor, builds the mutation gateway
//!   around it and shuts everything down.
//! - [`FeedPage`]: the feed page. It subscribes to the feed as soon as it is
//!   mounted, before the visitor's identity is known, and renders a
//!   [`PageView`] for the current [`Session`].
//! - [`FeedConfig`]: settings for the cache and the in-memory service.
//! - [`setup_tracing`]: log output.
//!
//! ```rust,ignore
//! let system = FeedSystem::new(&config.cache, service);
//! let page = system.mount_page().await?;
//! let session = system.session(identity.as_ref(), Arc::new(TracingNotifier));
//! let view = page.render(&session);
//! // ...
//! drop(session);
//! system.shutdown().await?;
//! ```

pub mod config;
pub mod page;
pub mod system;
pub mod tracing;

pub use config::*;
pub use page::*;
pub use system::*;
pub use self::tracing::setup_tracing;
