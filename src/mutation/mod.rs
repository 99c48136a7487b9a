//! # Mutation Gateway
//!
//! Creating posts: [`MutationGateway`] talks to the service, publishes a
//! [`MutationState`] per submit and invalidates the feed on success.
//! [`MutationError`] turns service failures into what the user is shown, and
//! [`Notifier`] is where that message goes.

pub mod error;
pub mod gateway;
pub mod notifier;
pub mod state;

pub use error::*;
pub use gateway::*;
pub use notifier::*;
pub use state::*;
