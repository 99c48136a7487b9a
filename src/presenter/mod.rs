//! # Feed Presenter
//!
//! Pure functions from cache state to what the page shows. Nothing here keeps
//! state or talks to the service; call [`present`] again on every
//! [`QueryState`](crate::cache::QueryState) transition.

pub mod feed_view;
pub mod post_view;
pub mod relative_time;

pub use feed_view::*;
pub use post_view::*;
pub use relative_time::*;
