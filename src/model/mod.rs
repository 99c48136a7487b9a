//! Plain data records exchanged with the posts service and derived by the join.

pub mod author;
pub mod feed;
pub mod post;

pub use author::*;
pub use feed::*;
pub use post::*;
