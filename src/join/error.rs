//! Error types for the author join.

use crate::model::{AuthorId, PostId};
use thiserror::Error;

/// A post referenced an author the service did not supply.
///
/// This is a service-contract violation. It fails the whole feed rather than
/// dropping the entry so the integrity problem stays visible.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Missing author {author_id} for post {post_id}")]
pub struct MissingAuthorError {
    pub post_id: PostId,
    pub author_id: AuthorId,
}
