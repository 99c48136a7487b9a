//! Error types for the query cache.

use crate::join::MissingAuthorError;
use crate::service::ServiceError;
use thiserror::Error;

/// Why a query fetch failed. Carried inside [`QueryState::Error`](super::QueryState).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    MissingAuthor(#[from] MissingAuthorError),
}

/// Errors talking to the cache actor itself.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CacheError {
    #[error("Query cache closed")]
    ActorClosed,
    #[error("Query cache dropped response channel")]
    ActorDropped,
}
