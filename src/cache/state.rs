use crate::cache::QueryError;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Published state of one cached query.
///
/// Errors keep the last successful data (stale-while-error): a failed refetch
/// never takes a feed away from the screen. `refetching` marks a fetch in
/// flight while data is already being shown.
#[derive(Debug, PartialEq)]
pub enum QueryState<T> {
    /// Known key, nothing fetched and nothing in flight.
    Idle,
    /// First fetch in flight, no data yet.
    Loading,
    Success {
        data: Arc<T>,
        fetched_at: DateTime<Utc>,
        refetching: bool,
    },
    Error {
        cause: QueryError,
        last_data: Option<Arc<T>>,
        refetching: bool,
    },
}

// Manual impl: data is shared through `Arc`, so `T` itself need not be `Clone`.
impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Loading => Self::Loading,
            Self::Success {
                data,
                fetched_at,
                refetching,
            } => Self::Success {
                data: Arc::clone(data),
                fetched_at: *fetched_at,
                refetching: *refetching,
            },
            Self::Error {
                cause,
                last_data,
                refetching,
            } => Self::Error {
                cause: cause.clone(),
                last_data: last_data.clone(),
                refetching: *refetching,
            },
        }
    }
}

impl<T> QueryState<T> {
    /// The data to show, fresh or retained.
    pub fn data(&self) -> Option<&Arc<T>> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Error { last_data, .. } => last_data.as_ref(),
            Self::Idle | Self::Loading => None,
        }
    }

    pub fn error(&self) -> Option<&QueryError> {
        match self {
            Self::Error { cause, .. } => Some(cause),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Whether any fetch is in flight.
    pub fn is_fetching(&self) -> bool {
        match self {
            Self::Loading => true,
            Self::Success { refetching, .. } | Self::Error { refetching, .. } => *refetching,
            Self::Idle => false,
        }
    }

    /// Whether the state has settled (nothing in flight).
    pub fn is_settled(&self) -> bool {
        !self.is_fetching()
    }
}
