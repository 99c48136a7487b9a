//! Error types reported by the posts service.

use std::collections::BTreeMap;
use thiserror::Error;

/// Errors the posts service can answer with.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    /// Input failed the service's schema. Messages are keyed by field name.
    #[error("Validation failed: {field_errors:?}")]
    Validation {
        field_errors: BTreeMap<String, Vec<String>>,
    },

    /// The caller has posted too often within the rate-limit window.
    #[error("Too many requests")]
    RateLimited,

    /// The request requires a signed-in caller.
    #[error("Unauthorized")]
    Unauthorized,

    /// The request never produced a service answer (connection, encoding,
    /// server fault).
    #[error("Transport error: {0}")]
    Transport(String),
}

impl ServiceError {
    /// Builds a validation error for a single field.
    pub fn validation<I, S>(field: impl Into<String>, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut field_errors = BTreeMap::new();
        field_errors.insert(
            field.into(),
            messages.into_iter().map(Into::into).collect(),
        );
        Self::Validation { field_errors }
    }

    /// Messages recorded against `field`, when this is a validation error.
    pub fn field_messages(&self, field: &str) -> Option<&[String]> {
        match self {
            Self::Validation { field_errors } => field_errors.get(field).map(Vec::as_slice),
            _ => None,
        }
    }
}
