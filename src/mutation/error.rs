//! Error types for the mutation gateway.

use crate::service::ServiceError;
use thiserror::Error;

/// Shown for every failure the user cannot fix by editing the post.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to post. Try Again later.";

/// Why a submit failed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MutationError {
    /// The service rejected the input. `field` is the rejected field.
    #[error("Invalid {field}: {}", .messages.join(", "))]
    Validation { field: String, messages: Vec<String> },

    #[error("Rate limited")]
    RateLimited,

    #[error("Transport error: {0}")]
    Transport(String),
}

impl MutationError {
    /// The text to put in front of the user.
    ///
    /// Only a validation message for the post content is user-correctable and
    /// shown verbatim; everything else gets [`GENERIC_FAILURE_MESSAGE`].
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { field, messages } if field == "content" => messages
                .first()
                .cloned()
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl From<ServiceError> for MutationError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation { field_errors } => {
                // The content field wins; otherwise report the first field with messages.
                let picked = field_errors
                    .get_key_value("content")
                    .filter(|(_, messages)| !messages.is_empty())
                    .or_else(|| field_errors.iter().find(|(_, messages)| !messages.is_empty()));
                match picked {
                    Some((field, messages)) => Self::Validation {
                        field: field.clone(),
                        messages: messages.clone(),
                    },
                    None => Self::Transport("validation failed without messages".into()),
                }
            }
            ServiceError::RateLimited => Self::RateLimited,
            ServiceError::Unauthorized => Self::Transport("unauthorized".into()),
            ServiceError::Transport(reason) => Self::Transport(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_content_validation_message_shown_verbatim() {
        let e = MutationError::from(ServiceError::validation(
            "content",
            ["too many emojis", "second"],
        ));
        assert_eq!(
            e,
            MutationError::Validation {
                field: "content".into(),
                messages: vec!["too many emojis".into(), "second".into()],
            }
        );
        assert_eq!(e.user_message(), "too many emojis");
    }

    #[test]
    fn test_content_field_preferred_over_others() {
        let mut field_errors = BTreeMap::new();
        field_errors.insert("author".to_string(), vec!["bad author".to_string()]);
        field_errors.insert("content".to_string(), vec!["Invalid emoji".to_string()]);
        let e = MutationError::from(ServiceError::Validation { field_errors });
        assert_eq!(e.user_message(), "Invalid emoji");
    }

    #[test]
    fn test_other_field_validation_gets_generic_message() {
        let e = MutationError::from(ServiceError::validation("author", ["bad author"]));
        assert!(matches!(e, MutationError::Validation { ref field, .. } if field == "author"));
        assert_eq!(e.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_empty_validation_is_a_transport_failure() {
        let e = MutationError::from(ServiceError::Validation {
            field_errors: BTreeMap::new(),
        });
        assert!(matches!(e, MutationError::Transport(_)));
        assert_eq!(e.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_non_validation_failures_get_generic_message() {
        for e in [
            ServiceError::RateLimited,
            ServiceError::Unauthorized,
            ServiceError::Transport("connection reset".into()),
        ] {
            assert_eq!(MutationError::from(e).user_message(), GENERIC_FAILURE_MESSAGE);
        }
    }
}
