use crate::model::Post;
use crate::mutation::MutationError;

/// Lifecycle of the most recent submit: `Idle → Pending → (Success | Error)`.
///
/// Every submit resets the state to `Idle` before publishing `Pending`, so a
/// terminal state never leaks into the next attempt.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MutationState {
    #[default]
    Idle,
    Pending {
        input: String,
    },
    Success {
        post: Post,
    },
    /// `input` is what was submitted, kept so it can be corrected.
    Error {
        input: String,
        cause: MutationError,
    },
}

impl MutationState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    pub fn error(&self) -> Option<&MutationError> {
        match self {
            Self::Error { cause, .. } => Some(cause),
            _ => None,
        }
    }
}
