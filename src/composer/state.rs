/// Composer input state: `Idle → Editing → Submitting → (Idle | Editing)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ComposerState {
    /// Empty input.
    #[default]
    Idle,
    Editing {
        input: String,
    },
    /// `input` has been sent and the input is locked until the service answers.
    Submitting {
        input: String,
    },
}

impl ComposerState {
    pub fn input(&self) -> &str {
        match self {
            Self::Idle => "",
            Self::Editing { input } | Self::Submitting { input } => input,
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting { .. })
    }
}

/// Keys the composer reacts to. Enter submits; typing goes through
/// [`Composer::set_input`](super::Composer::set_input).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Other,
}
