use crate::composer::ComposerState;
use crate::model::Identity;

pub const PLACEHOLDER: &str = "Type some emojis!";

/// Render-ready composer row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerView {
    pub avatar_url: String,
    pub placeholder: &'static str,
    pub input: String,
    pub input_enabled: bool,
    pub show_post_button: bool,
    pub show_spinner: bool,
}

impl ComposerView {
    pub fn from_state(state: &ComposerState, identity: &Identity) -> Self {
        let submitting = state.is_submitting();
        Self {
            avatar_url: identity.profile_image_url.clone(),
            placeholder: PLACEHOLDER,
            input: state.input().to_string(),
            input_enabled: !submitting,
            show_post_button: !submitting && !state.input().is_empty(),
            show_spinner: submitting,
        }
    }
}
