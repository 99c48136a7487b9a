//! # Composer
//!
//! The post input of a signed-in user. [`Composer`] holds the text being
//! typed, refuses to submit empty or overlapping posts, hands submits to the
//! [`MutationGateway`] and raises exactly one notification per failed submit.
//! The typed text survives a failure so it can be corrected, and is cleared
//! once the post is created.
//!
//! A composer only exists for an [`Identity`]: signed-out visitors never get
//! one (see [`Composer::mount`]).

pub mod state;
pub mod view;

pub use state::*;
pub use view::*;

use crate::model::{Identity, Post};
use crate::mutation::{MutationGateway, Notifier};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument};

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Posted(Post),
    /// The service refused the post; `message` is what the user was notified.
    Rejected { message: String },
    /// Nothing was sent: empty input or a submit already pending.
    Ignored,
}

/// A mounted composer. Clones share the same input state.
#[derive(Clone)]
pub struct Composer {
    identity: Identity,
    gateway: MutationGateway,
    notifier: Arc<dyn Notifier>,
    state: Arc<watch::Sender<ComposerState>>,
}

impl Composer {
    /// Mounts a composer for the signed-in `identity`. `None` when signed out.
    pub fn mount(
        identity: Option<&Identity>,
        gateway: MutationGateway,
        notifier: Arc<dyn Notifier>,
    ) -> Option<Self> {
        let identity = identity?.clone();
        debug!(user_id = %identity.user_id, "Composer mounted");
        let (state, _) = watch::channel(ComposerState::Idle);
        Some(Self {
            identity,
            gateway,
            notifier,
            state: Arc::new(state),
        })
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn state(&self) -> ComposerState {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<ComposerState> {
        self.state.subscribe()
    }

    pub fn view(&self) -> ComposerView {
        ComposerView::from_state(&self.state.borrow(), &self.identity)
    }

    /// Replaces the input text. Ignored while submitting, since the input is
    /// disabled then. Returns whether the text was taken.
    pub fn set_input(&self, text: impl Into<String>) -> bool {
        let text = text.into();
        self.state.send_if_modified(|state| {
            if state.is_submitting() {
                return false;
            }
            let next = if text.is_empty() {
                ComposerState::Idle
            } else {
                ComposerState::Editing { input: text }
            };
            *state = next;
            true
        })
    }

    /// Enter submits; every other key is left to the input field.
    pub async fn handle_key(&self, key: Key) -> SubmitOutcome {
        match key {
            Key::Enter => self.submit().await,
            Key::Other => SubmitOutcome::Ignored,
        }
    }

    /// Submits the current input.
    #[instrument(skip(self), fields(user_id = %self.identity.user_id))]
    pub async fn submit(&self) -> SubmitOutcome {
        let pending = self.gateway.is_pending();
        let mut claimed = None;
        self.state.send_if_modified(|state| match state {
            ComposerState::Editing { input } if !pending && !input.is_empty() => {
                let input = std::mem::take(input);
                claimed = Some(input.clone());
                *state = ComposerState::Submitting { input };
                true
            }
            _ => false,
        });
        let Some(input) = claimed else {
            debug!("Nothing to submit");
            return SubmitOutcome::Ignored;
        };

        match self.gateway.submit(&input).await {
            Ok(post) => {
                info!(post_id = %post.id, "Posted");
                self.state.send_replace(ComposerState::Idle);
                SubmitOutcome::Posted(post)
            }
            Err(e) => {
                let message = e.user_message();
                self.notifier.notify_error(&message);
                self.state.send_replace(ComposerState::Editing { input });
                SubmitOutcome::Rejected { message }
            }
        }
    }
}
