//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered
//! by `RUST_LOG`. Module paths are hidden (`with_target(false)`); events carry
//! structured fields such as `key`, `seq` and `post_id` instead.
//!
//! ```bash
//! # Lifecycle only: cache started, fetch applied, post created
//! RUST_LOG=info cargo run
//!
//! # Every subscribe, invalidate, issued fetch and discarded completion
//! RUST_LOG=debug cargo run
//! ```
//!
//! With `RUST_LOG=debug`, a submit followed by its refetch reads:
//!
//! ```text
//! DEBUG submit: submit called content="🦀"
//! INFO submit: Post created post_id=4
//! DEBUG submit:invalidate: Sending request
//! DEBUG Invalidate: refetch started key=posts.getAll
//! DEBUG Fetch issued key=posts.getAll seq=2
//! INFO Fetch applied key=posts.getAll seq=2 subscribers=1
//! ```

/// Initializes the global subscriber. Call once, at process start.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
