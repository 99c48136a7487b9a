//! Demo: one signed-in user posting to a feed backed by the in-memory service.

use chrono::Utc;
use feed_sync::lifecycle::{setup_tracing, FeedConfig, FeedSystem, Session};
use feed_sync::model::{Author, Identity};
use feed_sync::mutation::TracingNotifier;
use feed_sync::presenter::FeedView;
use feed_sync::service::PostsStore;
use std::sync::Arc;
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = FeedConfig::from_env().map_err(|e| e.to_string())?;
    info!(?config, "Starting feed demo");

    let (store, service) = PostsStore::new(config.service.clone());
    let store_handle = tokio::spawn(store.run());

    let identity = Identity {
        user_id: "user_1".into(),
        username: Some("ferris".to_string()),
        profile_image_url: "https://example.com/ferris.png".to_string(),
    };
    service
        .register_author(Author::from(&identity))
        .await
        .map_err(|e| e.to_string())?;

    let system = FeedSystem::new(
        &config.cache,
        Arc::new(service.signed_in(identity.user_id.clone())),
    );
    drop(service);

    // The page starts loading the feed before the identity is resolved.
    let mut page = system.mount_page().await.map_err(|e| e.to_string())?;
    let session = system.session(Some(&identity), Arc::new(TracingNotifier));
    let Session::SignedIn(composer) = &session else {
        return Err("Composer not mounted".to_string());
    };

    for content in ["🦀", "🦀🚀", "hello"] {
        let span = tracing::info_span!("compose", content);
        async {
            composer.set_input(content);
            let outcome = composer.submit().await;
            info!(?outcome, "Submitted");
        }
        .instrument(span)
        .await;
    }

    let view = page
        .wait_for_feed(|view| matches!(view, FeedView::Ready { refreshing: false, .. }))
        .await
        .map_err(|e| e.to_string())?;
    for row in view.posts(Utc::now()) {
        info!(id = %row.id, handle = %row.handle, age = %row.age, "{}", row.content);
    }

    drop(page);
    drop(session);
    system.shutdown().await?;
    store_handle.await.map_err(|e| e.to_string())?;

    info!("Demo completed successfully");
    Ok(())
}
