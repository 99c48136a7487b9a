use crate::cache::{CacheError, QueryCache, QueryKey, Subscription};
use crate::composer::{Composer, ComposerView};
use crate::model::Feed;
use crate::presenter::{present, FeedView};
use tracing::debug;

/// What is known about the visitor.
pub enum Session {
    /// The identity provider has not answered yet.
    Loading,
    SignedOut,
    SignedIn(Composer),
}

/// Top of the page, above the feed.
#[derive(Debug, Clone, PartialEq)]
pub enum PageHeader {
    SignIn,
    Composer(ComposerView),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageView {
    /// Rendered while the session is loading.
    Blank,
    Page { header: PageHeader, feed: FeedView },
}

/// The feed page. Holds a live subscription to the feed query.
pub struct FeedPage {
    feed: Subscription<Feed>,
}

impl FeedPage {
    /// Subscribes to the feed, starting its first fetch if needed.
    pub async fn mount(cache: &QueryCache<Feed>, key: &QueryKey) -> Result<Self, CacheError> {
        let feed = cache.subscribe(key).await?;
        debug!(%key, "Page mounted");
        Ok(Self { feed })
    }

    pub fn feed(&self) -> FeedView {
        present(&self.feed.current())
    }

    /// Waits for the feed's next transition.
    pub async fn changed(&mut self) -> Result<FeedView, CacheError> {
        Ok(present(&self.feed.changed().await?))
    }

    /// Waits until the presented feed satisfies `predicate`.
    pub async fn wait_for_feed(
        &mut self,
        mut predicate: impl FnMut(&FeedView) -> bool,
    ) -> Result<FeedView, CacheError> {
        let state = self.feed.wait_for(|state| predicate(&present(state))).await?;
        Ok(present(&state))
    }

    pub fn render(&self, session: &Session) -> PageView {
        let header = match session {
            Session::Loading => return PageView::Blank,
            Session::SignedOut => PageHeader::SignIn,
            Session::SignedIn(composer) => PageHeader::Composer(composer.view()),
        };
        PageView::Page {
            header,
            feed: self.feed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, FeedQuery, QueryCacheActor};
    use crate::model::Identity;
    use crate::mutation::{MutationGateway, RecordingNotifier};
    use crate::service::mock::{create_manual_service, expect_list_posts};
    use crate::service::PostListing;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_page_renders_per_session() {
        let (service, mut requests) = create_manual_service(4);
        let service = Arc::new(service);
        let (actor, cache) =
            QueryCacheActor::new(FeedQuery::new(service.clone()), &CacheConfig::default());
        tokio::spawn(actor.run());
        let key = QueryKey::feed();

        let mut page = FeedPage::mount(&cache, &key).await.unwrap();
        // The feed is already being fetched before anyone knows who is visiting.
        let reply = expect_list_posts(&mut requests).await.expect("Expected ListPosts");

        assert_eq!(page.render(&Session::Loading), PageView::Blank);
        assert_eq!(
            page.render(&Session::SignedOut),
            PageView::Page {
                header: PageHeader::SignIn,
                feed: FeedView::Loading,
            }
        );

        let identity = Identity {
            user_id: "u1".into(),
            username: Some("ferris".into()),
            profile_image_url: "ferris.png".into(),
        };
        let gateway = MutationGateway::new(service, cache.clone(), key.clone());
        let composer = Composer::mount(Some(&identity), gateway, Arc::new(RecordingNotifier::new()))
            .unwrap();
        let session = Session::SignedIn(composer);

        reply.send(Ok(PostListing::Joined(vec![]))).unwrap();
        page.wait_for_feed(|view| matches!(view, FeedView::Ready { .. }))
            .await
            .unwrap();

        match page.render(&session) {
            PageView::Page {
                header: PageHeader::Composer(view),
                feed: FeedView::Ready { entries, .. },
            } => {
                assert_eq!(view.avatar_url, "ferris.png");
                assert!(entries.is_empty());
            }
            other => panic!("Expected composer page, got {other:?}"),
        }
    }
}
