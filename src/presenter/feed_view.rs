use crate::cache::{QueryError, QueryState};
use crate::model::Feed;
use crate::presenter::PostView;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// What the feed area of the page shows.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedView {
    /// Nothing to show yet.
    Loading,
    /// The feed could not be loaded and there is no earlier copy.
    Failed { cause: QueryError },
    /// Entries in service order.
    ///
    /// `refreshing` is set while a newer copy is being fetched. `stale_error`
    /// holds the failure of the latest fetch when these entries are the last
    /// good copy kept through it.
    Ready {
        entries: Arc<Feed>,
        refreshing: bool,
        stale_error: Option<QueryError>,
    },
}

impl FeedView {
    pub fn entries(&self) -> Option<&Feed> {
        match self {
            Self::Ready { entries, .. } => Some(entries),
            _ => None,
        }
    }

    /// Row views for every entry, aged against `now`. Empty unless ready.
    pub fn posts(&self, now: DateTime<Utc>) -> Vec<PostView> {
        self.entries()
            .map(|feed| feed.iter().map(|e| PostView::from_entry(e, now)).collect())
            .unwrap_or_default()
    }
}

/// Derives the feed view from the feed query's state.
///
/// A key that has not started fetching counts as loading. A failed refetch
/// keeps showing the last good entries, with the failure in `stale_error`.
pub fn present(state: &QueryState<Feed>) -> FeedView {
    match state {
        QueryState::Idle | QueryState::Loading => FeedView::Loading,
        QueryState::Success {
            data, refetching, ..
        } => FeedView::Ready {
            entries: Arc::clone(data),
            refreshing: *refetching,
            stale_error: None,
        },
        QueryState::Error {
            cause,
            last_data: Some(data),
            refetching,
        } => FeedView::Ready {
            entries: Arc::clone(data),
            refreshing: *refetching,
            stale_error: Some(cause.clone()),
        },
        QueryState::Error {
            cause,
            last_data: None,
            ..
        } => FeedView::Failed {
            cause: cause.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::{join_feed, AuthorDirectory, MissingAuthorError};
    use crate::model::{Author, Post, PostId};
    use crate::service::ServiceError;

    fn feed(ids: &[u64]) -> Arc<Feed> {
        let posts: Vec<Post> = ids
            .iter()
            .map(|&id| Post::new(id, "alice", "🦀", Utc::now()))
            .collect();
        let authors = AuthorDirectory::new([Author::new("alice", Some("alice"), "a.png")]);
        Arc::new(join_feed(posts, &authors).unwrap())
    }

    #[test]
    fn test_idle_and_loading_present_as_loading() {
        assert_eq!(present(&QueryState::Idle), FeedView::Loading);
        assert_eq!(present(&QueryState::Loading), FeedView::Loading);
    }

    #[test]
    fn test_success_is_ready_in_service_order() {
        let view = present(&QueryState::Success {
            data: feed(&[42, 7, 1]),
            fetched_at: Utc::now(),
            refetching: true,
        });
        let ids: Vec<u64> = view
            .entries()
            .unwrap()
            .iter()
            .map(|e| e.post().id.0)
            .collect();
        assert_eq!(ids, vec![42, 7, 1]);
        assert!(matches!(view, FeedView::Ready { refreshing: true, stale_error: None, .. }));
    }

    #[test]
    fn test_error_without_data_fails() {
        let cause = QueryError::MissingAuthor(MissingAuthorError {
            post_id: PostId(3),
            author_id: "ghost".into(),
        });
        let view = present(&QueryState::Error {
            cause: cause.clone(),
            last_data: None,
            refetching: false,
        });
        assert_eq!(view, FeedView::Failed { cause });
        assert!(view.posts(Utc::now()).is_empty());
    }

    #[test]
    fn test_error_with_data_keeps_entries_and_cause() {
        let cause = QueryError::Service(ServiceError::Transport("timeout".into()));
        let view = present(&QueryState::Error {
            cause: cause.clone(),
            last_data: Some(feed(&[1])),
            refetching: false,
        });
        match view {
            FeedView::Ready {
                entries,
                stale_error,
                refreshing,
            } => {
                assert_eq!(entries.len(), 1);
                assert_eq!(stale_error, Some(cause));
                assert!(!refreshing);
            }
            other => panic!("Expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn test_posts_render_rows() {
        let view = present(&QueryState::Success {
            data: feed(&[2, 1]),
            fetched_at: Utc::now(),
            refetching: false,
        });
        let rows = view.posts(Utc::now());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].permalink, "/post/2");
        assert_eq!(rows[1].handle, "@alice");
    }
}
