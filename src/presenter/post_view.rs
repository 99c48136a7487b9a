use crate::model::{FeedEntry, PostId};
use crate::presenter::relative_time;
use chrono::{DateTime, Utc};

/// Display-ready fields of one feed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostView {
    pub id: PostId,
    pub avatar_url: String,
    /// `@username`, or `@unknown` for accounts without a username.
    pub handle: String,
    /// Author profile path. `None` when the author has no username to link by.
    pub profile_link: Option<String>,
    pub permalink: String,
    /// Age of the post relative to the render time, e.g. "5 minutes ago".
    pub age: String,
    pub content: String,
}

impl PostView {
    pub fn from_entry(entry: &FeedEntry, now: DateTime<Utc>) -> Self {
        let post = entry.post();
        let author = entry.author();
        let username = author.username.as_deref();
        Self {
            id: post.id,
            avatar_url: author.profile_image_url.clone(),
            handle: format!("@{}", username.unwrap_or("unknown")),
            profile_link: username.map(|name| format!("/@{name}")),
            permalink: format!("/post/{}", post.id),
            age: relative_time(post.created_at, now),
            content: post.content.clone(),
        }
    }
}
