use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identity of a cached query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryKey(String);

impl QueryKey {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The "all posts" feed query.
    pub fn feed() -> Self {
        Self::new("posts.getAll")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
