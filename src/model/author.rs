use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identifier of an author as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AuthorId(pub String);

impl From<&str> for AuthorId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AuthorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for AuthorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Public profile of a post author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: AuthorId,
    /// Display handle. Some identity providers allow accounts without one.
    pub username: Option<String>,
    pub profile_image_url: String,
}

impl Author {
    pub fn new(
        id: impl Into<AuthorId>,
        username: Option<&str>,
        profile_image_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.map(str::to_string),
            profile_image_url: profile_image_url.into(),
        }
    }
}

/// The signed-in user, as reported by the identity provider.
///
/// Only its presence matters to the core: the composer is mounted for an
/// identity and never for a signed-out visitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: AuthorId,
    pub username: Option<String>,
    pub profile_image_url: String,
}

impl From<&Identity> for Author {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.user_id.clone(),
            username: identity.username.clone(),
            profile_image_url: identity.profile_image_url.clone(),
        }
    }
}
