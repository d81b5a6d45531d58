use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub author: Uuid,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Signed running total. Callers apply arbitrary deltas, so it may go
    /// negative.
    pub likes: i64,
}

/// A comment embedded in its parent post.
///
/// `display_name` is copied from the author when the comment is written and
/// is not kept in sync with later profile changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub comment_message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(
        rename = "displayName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author: Uuid,
    pub message: String,
    pub image: Option<String>,
}
