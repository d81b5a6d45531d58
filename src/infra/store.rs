use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::post::{Comment, NewPost, Post};
use crate::domain::user::{NewUser, User, UserCredentials};

/// Document persistence used by the services.
///
/// Lookups by id return `Ok(None)` when nothing matches. `Err` is reserved
/// for backend failures.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<()>;

    /// Returns `None` when the email is already registered.
    async fn insert_user(&self, user: NewUser) -> Result<Option<User>>;

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>>;

    async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>>;

    async fn insert_post(&self, post: NewPost) -> Result<Post>;

    /// All posts, oldest first.
    async fn list_posts(&self) -> Result<Vec<Post>>;

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>>;

    /// Appends to the post's embedded comments and returns the updated post.
    async fn push_comment(&self, post_id: Uuid, comment: Comment) -> Result<Option<Post>>;

    /// Adds `delta` to the like counter in a single write.
    async fn add_likes(&self, post_id: Uuid, delta: i64) -> Result<Option<Post>>;
}

pub type SharedStore = Arc<dyn Store>;
