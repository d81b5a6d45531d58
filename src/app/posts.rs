use anyhow::Result;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::post::{Comment, NewPost, Post};
use crate::infra::store::SharedStore;

#[derive(Clone)]
pub struct PostService {
    store: SharedStore,
}

impl PostService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn create_post(
        &self,
        author: Uuid,
        message: String,
        image: Option<String>,
    ) -> Result<Post> {
        self.store
            .insert_post(NewPost {
                author,
                message,
                image,
            })
            .await
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        self.store.list_posts().await
    }

    /// Appends a comment, stamping it with the commenter's current display
    /// name. Unknown commenters leave the name empty.
    pub async fn add_comment(
        &self,
        post_id: Uuid,
        commenter_id: Uuid,
        message: String,
    ) -> Result<Option<Post>> {
        let display_name = self
            .store
            .find_user(commenter_id)
            .await?
            .map(|user| user.display_name);

        let comment = Comment {
            comment_message: message,
            date: OffsetDateTime::now_utc(),
            display_name,
        };
        self.store.push_comment(post_id, comment).await
    }

    pub async fn adjust_likes(&self, post_id: Uuid, delta: i64) -> Result<Option<Post>> {
        self.store.add_likes(post_id, delta).await
    }

    pub async fn get_likes(&self, post_id: Uuid) -> Result<Option<i64>> {
        let post = self.store.find_post(post_id).await?;
        Ok(post.map(|post| post.likes))
    }
}
