use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::post::{Comment, NewPost, Post};
use crate::domain::user::{NewUser, User, UserCredentials};
use crate::infra::store::Store;

/// Process-local store. Used for `STORE_BACKEND=memory` and by the test
/// harness.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, StoredUser>,
    /// Insertion order doubles as creation order.
    posts: Vec<Post>,
}

struct StoredUser {
    user: User,
    password_hash: String,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>> {
        self.inner
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>> {
        self.inner
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<()> {
        self.read().map(|_| ())
    }

    async fn insert_user(&self, user: NewUser) -> Result<Option<User>> {
        let mut collections = self.write()?;
        if collections
            .users
            .values()
            .any(|stored| stored.user.email == user.email)
        {
            return Ok(None);
        }

        let created = User {
            id: Uuid::new_v4(),
            display_name: user.display_name,
            email: user.email,
            image: user.image,
            created_at: OffsetDateTime::now_utc(),
        };
        collections.users.insert(
            created.id,
            StoredUser {
                user: created.clone(),
                password_hash: user.password_hash,
            },
        );
        Ok(Some(created))
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let collections = self.read()?;
        Ok(collections
            .users
            .get(&user_id)
            .map(|stored| stored.user.clone()))
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>> {
        let collections = self.read()?;
        Ok(collections
            .users
            .values()
            .find(|stored| stored.user.email == email)
            .map(|stored| UserCredentials {
                user_id: stored.user.id,
                password_hash: stored.password_hash.clone(),
            }))
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post> {
        let created = Post {
            id: Uuid::new_v4(),
            author: post.author,
            message: post.message,
            image: post.image,
            date: OffsetDateTime::now_utc(),
            comments: Vec::new(),
            likes: 0,
        };
        self.write()?.posts.push(created.clone());
        Ok(created)
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        Ok(self.read()?.posts.clone())
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let collections = self.read()?;
        Ok(collections.posts.iter().find(|post| post.id == post_id).cloned())
    }

    async fn push_comment(&self, post_id: Uuid, comment: Comment) -> Result<Option<Post>> {
        let mut collections = self.write()?;
        let Some(post) = collections.posts.iter_mut().find(|post| post.id == post_id) else {
            return Ok(None);
        };
        post.comments.push(comment);
        Ok(Some(post.clone()))
    }

    async fn add_likes(&self, post_id: Uuid, delta: i64) -> Result<Option<Post>> {
        let mut collections = self.write()?;
        let Some(post) = collections.posts.iter_mut().find(|post| post.id == post_id) else {
            return Ok(None);
        };
        post.likes = post
            .likes
            .checked_add(delta)
            .ok_or_else(|| anyhow!("like counter overflow"))?;
        Ok(Some(post.clone()))
    }
}
