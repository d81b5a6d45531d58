use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::domain::post::{Comment, NewPost, Post};
use crate::domain::user::{NewUser, User, UserCredentials};
use crate::infra::store::Store;

const USER_COLUMNS: &str = "id, display_name, email, image, created_at";
const POST_COLUMNS: &str = "id, author, message, image, date, comments, likes";

#[derive(Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.db_idle_timeout_seconds))
            .max_lifetime(Duration::from_secs(config.db_max_lifetime_seconds))
            .connect(&config.database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl Store for Db {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (id, display_name, email, password_hash, image) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT ON CONSTRAINT users_email_key DO NOTHING \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user.display_name)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.image)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>> {
        let row = sqlx::query("SELECT id, password_hash FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        let credentials = match row {
            Some(row) => Some(UserCredentials {
                user_id: row.try_get("id")?,
                password_hash: row.try_get("password_hash")?,
            }),
            None => None,
        };
        Ok(credentials)
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post> {
        let row = sqlx::query(&format!(
            "INSERT INTO posts (id, author, message, image) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(post.author)
        .bind(post.message)
        .bind(post.image)
        .fetch_one(&self.pool)
        .await?;

        post_from_row(&row)
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        let rows = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts ORDER BY seq"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(post_from_row).collect()
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(post_from_row).transpose()
    }

    async fn push_comment(&self, post_id: Uuid, comment: Comment) -> Result<Option<Post>> {
        let row = sqlx::query(&format!(
            "UPDATE posts SET comments = comments || jsonb_build_array($2::jsonb) \
             WHERE id = $1 \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(post_id)
        .bind(Json(comment))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(post_from_row).transpose()
    }

    async fn add_likes(&self, post_id: Uuid, delta: i64) -> Result<Option<Post>> {
        let row = sqlx::query(&format!(
            "UPDATE posts SET likes = likes + $2 \
             WHERE id = $1 \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(post_id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(post_from_row).transpose()
    }
}

fn user_from_row(row: &PgRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        display_name: row.try_get("display_name")?,
        email: row.try_get("email")?,
        image: row.try_get("image")?,
        created_at: row.try_get("created_at")?,
    })
}

fn post_from_row(row: &PgRow) -> Result<Post> {
    let comments: Json<Vec<Comment>> = row.try_get("comments")?;
    Ok(Post {
        id: row.try_get("id")?,
        author: row.try_get("author")?,
        message: row.try_get("message")?,
        image: row.try_get("image")?,
        date: row.try_get("date")?,
        comments: comments.0,
        likes: row.try_get("likes")?,
    })
}
