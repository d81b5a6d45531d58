use axum::{routing::get, routing::post, routing::put, Router};

use crate::AppState;
use crate::http::handlers;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn accounts() -> Router<AppState> {
    Router::new()
        .route("/users", post(handlers::create_user))
        .route("/tokens", post(handlers::create_token))
}

pub fn users() -> Router<AppState> {
    Router::new().route("/users/:id", get(handlers::get_user))
}

pub fn posts() -> Router<AppState> {
    Router::new()
        .route("/posts", post(handlers::create_post))
        .route("/posts", get(handlers::list_posts))
        .route("/posts/:id", put(handlers::comment_post))
        .route("/posts/:id/likes", put(handlers::adjust_likes))
        .route("/posts/:id/likes", get(handlers::get_likes))
}
