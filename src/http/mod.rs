use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use crate::AppState;

mod auth;
mod error;
mod handlers;
mod routes;

pub use auth::{require_auth, AuthUser, AUTH_ERROR};
pub use error::AppError;

pub fn router(state: AppState) -> Router {
    let authenticated = Router::new()
        .merge(routes::users())
        .merge(routes::posts())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(routes::health())
        .merge(routes::accounts())
        .merge(authenticated)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.body_limit_bytes))
        .with_state(state)
}
