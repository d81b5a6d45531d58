use axum::body::Body;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use http_body_util::LengthLimitError;
use std::error::Error as StdError;
use uuid::Uuid;

use crate::http::AppError;
use crate::AppState;

/// Message for every authentication failure. Missing, expired and forged
/// tokens are indistinguishable to the client.
pub const AUTH_ERROR: &str = "auth error";

/// The caller resolved by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    /// Replacement credential with a later issued-at than the presented one.
    /// Handlers return it on success only.
    pub token: String,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized(AUTH_ERROR))
    }
}

/// Authenticates the request and rotates its token.
///
/// The token comes from `Authorization: Bearer`, or failing that from a
/// top-level `token` string in a JSON body. When the body is inspected it is
/// buffered and handed on unchanged.
pub async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (parts, body) = request.into_parts();

    let (token, body) = match bearer_token(&parts.headers) {
        Some(token) => (Some(token), body),
        None => {
            let bytes = axum::body::to_bytes(body, state.body_limit_bytes)
                .await
                .map_err(|err| {
                    tracing::warn!(error = %err, "failed to buffer request body");
                    if exceeds_length_limit(&err) {
                        AppError::payload_too_large("request body too large")
                    } else {
                        AppError::bad_request("failed to read request body")
                    }
                })?;
            (body_token(&bytes), Body::from(bytes))
        }
    };

    let Some(token) = token else {
        tracing::debug!(method = %parts.method, path = %parts.uri.path(), "missing token");
        return Err(AppError::unauthorized(AUTH_ERROR));
    };

    let claims = state.tokens.verify(&token).map_err(|err| {
        tracing::debug!(reason = %err, path = %parts.uri.path(), "token rejected");
        AppError::unauthorized(AUTH_ERROR)
    })?;

    let rotated = state.tokens.rotate(&claims).map_err(|err| {
        tracing::error!(error = ?err, user_id = %claims.subject, "failed to rotate token");
        AppError::internal("failed to issue token")
    })?;

    let mut request = Request::from_parts(parts, body);
    request.extensions_mut().insert(AuthUser {
        user_id: claims.subject,
        token: rotated.token,
    });

    Ok(next.run(request).await)
}

fn exceeds_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(current) = source {
        if current.is::<LengthLimitError>() {
            return true;
        }
        source = current.source();
    }
    false
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
}

fn body_token(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    let value: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    value
        .get("token")
        .and_then(|token| token.as_str())
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
}
