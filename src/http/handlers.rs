use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::auth::{AuthService, Signup};
use crate::app::posts::PostService;
use crate::app::users::UserService;
use crate::domain::post::Post;
use crate::domain::user::User;
use crate::http::auth::AUTH_ERROR;
use crate::http::{AppError, AuthUser};
use crate::AppState;

const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub message: &'static str,
    pub token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMutationResponse {
    pub message: &'static str,
    pub token: String,
    pub updated_post: Post,
}

#[derive(Serialize)]
pub struct PostListResponse {
    pub posts: Vec<Post>,
    pub token: String,
}

#[derive(Serialize)]
pub struct LikesResponse {
    pub likes: i64,
    pub token: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub user: User,
    pub token: String,
}

/// Identifiers that are not UUIDs fail as server errors rather than 404s,
/// which existing clients rely on.
fn parse_id(raw: &str, kind: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|err| {
        tracing::error!(error = %err, id = raw, "malformed {} id", kind);
        AppError::internal(format!("invalid {} id", kind))
    })
}

fn validate_image(image: Option<String>) -> Result<Option<String>, AppError> {
    let Some(image) = image else {
        return Ok(None);
    };
    let image = image.trim();
    if image.is_empty() {
        return Ok(None);
    }
    STANDARD
        .decode(image.as_bytes())
        .map_err(|_| AppError::bad_request("image must be base64 encoded"))?;
    Ok(Some(image.to_string()))
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = match state.store.ping().await {
        Ok(()) => "ok",
        Err(err) => {
            tracing::warn!(error = ?err, "store ping failed");
            "degraded"
        }
    };

    Json(HealthResponse { status })
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub image: Option<String>,
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let display_name = payload.display_name.trim();
    let email = payload.email.trim();

    if display_name.is_empty() {
        return Err(AppError::bad_request("displayName cannot be empty"));
    }
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::bad_request("email is invalid"));
    }
    if payload.password.trim().len() < MIN_PASSWORD_LEN {
        return Err(AppError::bad_request("password must be at least 8 characters"));
    }
    if payload.password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::bad_request("password must be at most 128 characters"));
    }
    let image = validate_image(payload.image)?;

    let service = AuthService::new(state.store.clone(), state.tokens.clone());
    let user = service
        .signup(Signup {
            display_name: display_name.to_string(),
            email: email.to_string(),
            password: payload.password,
            image,
        })
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to create user");
            AppError::internal("failed to create user")
        })?;

    match user {
        Some(user) => {
            tracing::info!(user_id = %user.id, "user signed up");
            Ok((StatusCode::CREATED, Json(MessageResponse { message: "OK" })))
        }
        None => Err(AppError::bad_request("email already registered")),
    }
}

pub async fn get_user(
    Path(id): Path<String>,
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let id = parse_id(&id, "user")?;

    let service = UserService::new(state.store.clone());
    let user = service.get_user(id).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %id, "failed to fetch user");
        AppError::internal("failed to fetch user")
    })?;

    match user {
        Some(user) => Ok(Json(UserResponse {
            user,
            token: auth.token,
        })),
        None => Err(AppError::not_found("user not found")),
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn create_token(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    // Every credential failure looks the same to the client.
    if payload.email.trim().is_empty()
        || payload.password.is_empty()
        || payload.password.len() > MAX_PASSWORD_LEN
    {
        return Err(AppError::unauthorized(AUTH_ERROR));
    }

    let service = AuthService::new(state.store.clone(), state.tokens.clone());
    let issued = service
        .login(payload.email.trim(), &payload.password)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to login");
            AppError::internal("failed to login")
        })?;

    match issued {
        Some(issued) => Ok((
            StatusCode::CREATED,
            Json(TokenResponse {
                message: "OK",
                token: issued.token,
            }),
        )),
        None => Err(AppError::unauthorized(AUTH_ERROR)),
    }
}

#[derive(Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub image: Option<String>,
}

pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostMutationResponse>), AppError> {
    let image = validate_image(payload.image)?;
    if payload.message.trim().is_empty() && image.is_none() {
        return Err(AppError::bad_request("post must have a message or an image"));
    }

    let service = PostService::new(state.store.clone());
    let post = service
        .create_post(auth.user_id, payload.message, image)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %auth.user_id, "failed to create post");
            AppError::internal("failed to create post")
        })?;

    Ok((
        StatusCode::CREATED,
        Json(PostMutationResponse {
            message: "OK",
            token: auth.token,
            updated_post: post,
        }),
    ))
}

pub async fn list_posts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<PostListResponse>, AppError> {
    let service = PostService::new(state.store.clone());
    let posts = service.list_posts().await.map_err(|err| {
        tracing::error!(error = ?err, "failed to list posts");
        AppError::internal("failed to list posts")
    })?;

    Ok(Json(PostListResponse {
        posts,
        token: auth.token,
    }))
}

#[derive(Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub comment: String,
}

pub async fn comment_post(
    Path(id): Path<String>,
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CommentRequest>,
) -> Result<(StatusCode, Json<PostMutationResponse>), AppError> {
    let post_id = parse_id(&id, "post")?;
    let message = payload.comment.trim();
    if message.is_empty() {
        return Err(AppError::bad_request("comment cannot be empty"));
    }

    let service = PostService::new(state.store.clone());
    let post = service
        .add_comment(post_id, auth.user_id, message.to_string())
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, post_id = %post_id, "failed to add comment");
            AppError::internal("failed to add comment")
        })?
        .ok_or_else(|| AppError::not_found("post not found"))?;

    Ok((
        StatusCode::CREATED,
        Json(PostMutationResponse {
            message: "Comment added successfully",
            token: auth.token,
            updated_post: post,
        }),
    ))
}

#[derive(Deserialize)]
pub struct LikesRequest {
    /// Signed delta, `1` to like and `-1` to unlike.
    #[serde(default)]
    pub likes: i64,
}

pub async fn adjust_likes(
    Path(id): Path<String>,
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<LikesRequest>,
) -> Result<(StatusCode, Json<PostMutationResponse>), AppError> {
    let post_id = parse_id(&id, "post")?;

    let service = PostService::new(state.store.clone());
    let post = service
        .adjust_likes(post_id, payload.likes)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, post_id = %post_id, delta = payload.likes, "failed to adjust likes");
            AppError::internal("failed to adjust likes")
        })?
        .ok_or_else(|| AppError::not_found("post not found"))?;

    Ok((
        StatusCode::CREATED,
        Json(PostMutationResponse {
            message: "Like added successfully",
            token: auth.token,
            updated_post: post,
        }),
    ))
}

pub async fn get_likes(
    Path(id): Path<String>,
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<LikesResponse>, AppError> {
    let post_id = parse_id(&id, "post")?;

    let service = PostService::new(state.store.clone());
    let likes = service
        .get_likes(post_id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, post_id = %post_id, "failed to fetch likes");
            AppError::internal("failed to fetch likes")
        })?
        .ok_or_else(|| AppError::not_found("post not found"))?;

    Ok(Json(LikesResponse {
        likes,
        token: auth.token,
    }))
}
