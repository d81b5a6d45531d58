#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use tower::ServiceExt;
use uuid::Uuid;

use acebook::app::tokens::{TokenClaims, TokenCodec};
use acebook::domain::post::{NewPost, Post};
use acebook::infra::memory::MemoryStore;
use acebook::infra::store::Store;
use acebook::AppState;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

// "0123456789abcdef0123456789abcdef" (32 bytes, test-only)
pub const TEST_TOKEN_SECRET: [u8; 32] = *b"0123456789abcdef0123456789abcdef";
pub const TEST_TOKEN_TTL_MINUTES: u64 = 10;
pub const DEFAULT_PASSWORD: &str = "12345678";

// ---------------------------------------------------------------------------
// TestApp: one fresh in-memory store per test
// ---------------------------------------------------------------------------

pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub store: MemoryStore,
}

pub struct TestResponse {
    pub status: StatusCode,
    body_bytes: bytes::Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body_bytes).unwrap_or(Value::Null)
    }

    pub fn error_message(&self) -> String {
        self.json()["error"].as_str().unwrap_or("").to_string()
    }

    pub fn token(&self) -> Option<String> {
        self.json()["token"].as_str().map(str::to_string)
    }
}

pub struct TestUser {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub token: String,
}

pub fn app() -> TestApp {
    let store = MemoryStore::new();
    let state = AppState {
        store: Arc::new(store.clone()),
        tokens: TokenCodec::new(TEST_TOKEN_SECRET, TEST_TOKEN_TTL_MINUTES),
        body_limit_bytes: 1024 * 1024,
    };
    let router = acebook::http::router(state.clone());

    TestApp {
        router,
        state,
        store,
    }
}

impl TestApp {
    // ------------------------------------------------------------------
    // Low-level request helper
    // ------------------------------------------------------------------
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header("host", "localhost");

        for &(key, value) in headers {
            builder = builder.header(key, value);
        }

        let request = if let Some(body) = body {
            builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap()
        } else {
            builder.body(Body::empty()).unwrap()
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot failed");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to collect body")
            .to_bytes();

        TestResponse { status, body_bytes }
    }

    // ------------------------------------------------------------------
    // Convenience HTTP helpers
    // ------------------------------------------------------------------
    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        let auth = token.map(|t| format!("Bearer {}", t));
        let headers: Vec<(&str, &str)> = auth
            .as_deref()
            .map(|value| vec![("Authorization", value)])
            .unwrap_or_default();
        self.request(Method::GET, path, None, &headers).await
    }

    pub async fn post_json(&self, path: &str, body: Value, token: Option<&str>) -> TestResponse {
        let auth = token.map(|t| format!("Bearer {}", t));
        let headers: Vec<(&str, &str)> = auth
            .as_deref()
            .map(|value| vec![("Authorization", value)])
            .unwrap_or_default();
        self.request(Method::POST, path, Some(body), &headers).await
    }

    pub async fn put_json(&self, path: &str, body: Value, token: Option<&str>) -> TestResponse {
        let auth = token.map(|t| format!("Bearer {}", t));
        let headers: Vec<(&str, &str)> = auth
            .as_deref()
            .map(|value| vec![("Authorization", value)])
            .unwrap_or_default();
        self.request(Method::PUT, path, Some(body), &headers).await
    }

    // ------------------------------------------------------------------
    // Test data helpers
    // ------------------------------------------------------------------

    /// Sign up through the API, then log in to obtain a token.
    pub async fn create_user(&self, suffix: &str) -> TestUser {
        let display_name = format!("Test User {}", suffix);
        let email = format!("test_{}@example.com", suffix);

        let resp = self
            .post_json(
                "/users",
                json!({
                    "displayName": display_name,
                    "email": email,
                    "password": DEFAULT_PASSWORD,
                }),
                None,
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "signup failed");

        let resp = self
            .post_json(
                "/tokens",
                json!({ "email": email, "password": DEFAULT_PASSWORD }),
                None,
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "login failed");
        let token = resp.token().expect("login returned no token");
        let id = self.claims(&token).subject;

        TestUser {
            id,
            display_name,
            email,
            token,
        }
    }

    /// Token for a subject with no user record, issued five minutes ago.
    pub fn backdated_token(&self, subject: Uuid) -> String {
        let issued_at = OffsetDateTime::now_utc() - Duration::minutes(5);
        self.state
            .tokens
            .issue_at(subject, issued_at)
            .expect("issue_at failed")
            .token
    }

    pub fn claims(&self, token: &str) -> TokenClaims {
        self.state.tokens.verify(token).expect("token should verify")
    }

    /// Insert a post directly into the store, bypassing the API.
    pub async fn create_post(&self, message: &str) -> Post {
        self.store
            .insert_post(NewPost {
                author: Uuid::new_v4(),
                message: message.to_string(),
                image: None,
            })
            .await
            .expect("insert test post failed")
    }

    pub async fn stored_posts(&self) -> Vec<Post> {
        self.store.list_posts().await.expect("list posts failed")
    }
}
