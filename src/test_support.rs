//! Shared helpers for handler tests: an in-memory store behind the real router.

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{app, config::Config, db, AppState};

pub const ACCESS_SECRET: &str = "test-access-secret";
pub const REFRESH_SECRET: &str = "test-refresh-secret";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = db::create_memory_pool().await.expect("in-memory pool");
        let config = Config {
            database_url: "sqlite::memory:".into(),
            access_token_secret: ACCESS_SECRET.into(),
            refresh_token_secret: REFRESH_SECRET.into(),
            access_token_ttl_seconds: 900,
            refresh_token_ttl_days: 7,
            host: "127.0.0.1".into(),
            port: 0,
            client_url: "http://localhost:5173".into(),
        };
        let state = AppState::new(pool, config);
        Self {
            router: app(state.clone()),
            state,
        }
    }
}

/// Issue one request and return status, headers and the JSON body
/// (`Value::Null` when the body is empty).
pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    headers: &[(&str, &str)],
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("valid request");

    let response = router.clone().oneshot(request).await.expect("infallible router");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, headers, body)
}

pub fn set_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub struct SignedUp {
    pub user_id: i64,
    pub access_token: String,
    pub refresh_token: String,
}

impl SignedUp {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

pub async fn signup(router: &Router, username: &str, email: &str, password: &str) -> SignedUp {
    let (status, headers, body) = send(
        router,
        "POST",
        "/api/auth/signup",
        Some(json!({
            "username": username,
            "email": email,
            "password": password,
            "name": username,
        })),
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");

    let cookie = set_cookie(&headers).expect("refresh cookie");
    let refresh_token = cookie
        .strip_prefix("refreshToken=")
        .and_then(|rest| rest.split(';').next())
        .expect("refresh token value")
        .to_string();

    SignedUp {
        user_id: body["userId"].as_i64().expect("userId"),
        access_token: body["accessToken"].as_str().expect("accessToken").to_string(),
        refresh_token,
    }
}

/// Create a post as `user` and return its id.
pub async fn create_post(router: &Router, user: &SignedUp, parent: Option<i64>, content: &str) -> i64 {
    let uri = match parent {
        Some(id) => format!("/api/posts/{id}"),
        None => "/api/posts".to_string(),
    };
    let bearer = user.bearer();
    let (status, _, body) = send(
        router,
        "POST",
        &uri,
        Some(json!({ "content": content })),
        &[("authorization", bearer.as_str())],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create post failed: {body}");
    body["id"].as_i64().expect("post id")
}
