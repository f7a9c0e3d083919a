pub mod config;
pub mod db;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Extension, Router,
};
use sqlx::SqlitePool;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use services::tokens::TokenService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<Config>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: Config) -> Self {
        let tokens = Arc::new(TokenService::from_config(&config));
        Self {
            db,
            config: Arc::new(config),
            tokens,
        }
    }
}

/// The configured client origin, plus localhost during development.
fn cors_layer(client_url: &str) -> CorsLayer {
    let client = client_url.trim_end_matches('/').to_string();
    let origin = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        let Ok(o) = origin.to_str() else {
            return false;
        };
        o == client || o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1")
    });

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_origin(origin)
        .allow_credentials(true)
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        // Auth
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/signup", post(routes::auth::signup))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/auth/refresh", post(routes::auth::refresh_token))
        // Posts
        .route("/api/posts", post(routes::posts::create_post))
        .route("/api/posts/feed", get(routes::posts::feed))
        .route("/api/posts/hot", get(routes::posts::hot))
        .route(
            "/api/posts/{post_id}",
            get(routes::posts::get_post)
                .post(routes::posts::create_reply)
                .delete(routes::posts::delete_post),
        )
        .route("/api/posts/{post_id}/children", get(routes::posts::children))
        .route("/api/posts/{post_id}/like", put(routes::posts::like))
        .route("/api/posts/{post_id}/save", put(routes::posts::save))
        .route("/api/posts/{post_id}/repost", put(routes::posts::repost))
        // Users
        .route("/api/users/{username}", get(routes::users::get_profile))
        .route("/api/users/follow/{id}", put(routes::users::follow))
        .route("/api/users/me/profile", put(routes::users::update_profile))
        .route("/api/users/me/data", get(routes::users::my_data))
        .layer(Extension(state.tokens.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.client_url))
        .with_state(state)
}
