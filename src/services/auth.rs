use sqlx::SqlitePool;

use crate::{
    errors::{ApiError, ApiResult, USER_EXISTS},
    models::user::{SessionResponse, SignupRequest, User},
    services::{
        password::{hash_password_blocking, verify_password_blocking},
        tokens::{TokenError, TokenService},
    },
};

pub const REFRESH_NOT_FOUND: &str = "Refresh token not found";
pub const REFRESH_EXPIRED: &str = "Refresh token expired. Please log in again.";
pub const REFRESH_INVALID: &str = "Invalid refresh token. Please log in again.";

const USER_COLUMNS: &str = "id, username, email, name, password_hash, profile_pic, bio, created_at";

/// A freshly issued token pair. The refresh token travels in a cookie, the
/// rest goes in the JSON body.
#[derive(Debug)]
pub struct Session {
    pub response: SessionResponse,
    pub refresh_token: String,
}

pub struct AuthService;

impl AuthService {
    /// Validate credentials and issue both tokens. Unknown email and wrong
    /// password fail identically.
    pub async fn login(
        pool: &SqlitePool,
        tokens: &TokenService,
        email: &str,
        password: &str,
    ) -> ApiResult<Session> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

        let valid =
            verify_password_blocking(user.password_hash.clone(), password.to_string()).await?;
        if !valid {
            return Err(ApiError::InvalidCredentials);
        }

        tracing::info!(user_id = user.id, "user logged in");
        Self::issue_session(tokens, &user)
    }

    /// Create an account and issue both tokens for it.
    pub async fn signup(
        pool: &SqlitePool,
        tokens: &TokenService,
        req: &SignupRequest,
    ) -> ApiResult<Session> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1 OR username = ?2)",
        )
        .bind(&req.email)
        .bind(&req.username)
        .fetch_one(pool)
        .await?;
        if exists {
            return Err(ApiError::Conflict(USER_EXISTS));
        }

        let password_hash = hash_password_blocking(req.password.clone()).await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, name, password_hash)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&req.username)
        .bind(&req.email)
        .bind(req.name.trim())
        .bind(password_hash)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            // Lost a race with a concurrent signup for the same email/username.
            sqlx::Error::Database(db) if db.is_unique_violation() => ApiError::Conflict(USER_EXISTS),
            other => ApiError::Database(other),
        })?;

        tracing::info!(user_id = user.id, username = %user.username, "user signed up");
        Self::issue_session(tokens, &user)
    }

    /// Mint a new access token from a refresh token. The refresh token is not
    /// rotated and its claims are returned without consulting the store.
    pub fn refresh(tokens: &TokenService, refresh_token: &str) -> ApiResult<SessionResponse> {
        let claims = tokens.verify_refresh_token(refresh_token).map_err(|e| match e {
            TokenError::Expired => ApiError::Unauthorized(REFRESH_EXPIRED),
            TokenError::Invalid => ApiError::Unauthorized(REFRESH_INVALID),
        })?;

        Ok(SessionResponse {
            access_token: tokens.issue_access_token(claims.user_id)?,
            user_id: claims.user_id,
            username: claims.username,
            profile_pic: claims.profile_pic,
        })
    }

    fn issue_session(tokens: &TokenService, user: &User) -> ApiResult<Session> {
        let refresh_token =
            tokens.issue_refresh_token(user.id, &user.username, user.profile_pic.as_deref())?;
        let access_token = tokens.issue_access_token(user.id)?;
        Ok(Session {
            response: SessionResponse {
                access_token,
                user_id: user.id,
                username: user.username.clone(),
                profile_pic: user.profile_pic.clone(),
            },
            refresh_token,
        })
    }
}
