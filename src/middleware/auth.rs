use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    errors::ApiError,
    models::auth::AuthenticatedUser,
    services::tokens::{TokenError, TokenService},
};

pub const ACCESS_NOT_FOUND: &str = "Access token not found";
pub const ACCESS_EXPIRED: &str = "Access token expired";
pub const ACCESS_INVALID: &str = "Invalid access token";

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::Unauthorized(ACCESS_NOT_FOUND))?;

        let tokens = parts
            .extensions
            .get::<Arc<TokenService>>()
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("token service not configured")))?;

        let claims = tokens.verify_access_token(token).map_err(|e| match e {
            TokenError::Expired => ApiError::Unauthorized(ACCESS_EXPIRED),
            TokenError::Invalid => ApiError::Unauthorized(ACCESS_INVALID),
        })?;

        Ok(AuthenticatedUser {
            user_id: claims.user_id,
        })
    }
}
