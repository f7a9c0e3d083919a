//! Access/refresh token issuance and verification.
//!
//! Both tokens are HS256 JWTs signed with separate secrets. Verification is
//! stateless: nothing here touches the database.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::Config,
    models::auth::{AccessClaims, RefreshClaims},
};

pub const REFRESH_COOKIE: &str = "refreshToken";

const COOKIE_ATTRIBUTES: &str = "HttpOnly; Secure; SameSite=Strict; Path=/";

/// Why a token was rejected. Callers map these to different client messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

pub struct TokenService {
    access_secret: String,
    refresh_secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.access_token_secret.clone(),
            config.refresh_token_secret.clone(),
            Duration::seconds(config.access_token_ttl_seconds as i64),
            Duration::days(config.refresh_token_ttl_days as i64),
        )
    }

    pub fn issue_access_token(&self, user_id: i64) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            user_id,
            iat: now,
            exp: now + self.access_ttl.num_seconds(),
        };
        sign(&claims, &self.access_secret)
    }

    pub fn issue_refresh_token(
        &self,
        user_id: i64,
        username: &str,
        profile_pic: Option<&str>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = RefreshClaims {
            user_id,
            username: username.to_string(),
            profile_pic: profile_pic.map(str::to_string),
            iat: now,
            exp: now + self.refresh_ttl.num_seconds(),
        };
        sign(&claims, &self.refresh_secret)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        verify_token(token, &self.access_secret)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        verify_token(token, &self.refresh_secret)
    }

    /// `Set-Cookie` value carrying a refresh token; Max-Age follows the token lifetime.
    pub fn refresh_cookie(&self, token: &str) -> String {
        let max_age = self.refresh_ttl.num_seconds().max(0);
        format!("{REFRESH_COOKIE}={token}; {COOKIE_ATTRIBUTES}; Max-Age={max_age}")
    }

    pub fn clear_refresh_cookie(&self) -> String {
        format!("{REFRESH_COOKIE}=; {COOKIE_ATTRIBUTES}; Max-Age=0")
    }
}

fn sign<C: Serialize>(claims: &C, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Decode and validate an HS256 token. Expiry is checked with zero leeway.
pub fn verify_token<C: DeserializeOwned>(token: &str, secret: &str) -> Result<C, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_exp = true;

    decode::<C>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })
}
