use serde::{Deserialize, Serialize};

/// Claims embedded in the access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    pub user_id: i64,
    pub iat: i64,
    pub exp: i64,
}

/// Claims embedded in the refresh token. The display fields are a snapshot
/// taken at login/signup and are trusted as-is on refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshClaims {
    pub user_id: i64,
    pub username: String,
    pub profile_pic: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// Extracted from a validated access token by the Axum extractor in `middleware::auth`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i64,
}
