use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// DB row struct
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub profile_pic: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Request/Response DTOs
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn is_valid(&self) -> bool {
        is_valid_email(&self.email) && !self.password.is_empty() && self.password.len() <= 128
    }
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: String,
}

impl SignupRequest {
    pub fn is_valid(&self) -> bool {
        is_valid_username(&self.username)
            && is_valid_email(&self.email)
            && (6..=128).contains(&self.password.chars().count())
            && is_valid_name(&self.name)
    }
}

/// Body of every successful login, signup and refresh.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub access_token: String,
    pub user_id: i64,
    pub username: String,
    pub profile_pic: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub profile_pic: Option<String>,
    pub bio: Option<String>,
    pub followers_count: i64,
    pub following_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub profile_pic: Option<String>,
}

impl UpdateProfileRequest {
    pub fn is_valid(&self) -> bool {
        self.username.as_deref().map_or(true, is_valid_username)
            && self.name.as_deref().map_or(true, is_valid_name)
            && self.bio.as_deref().map_or(true, |b| b.chars().count() <= 160)
            && self
                .profile_pic
                .as_deref()
                .map_or(true, |p| p.len() <= 2048)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyData {
    pub user_id: i64,
    pub username: String,
    pub name: String,
    pub profile_pic: Option<String>,
    pub bio: Option<String>,
    pub liked_post_ids: Vec<i64>,
    pub saved_post_ids: Vec<i64>,
    pub reposted_post_ids: Vec<i64>,
    pub following_ids: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FollowResponse {
    pub following: bool,
}

/// 3-30 chars of ASCII letters, digits and underscores.
pub fn is_valid_username(s: &str) -> bool {
    (3..=30).contains(&s.len()) && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn is_valid_name(s: &str) -> bool {
    let trimmed = s.trim();
    !trimmed.is_empty() && trimmed.chars().count() <= 50
}

/// Loose shape check: one `@`, non-empty local part, dotted domain.
pub fn is_valid_email(s: &str) -> bool {
    if s.len() > 254 || s.chars().any(char::is_whitespace) {
        return false;
    }
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}
