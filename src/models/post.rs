use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const MAX_CONTENT_CHARS: usize = 500;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 50;

/// A post joined with its author and interaction counts.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub author_profile_pic: Option<String>,
    pub parent_post_id: Option<i64>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub like_count: i64,
    pub repost_count: i64,
    pub reply_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
}

impl CreatePostRequest {
    pub fn is_valid(&self) -> bool {
        let trimmed = self.content.trim();
        !trimmed.is_empty() && trimmed.chars().count() <= MAX_CONTENT_CHARS
    }
}

/// Offset pagination: `cursor` is the number of rows already seen.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PostQuery {
    #[serde(default)]
    pub cursor: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            cursor: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PostQuery {
    pub fn is_valid(&self) -> bool {
        self.cursor >= 0 && (1..=MAX_PAGE_SIZE).contains(&self.limit)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub posts: Vec<PostView>,
    pub next_cursor: Option<i64>,
}

impl PostPage {
    pub fn new(posts: Vec<PostView>, query: PostQuery) -> Self {
        let next_cursor = (posts.len() as i64 == query.limit).then(|| query.cursor + query.limit);
        Self { posts, next_cursor }
    }
}

/// The per-user toggles a post supports. Each maps to its own pair table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Like,
    Save,
    Repost,
}

impl Interaction {
    pub fn table(self) -> &'static str {
        match self {
            Interaction::Like => "likes",
            Interaction::Save => "saves",
            Interaction::Repost => "reposts",
        }
    }

    /// JSON key reporting the state after a toggle.
    pub fn state_key(self) -> &'static str {
        match self {
            Interaction::Like => "liked",
            Interaction::Save => "saved",
            Interaction::Repost => "reposted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_defaults_and_bounds() {
        let q: PostQuery = serde_json::from_str("{}").unwrap();
        assert_eq!((q.cursor, q.limit), (0, DEFAULT_PAGE_SIZE));
        assert!(q.is_valid());
        assert!(!PostQuery { cursor: -1, limit: 10 }.is_valid());
        assert!(!PostQuery { cursor: 0, limit: 0 }.is_valid());
        assert!(!PostQuery { cursor: 0, limit: MAX_PAGE_SIZE + 1 }.is_valid());
    }

    #[test]
    fn next_cursor_only_on_full_pages() {
        let q = PostQuery { cursor: 20, limit: 2 };
        assert_eq!(PostPage::new(Vec::new(), q).next_cursor, None);
    }

    #[test]
    fn content_is_trimmed_before_length_check() {
        assert!(!CreatePostRequest { content: "   ".into() }.is_valid());
        assert!(CreatePostRequest { content: " hi ".into() }.is_valid());
        assert!(!CreatePostRequest { content: "a".repeat(MAX_CONTENT_CHARS + 1) }.is_valid());
    }
}
