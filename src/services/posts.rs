use sqlx::SqlitePool;

use crate::{
    errors::{ApiError, ApiResult},
    models::post::{Interaction, PostPage, PostQuery, PostView},
};

pub const POST_NOT_FOUND: &str = "Post not found";
pub const PARENT_NOT_FOUND: &str = "Parent post not found";
pub const NOT_POST_OWNER: &str = "You can only delete your own posts";

/// Shared projection for every post listing. `p` is the posts alias.
const POST_VIEW_SELECT: &str = "
    SELECT p.id, p.author_id,
           u.username AS author_username,
           u.profile_pic AS author_profile_pic,
           p.parent_post_id, p.content, p.created_at,
           (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS like_count,
           (SELECT COUNT(*) FROM reposts r WHERE r.post_id = p.id) AS repost_count,
           (SELECT COUNT(*) FROM posts c WHERE c.parent_post_id = p.id) AS reply_count
    FROM posts p
    JOIN users u ON u.id = p.author_id";

pub struct PostService;

impl PostService {
    /// Top-level posts by the viewer, by accounts the viewer follows, or
    /// reposted by accounts the viewer follows. Newest first.
    pub async fn feed(pool: &SqlitePool, viewer_id: i64, query: PostQuery) -> ApiResult<PostPage> {
        let posts = sqlx::query_as::<_, PostView>(&format!(
            "{POST_VIEW_SELECT}
             WHERE p.parent_post_id IS NULL
               AND (p.author_id = ?1
                    OR p.author_id IN (SELECT following_id FROM follows WHERE follower_id = ?1)
                    OR p.id IN (SELECT r.post_id FROM reposts r
                                JOIN follows f ON f.following_id = r.user_id
                                WHERE f.follower_id = ?1))
             ORDER BY p.created_at DESC, p.id DESC
             LIMIT ?2 OFFSET ?3"
        ))
        .bind(viewer_id)
        .bind(query.limit)
        .bind(query.cursor)
        .fetch_all(pool)
        .await?;

        Ok(PostPage::new(posts, query))
    }

    /// Top-level posts ranked by likes, ties broken by recency.
    pub async fn hot(pool: &SqlitePool, query: PostQuery) -> ApiResult<PostPage> {
        let posts = sqlx::query_as::<_, PostView>(&format!(
            "{POST_VIEW_SELECT}
             WHERE p.parent_post_id IS NULL
             ORDER BY like_count DESC, p.created_at DESC, p.id DESC
             LIMIT ?1 OFFSET ?2"
        ))
        .bind(query.limit)
        .bind(query.cursor)
        .fetch_all(pool)
        .await?;

        Ok(PostPage::new(posts, query))
    }

    pub async fn get(pool: &SqlitePool, post_id: i64) -> ApiResult<PostView> {
        sqlx::query_as::<_, PostView>(&format!("{POST_VIEW_SELECT} WHERE p.id = ?1"))
            .bind(post_id)
            .fetch_optional(pool)
            .await?
            .ok_or(ApiError::NotFound(POST_NOT_FOUND))
    }

    /// Direct replies, oldest first.
    pub async fn children(
        pool: &SqlitePool,
        post_id: i64,
        query: PostQuery,
    ) -> ApiResult<PostPage> {
        if !Self::exists(pool, post_id).await? {
            return Err(ApiError::NotFound(POST_NOT_FOUND));
        }

        let posts = sqlx::query_as::<_, PostView>(&format!(
            "{POST_VIEW_SELECT}
             WHERE p.parent_post_id = ?1
             ORDER BY p.created_at ASC, p.id ASC
             LIMIT ?2 OFFSET ?3"
        ))
        .bind(post_id)
        .bind(query.limit)
        .bind(query.cursor)
        .fetch_all(pool)
        .await?;

        Ok(PostPage::new(posts, query))
    }

    pub async fn create(
        pool: &SqlitePool,
        author_id: i64,
        parent_post_id: Option<i64>,
        content: &str,
    ) -> ApiResult<PostView> {
        if let Some(parent) = parent_post_id {
            if !Self::exists(pool, parent).await? {
                return Err(ApiError::NotFound(PARENT_NOT_FOUND));
            }
        }

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO posts (author_id, parent_post_id, content) VALUES (?1, ?2, ?3)
             RETURNING id",
        )
        .bind(author_id)
        .bind(parent_post_id)
        .bind(content.trim())
        .fetch_one(pool)
        .await?;

        tracing::debug!(post_id = id, author_id, ?parent_post_id, "post created");
        Self::get(pool, id).await
    }

    /// Delete a post the caller owns; replies and interactions cascade.
    pub async fn delete(pool: &SqlitePool, user_id: i64, post_id: i64) -> ApiResult<()> {
        let author_id: i64 = sqlx::query_scalar("SELECT author_id FROM posts WHERE id = ?1")
            .bind(post_id)
            .fetch_optional(pool)
            .await?
            .ok_or(ApiError::NotFound(POST_NOT_FOUND))?;

        if author_id != user_id {
            return Err(ApiError::Forbidden(NOT_POST_OWNER));
        }

        sqlx::query("DELETE FROM posts WHERE id = ?1")
            .bind(post_id)
            .execute(pool)
            .await?;

        tracing::info!(post_id, user_id, "post deleted");
        Ok(())
    }

    /// Flip the caller's like/save/repost on a post. Returns the new state.
    pub async fn toggle(
        pool: &SqlitePool,
        interaction: Interaction,
        user_id: i64,
        post_id: i64,
    ) -> ApiResult<bool> {
        if !Self::exists(pool, post_id).await? {
            return Err(ApiError::NotFound(POST_NOT_FOUND));
        }

        let table = interaction.table();
        let removed = sqlx::query(&format!(
            "DELETE FROM {table} WHERE user_id = ?1 AND post_id = ?2"
        ))
        .bind(user_id)
        .bind(post_id)
        .execute(pool)
        .await?
        .rows_affected();

        if removed > 0 {
            return Ok(false);
        }

        sqlx::query(&format!(
            "INSERT OR IGNORE INTO {table} (user_id, post_id) VALUES (?1, ?2)"
        ))
        .bind(user_id)
        .bind(post_id)
        .execute(pool)
        .await?;

        Ok(true)
    }

    async fn exists(pool: &SqlitePool, post_id: i64) -> ApiResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = ?1)")
            .bind(post_id)
            .fetch_one(pool)
            .await?;
        Ok(exists)
    }
}
