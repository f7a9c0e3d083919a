use sqlx::SqlitePool;

use crate::{
    errors::{ApiError, ApiResult},
    models::user::{MyData, UpdateProfileRequest, User, UserProfile},
};

pub const USER_NOT_FOUND: &str = "User not found";
pub const CANNOT_FOLLOW_SELF: &str = "You cannot follow yourself";
pub const USERNAME_TAKEN: &str = "Username already taken";

const PROFILE_SELECT: &str = "
    SELECT u.id, u.username, u.name, u.profile_pic, u.bio, u.created_at,
           (SELECT COUNT(*) FROM follows f WHERE f.following_id = u.id) AS followers_count,
           (SELECT COUNT(*) FROM follows f WHERE f.follower_id = u.id) AS following_count
    FROM users u";

pub struct UserService;

impl UserService {
    pub async fn profile_by_username(pool: &SqlitePool, username: &str) -> ApiResult<UserProfile> {
        sqlx::query_as::<_, UserProfile>(&format!("{PROFILE_SELECT} WHERE u.username = ?1"))
            .bind(username)
            .fetch_optional(pool)
            .await?
            .ok_or(ApiError::NotFound(USER_NOT_FOUND))
    }

    pub async fn profile_by_id(pool: &SqlitePool, user_id: i64) -> ApiResult<UserProfile> {
        sqlx::query_as::<_, UserProfile>(&format!("{PROFILE_SELECT} WHERE u.id = ?1"))
            .bind(user_id)
            .fetch_optional(pool)
            .await?
            .ok_or(ApiError::NotFound(USER_NOT_FOUND))
    }

    /// Follow `target_id` if not already following, otherwise unfollow.
    /// Returns whether the caller follows the target afterwards.
    pub async fn toggle_follow(pool: &SqlitePool, user_id: i64, target_id: i64) -> ApiResult<bool> {
        if user_id == target_id {
            return Err(ApiError::Validation(CANNOT_FOLLOW_SELF));
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)")
            .bind(target_id)
            .fetch_one(pool)
            .await?;
        if !exists {
            return Err(ApiError::NotFound(USER_NOT_FOUND));
        }

        let removed = sqlx::query("DELETE FROM follows WHERE follower_id = ?1 AND following_id = ?2")
            .bind(user_id)
            .bind(target_id)
            .execute(pool)
            .await?
            .rows_affected();
        if removed > 0 {
            return Ok(false);
        }

        sqlx::query("INSERT OR IGNORE INTO follows (follower_id, following_id) VALUES (?1, ?2)")
            .bind(user_id)
            .bind(target_id)
            .execute(pool)
            .await?;
        Ok(true)
    }

    /// Apply a partial profile update. Tokens already issued keep the old
    /// username/picture until the next login.
    pub async fn update_profile(
        pool: &SqlitePool,
        user_id: i64,
        req: &UpdateProfileRequest,
    ) -> ApiResult<UserProfile> {
        if let Some(username) = &req.username {
            let taken: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1 AND id != ?2)",
            )
            .bind(username)
            .bind(user_id)
            .fetch_one(pool)
            .await?;
            if taken {
                return Err(ApiError::Conflict(USERNAME_TAKEN));
            }
        }

        let updated = sqlx::query(
            "UPDATE users SET
                username    = COALESCE(?1, username),
                name        = COALESCE(?2, name),
                bio         = COALESCE(?3, bio),
                profile_pic = COALESCE(?4, profile_pic)
             WHERE id = ?5",
        )
        .bind(req.username.as_deref())
        .bind(req.name.as_deref().map(str::trim))
        .bind(req.bio.as_deref())
        .bind(req.profile_pic.as_deref())
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::Conflict(USERNAME_TAKEN)
            }
            other => ApiError::Database(other),
        })?
        .rows_affected();

        if updated == 0 {
            return Err(ApiError::NotFound(USER_NOT_FOUND));
        }

        tracing::info!(user_id, "profile updated");
        Self::profile_by_id(pool, user_id).await
    }

    pub async fn my_data(pool: &SqlitePool, user_id: i64) -> ApiResult<MyData> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, name, password_hash, profile_pic, bio, created_at
             FROM users WHERE id = ?1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::NotFound(USER_NOT_FOUND))?;

        Ok(MyData {
            user_id: user.id,
            username: user.username,
            name: user.name,
            profile_pic: user.profile_pic,
            bio: user.bio,
            liked_post_ids: Self::ids(pool, "SELECT post_id FROM likes WHERE user_id = ?1", user_id).await?,
            saved_post_ids: Self::ids(pool, "SELECT post_id FROM saves WHERE user_id = ?1", user_id).await?,
            reposted_post_ids: Self::ids(pool, "SELECT post_id FROM reposts WHERE user_id = ?1", user_id)
                .await?,
            following_ids: Self::ids(
                pool,
                "SELECT following_id FROM follows WHERE follower_id = ?1",
                user_id,
            )
            .await?,
        })
    }

    async fn ids(pool: &SqlitePool, sql: &str, user_id: i64) -> ApiResult<Vec<i64>> {
        let mut ids: Vec<i64> = sqlx::query_scalar(sql).bind(user_id).fetch_all(pool).await?;
        ids.sort_unstable();
        Ok(ids)
    }
}
