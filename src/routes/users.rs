use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};

use crate::{
    errors::{ApiError, ApiResult, INVALID_USER_DATA},
    models::{
        auth::AuthenticatedUser,
        user::{FollowResponse, MyData, UpdateProfileRequest, UserProfile},
    },
    services::users::{UserService, USER_NOT_FOUND},
    AppState,
};

pub async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<UserProfile>> {
    UserService::profile_by_username(&state.db, &username)
        .await
        .map(Json)
}

pub async fn follow(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<FollowResponse>> {
    // A non-numeric id can never name a user.
    let Ok(Path(target_id)) = path else {
        return Err(ApiError::NotFound(USER_NOT_FOUND));
    };
    let following = UserService::toggle_follow(&state.db, user.user_id, target_id).await?;
    Ok(Json(FollowResponse { following }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    body: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> ApiResult<Json<UserProfile>> {
    let req = match body {
        Ok(Json(req)) if req.is_valid() => req,
        _ => return Err(ApiError::Validation(INVALID_USER_DATA)),
    };
    UserService::update_profile(&state.db, user.user_id, &req)
        .await
        .map(Json)
}

pub async fn my_data(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<MyData>> {
    UserService::my_data(&state.db, user.user_id).await.map(Json)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        services::users::{CANNOT_FOLLOW_SELF, USERNAME_TAKEN, USER_NOT_FOUND},
        test_support::{create_post, send, signup, TestApp},
    };

    #[tokio::test]
    async fn unknown_profile_is_404() {
        let app = TestApp::new().await;
        let (status, _, body) = send(&app.router, "GET", "/api/users/nobody", None, &[]).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], USER_NOT_FOUND);
    }

    #[tokio::test]
    async fn follow_toggles_and_counts_update() {
        let app = TestApp::new().await;
        let ada = signup(&app.router, "ada", "ada@example.com", "analytical").await;
        let grace = signup(&app.router, "grace", "grace@example.com", "cobol-rules").await;
        let uri = format!("/api/users/follow/{}", grace.user_id);

        let (status, _, body) =
            send(&app.router, "PUT", &uri, None, &[("authorization", ada.bearer().as_str())]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["following"], true);

        let (_, _, grace_profile) = send(&app.router, "GET", "/api/users/grace", None, &[]).await;
        assert_eq!(grace_profile["followersCount"], 1);
        assert_eq!(grace_profile["followingCount"], 0);
        let (_, _, ada_profile) = send(&app.router, "GET", "/api/users/ada", None, &[]).await;
        assert_eq!(ada_profile["followingCount"], 1);

        let (_, _, body) =
            send(&app.router, "PUT", &uri, None, &[("authorization", ada.bearer().as_str())]).await;
        assert_eq!(body["following"], false);
        let (_, _, grace_profile) = send(&app.router, "GET", "/api/users/grace", None, &[]).await;
        assert_eq!(grace_profile["followersCount"], 0);
    }

    #[tokio::test]
    async fn cannot_follow_self_or_ghosts() {
        let app = TestApp::new().await;
        let ada = signup(&app.router, "ada", "ada@example.com", "analytical").await;
        let bearer = ada.bearer();

        let (status, _, body) = send(
            &app.router,
            "PUT",
            &format!("/api/users/follow/{}", ada.user_id),
            None,
            &[("authorization", bearer.as_str())],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], CANNOT_FOLLOW_SELF);

        let (status, _, _) = send(
            &app.router,
            "PUT",
            "/api/users/follow/9999",
            None,
            &[("authorization", bearer.as_str())],
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn profile_update_applies_partial_fields() {
        let app = TestApp::new().await;
        let ada = signup(&app.router, "ada", "ada@example.com", "analytical").await;

        let (status, _, body) = send(
            &app.router,
            "PUT",
            "/api/users/me/profile",
            Some(json!({ "bio": "First programmer", "name": "Augusta Ada" })),
            &[("authorization", ada.bearer().as_str())],
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "ada");
        assert_eq!(body["name"], "Augusta Ada");
        assert_eq!(body["bio"], "First programmer");
    }

    #[tokio::test]
    async fn profile_update_rejects_taken_username_and_bad_input() {
        let app = TestApp::new().await;
        let ada = signup(&app.router, "ada", "ada@example.com", "analytical").await;
        signup(&app.router, "grace", "grace@example.com", "cobol-rules").await;
        let bearer = ada.bearer();

        let (status, _, body) = send(
            &app.router,
            "PUT",
            "/api/users/me/profile",
            Some(json!({ "username": "grace" })),
            &[("authorization", bearer.as_str())],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], USERNAME_TAKEN);

        let (status, _, body) = send(
            &app.router,
            "PUT",
            "/api/users/me/profile",
            Some(json!({ "username": "x" })),
            &[("authorization", bearer.as_str())],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid user data");

        // Keeping one's own username is not a conflict.
        let (status, _, _) = send(
            &app.router,
            "PUT",
            "/api/users/me/profile",
            Some(json!({ "username": "ada" })),
            &[("authorization", bearer.as_str())],
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn my_data_lists_interactions() {
        let app = TestApp::new().await;
        let ada = signup(&app.router, "ada", "ada@example.com", "analytical").await;
        let grace = signup(&app.router, "grace", "grace@example.com", "cobol-rules").await;
        let post = create_post(&app.router, &grace, None, "save me").await;
        let bearer = ada.bearer();

        for action in ["like", "save", "repost"] {
            let (status, _, _) = send(
                &app.router,
                "PUT",
                &format!("/api/posts/{post}/{action}"),
                None,
                &[("authorization", bearer.as_str())],
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
        send(
            &app.router,
            "PUT",
            &format!("/api/users/follow/{}", grace.user_id),
            None,
            &[("authorization", bearer.as_str())],
        )
        .await;

        let (status, _, body) = send(
            &app.router,
            "GET",
            "/api/users/me/data",
            None,
            &[("authorization", bearer.as_str())],
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userId"], ada.user_id);
        assert_eq!(body["likedPostIds"], json!([post]));
        assert_eq!(body["savedPostIds"], json!([post]));
        assert_eq!(body["repostedPostIds"], json!([post]));
        assert_eq!(body["followingIds"], json!([grace.user_id]));
    }

    #[tokio::test]
    async fn my_data_requires_token() {
        let app = TestApp::new().await;
        let (status, _, _) = send(&app.router, "GET", "/api/users/me/data", None, &[]).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
