use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    errors::{ApiError, ApiResult},
    models::{
        auth::AuthenticatedUser,
        post::{CreatePostRequest, Interaction, PostPage, PostQuery, PostView},
    },
    services::posts::PostService,
    AppState,
};

const INVALID_POST_ID: &str = "Invalid post id";
const INVALID_POST_DATA: &str = "Invalid post data";
const INVALID_QUERY: &str = "Invalid query parameters";

fn post_id(path: Result<Path<i64>, PathRejection>) -> ApiResult<i64> {
    match path {
        Ok(Path(id)) if id > 0 => Ok(id),
        _ => Err(ApiError::Validation(INVALID_POST_ID)),
    }
}

fn page_query(query: Result<Query<PostQuery>, QueryRejection>) -> ApiResult<PostQuery> {
    match query {
        Ok(Query(q)) if q.is_valid() => Ok(q),
        _ => Err(ApiError::Validation(INVALID_QUERY)),
    }
}

fn post_body(body: Result<Json<CreatePostRequest>, JsonRejection>) -> ApiResult<CreatePostRequest> {
    match body {
        Ok(Json(req)) if req.is_valid() => Ok(req),
        _ => Err(ApiError::Validation(INVALID_POST_DATA)),
    }
}

pub async fn feed(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    query: Result<Query<PostQuery>, QueryRejection>,
) -> ApiResult<Json<PostPage>> {
    let query = page_query(query)?;
    PostService::feed(&state.db, user.user_id, query).await.map(Json)
}

pub async fn hot(
    State(state): State<AppState>,
    query: Result<Query<PostQuery>, QueryRejection>,
) -> ApiResult<Json<PostPage>> {
    let query = page_query(query)?;
    PostService::hot(&state.db, query).await.map(Json)
}

pub async fn get_post(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<PostView>> {
    let id = post_id(path)?;
    PostService::get(&state.db, id).await.map(Json)
}

pub async fn children(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<PostQuery>, QueryRejection>,
) -> ApiResult<Json<PostPage>> {
    let id = post_id(path)?;
    let query = page_query(query)?;
    PostService::children(&state.db, id, query).await.map(Json)
}

pub async fn create_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    body: Result<Json<CreatePostRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PostView>)> {
    let req = post_body(body)?;
    let post = PostService::create(&state.db, user.user_id, None, &req.content).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn create_reply(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<CreatePostRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PostView>)> {
    let parent = post_id(path)?;
    let req = post_body(body)?;
    let post = PostService::create(&state.db, user.user_id, Some(parent), &req.content).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let id = post_id(path)?;
    PostService::delete(&state.db, user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle(
    state: &AppState,
    user: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
    interaction: Interaction,
) -> ApiResult<Json<Value>> {
    let id = post_id(path)?;
    let active = PostService::toggle(&state.db, interaction, user.user_id, id).await?;
    let key = interaction.state_key();
    Ok(Json(json!({ key: active })))
}

pub async fn like(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    toggle(&state, user, path, Interaction::Like).await
}

pub async fn save(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    toggle(&state, user, path, Interaction::Save).await
}

pub async fn repost(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    toggle(&state, user, path, Interaction::Repost).await
}
