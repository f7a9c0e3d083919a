use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    errors::{ApiError, ApiResult, INVALID_USER_DATA},
    models::user::{LoginRequest, SessionResponse, SignupRequest},
    services::{
        auth::{AuthService, Session, REFRESH_NOT_FOUND},
        tokens::{TokenService, REFRESH_COOKIE},
    },
    AppState,
};

/// Extract a named cookie value from request headers.
fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|part| part.trim().strip_prefix(&prefix).map(str::to_string))
}

/// JSON session body plus the `Set-Cookie` carrying the refresh token.
fn session_response(status: StatusCode, tokens: &TokenService, session: Session) -> Response {
    (
        status,
        [(header::SET_COOKIE, tokens.refresh_cookie(&session.refresh_token))],
        Json(session.response),
    )
        .into_response()
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Response> {
    // Shape failures get the same answer as bad credentials.
    let Json(body) = body.map_err(|_| ApiError::InvalidCredentials)?;
    if !body.is_valid() {
        return Err(ApiError::InvalidCredentials);
    }

    let session = AuthService::login(&state.db, &state.tokens, &body.email, &body.password).await?;
    Ok(session_response(StatusCode::OK, &state.tokens, session))
}

pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = body.map_err(|_| ApiError::Validation(INVALID_USER_DATA))?;
    if !body.is_valid() {
        return Err(ApiError::Validation(INVALID_USER_DATA));
    }

    let session = AuthService::signup(&state.db, &state.tokens, &body).await?;
    Ok(session_response(StatusCode::CREATED, &state.tokens, session))
}

/// Clears the refresh cookie. Needs no authentication and always succeeds.
pub async fn logout(State(state): State<AppState>) -> Response {
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, state.tokens.clear_refresh_cookie())],
    )
        .into_response()
}

pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<SessionResponse>> {
    let token = get_cookie(&headers, REFRESH_COOKIE)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::Unauthorized(REFRESH_NOT_FOUND))?;

    AuthService::refresh(&state.tokens, &token).map(Json)
}
