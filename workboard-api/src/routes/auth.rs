/// Authentication endpoints
///
/// - `POST /auth/login/` - Exchange username/password for a token pair
/// - `POST /auth/token/refresh/` - Exchange a refresh token for an access token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    routes::users::UserResponse,
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;
use workboard_shared::{
    auth::{jwt, password},
    models::user::User,
};

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Access token (short-lived)
    pub access: String,

    pub refresh: String,

    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// Login endpoint
///
/// ```text
/// POST /auth/login/
///
/// { "username": "alice", "password": "..." }
/// ```
///
/// ```json
/// {
///   "access": "eyJ...",
///   "refresh": "eyJ...",
///   "user": { "id": "uuid", "username": "alice", "email": "", "role": "owner" }
/// }
/// ```
///
/// Unknown users and wrong passwords both answer `401` with the same message.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let invalid = || ApiError::Unauthorized("Invalid username or password".to_string());

    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::warn!(username = %req.username, "Failed login attempt");
        return Err(invalid());
    }

    let pair = jwt::issue_token_pair(
        user.id,
        &user.username,
        state.jwt_secret(),
        &state.token_lifetimes(),
    )?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        access: pair.access,
        refresh: pair.refresh,
        user: user.into(),
    }))
}

/// Refresh endpoint
///
/// An access token sent here is rejected with `401`.
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access = jwt::refresh_access_token(&req.refresh, state.jwt_secret(), &state.token_lifetimes())?;

    Ok(Json(RefreshResponse { access }))
}
