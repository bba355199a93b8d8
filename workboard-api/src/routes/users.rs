/// User endpoints
///
/// Registration and user management are open (no token required).
///
/// # Endpoints
///
/// - `GET    /api/users/`      - List users
/// - `POST   /api/users/`      - Register a user
/// - `GET    /api/users/:id/`  - Fetch one user
/// - `PUT    /api/users/:id/`  - Replace a user
/// - `PATCH  /api/users/:id/`  - Partially update a user
/// - `DELETE /api/users/:id/`  - Delete a user (cascades to their boards)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    extract::{ApiJson, ApiPath, ApiQuery},
    routes::Pagination,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;
use workboard_shared::{
    auth::password,
    models::user::{CreateUser, UpdateUser, User, UserRole},
};

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,

    pub username: String,

    pub email: String,

    pub role: UserRole,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        }
    }
}

/// Registration and full-replacement body
#[derive(Debug, Deserialize, Validate)]
pub struct UserRequest {
    #[validate(length(min = 1, max = 150, message = "Username must be 1 to 150 characters"))]
    pub username: String,

    /// Optional; an empty string means no email
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub password: String,

    #[serde(default)]
    pub role: UserRole,
}

/// Partial update body
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PatchUserRequest {
    #[validate(length(min = 1, max = 150, message = "Username must be 1 to 150 characters"))]
    pub username: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub password: Option<String>,

    pub role: Option<UserRole>,
}

/// Treats `""` as "no email" so the email validator only sees real values
fn non_empty(email: Option<String>) -> Option<String> {
    email.filter(|e| !e.is_empty())
}

/// Validates the plaintext password and hashes it
fn hash_new_password(plaintext: &str) -> ApiResult<String> {
    password::validate_password_strength(plaintext).map_err(|message| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message,
        }])
    })?;

    Ok(password::hash_password(plaintext)?)
}

pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let (limit, offset) = pagination.bounds();
    let users = User::list(&state.db, limit, offset).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Registers a user
///
/// The password is hashed with Argon2id before storage. A taken username
/// yields `409 Conflict`.
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(mut req): ApiJson<UserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    req.email = non_empty(req.email);
    req.validate()?;

    let password_hash = hash_new_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email.unwrap_or_default(),
            role: req.role,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "Registered user");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Fetches one user
///
/// A missing user answers `404 {"error": "User not found"}`.
pub async fn get_user(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Response> {
    let response = match User::find_by_id(&state.db, id).await? {
        Some(user) => Json(UserResponse::from(user)).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": "User not found" }))).into_response(),
    };

    Ok(response)
}

async fn write_update(state: &AppState, id: Uuid, update: UpdateUser) -> ApiResult<UserResponse> {
    let user = User::update(&state.db, id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %user.id, "Updated user");

    Ok(user.into())
}

pub async fn replace_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(mut req): ApiJson<UserRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.email = non_empty(req.email);
    req.validate()?;

    let update = UpdateUser {
        password_hash: Some(hash_new_password(&req.password)?),
        username: Some(req.username),
        email: Some(req.email.unwrap_or_default()),
        role: Some(req.role),
    };

    Ok(Json(write_update(&state, id, update).await?))
}

pub async fn patch_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<PatchUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    // An explicit "" clears the email; skip the format check for it
    let clears_email = req.email.as_deref() == Some("");
    let req = PatchUserRequest {
        email: if clears_email { None } else { req.email },
        ..req
    };
    req.validate()?;

    let update = UpdateUser {
        password_hash: req.password.as_deref().map(hash_new_password).transpose()?,
        username: req.username,
        email: if clears_email { Some(String::new()) } else { req.email },
        role: req.role,
    };

    Ok(Json(write_update(&state, id, update).await?))
}

/// Deletes a user
///
/// Boards they own go with them; tasks assigned to them become unassigned.
pub async fn delete_user(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<StatusCode> {
    if !User::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %id, "Deleted user");

    Ok(StatusCode::NO_CONTENT)
}
