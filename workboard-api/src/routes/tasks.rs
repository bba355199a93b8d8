/// Task endpoints (authenticated)
///
/// # Endpoints
///
/// - `GET    /api/tasks/`                             - List tasks
/// - `POST   /api/tasks/`                             - Create a task on a board
/// - `GET    /api/tasks/:id/`                         - Fetch one task
/// - `PUT    /api/tasks/:id/`, `PATCH /api/tasks/:id/` - Edit a task
/// - `DELETE /api/tasks/:id/`                         - Delete a task
/// - `GET    /api/tasks/status/:board_id/:status/`    - Tasks on a board by status
/// - `GET    /api/tasks/users/:board_id/`             - Users assigned on a board
///
/// Tasks are rendered with the assignee embedded:
///
/// ```json
/// {
///   "id": "uuid",
///   "title": "Write docs",
///   "description": "",
///   "status": "in_progress",
///   "assigned_to": { "id": "uuid", "username": "alice", "email": "", "role": "owner" },
///   "work_board": "uuid"
/// }
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    routes::{users::UserResponse, Pagination},
};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;
use workboard_shared::{
    auth::middleware::AuthContext,
    models::{
        task::{Task, TaskStatus},
        user::User,
    },
    services::{
        query,
        reconcile::{self, TaskEdit},
    },
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResponse {
    pub id: Uuid,

    pub title: String,

    pub description: String,

    pub status: TaskStatus,

    pub assigned_to: Option<UserResponse>,

    /// Board id
    pub work_board: Uuid,
}

impl TaskResponse {
    pub fn new(task: Task, assignee: Option<UserResponse>) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            assigned_to: assignee,
            work_board: task.board_id,
        }
    }
}

/// Renders tasks, loading every distinct assignee in one query
pub async fn task_responses(db: &PgPool, tasks: Vec<Task>) -> ApiResult<Vec<TaskResponse>> {
    let mut ids: Vec<Uuid> = tasks.iter().filter_map(|t| t.assigned_to).collect();
    ids.sort_unstable();
    ids.dedup();

    let users: HashMap<Uuid, UserResponse> = if ids.is_empty() {
        HashMap::new()
    } else {
        User::find_many(db, &ids)
            .await?
            .into_iter()
            .map(|u| (u.id, UserResponse::from(u)))
            .collect()
    };

    Ok(tasks
        .into_iter()
        .map(|task| {
            let assignee = task.assigned_to.and_then(|id| users.get(&id).cloned());
            TaskResponse::new(task, assignee)
        })
        .collect())
}

async fn task_response(db: &PgPool, task: Task) -> ApiResult<TaskResponse> {
    let mut rendered = task_responses(db, vec![task]).await?;
    rendered
        .pop()
        .ok_or_else(|| ApiError::InternalError("Task rendering produced no output".to_string()))
}

/// Create body; `work_board` names the board
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    pub work_board: Option<Uuid>,

    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    pub status: Option<String>,

    pub assigned_to_id: Option<Uuid>,
}

/// Edit body for PUT and PATCH; every field is optional
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    pub status: Option<String>,

    #[serde(alias = "assigned_to")]
    pub assigned_to_id: Option<Uuid>,
}

impl From<UpdateTaskRequest> for TaskEdit {
    fn from(req: UpdateTaskRequest) -> Self {
        TaskEdit {
            id: None,
            title: req.title,
            description: req.description,
            // An empty status leaves the status alone
            status: req.status.filter(|s| !s.is_empty()),
            assigned_to_id: req.assigned_to_id,
        }
    }
}

pub async fn list_tasks(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let (limit, offset) = pagination.bounds();
    let tasks = Task::list(&state.db, limit, offset).await?;

    Ok(Json(task_responses(&state.db, tasks).await?))
}

/// Creates a task on an existing board
///
/// # Errors
///
/// - `400` if `work_board` or `title` is missing, or `status` is unknown
/// - `404` if the board or assignee does not exist
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    req.validate()?;

    let board_id = req
        .work_board
        .ok_or_else(|| ApiError::BadRequest("work_board field is required".to_string()))?;

    let edit = TaskEdit {
        id: None,
        title: req.title,
        description: req.description,
        status: req.status,
        assigned_to_id: req.assigned_to_id,
    };

    let task = reconcile::add_task(&state.db, board_id, edit).await?;

    tracing::debug!(task_id = %task.id, user_id = %auth.user_id, "Task created via API");

    Ok((StatusCode::CREATED, Json(task_response(&state.db, task).await?)))
}

pub async fn get_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task_response(&state.db, task).await?))
}

async fn edit(state: &AppState, id: Uuid, req: UpdateTaskRequest) -> ApiResult<TaskResponse> {
    req.validate()?;

    let task = reconcile::edit_task(&state.db, id, req.into()).await?;

    tracing::info!(task_id = %task.id, status = %task.status, "Updated task");

    task_response(&state.db, task).await
}

/// Edits a task
///
/// PUT and PATCH behave the same: fields present in the body are written,
/// the rest are kept. An assignee can be set or changed but not cleared.
pub async fn replace_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    Ok(Json(edit(&state, id, req).await?))
}

pub async fn patch_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    Ok(Json(edit(&state, id, req).await?))
}

pub async fn delete_task(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<StatusCode> {
    if !Task::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    tracing::info!(task_id = %id, "Deleted task");

    Ok(StatusCode::NO_CONTENT)
}

/// Tasks on a board with the given status; unknown statuses give `[]`
pub async fn tasks_by_status(
    State(state): State<AppState>,
    ApiPath((board_id, status)): ApiPath<(Uuid, String)>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = query::tasks_by_status(&state.db, board_id, &status).await?;

    Ok(Json(task_responses(&state.db, tasks).await?))
}

/// Distinct users assigned to tasks on a board
pub async fn users_on_board(
    State(state): State<AppState>,
    ApiPath(board_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = query::users_on_board(&state.db, board_id).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
