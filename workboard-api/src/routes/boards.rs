/// Board endpoints (authenticated)
///
/// Board writes carry a nested `tasks` array. On create every element
/// becomes a new task; on update, elements with an `id` edit that task and
/// elements without one are added. Each call is applied atomically.
///
/// Updates and deletes are restricted to the board's owner. The owner is
/// taken from the body's `owner` field, or the caller when it is absent.
///
/// # Endpoints
///
/// - `GET    /api/boards/`                 - List boards with their tasks
/// - `POST   /api/boards/`                 - Create a board (and tasks)
/// - `GET    /api/boards/:id/`             - Fetch one board
/// - `PUT    /api/boards/:id/`             - Replace title/description, merge tasks
/// - `PATCH  /api/boards/:id/`             - Partially update, merge tasks
/// - `DELETE /api/boards/:id/`             - Delete a board and its tasks
/// - `GET    /api/boards/:id/task-count/`  - `{"task_count": n}`
///
/// # Example
///
/// ```text
/// PATCH /api/boards/{id}/
/// Authorization: Bearer eyJ...
///
/// {
///   "title": "Sprint 2",
///   "tasks": [
///     { "id": "uuid", "status": "completed" },
///     { "title": "Retro" }
///   ]
/// }
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    routes::{
        tasks::{task_responses, TaskResponse},
        Pagination,
    },
};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;
use workboard_shared::{
    auth::middleware::AuthContext,
    models::{
        board::{Board, CreateBoard},
        task::Task,
    },
    services::{
        query,
        reconcile::{self, BoardFields, BoardWithTasks, TaskEdit},
    },
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardResponse {
    pub id: Uuid,

    pub title: String,

    pub description: String,

    /// Owner's user id
    pub owner: Uuid,

    pub tasks: Vec<TaskResponse>,
}

impl BoardResponse {
    pub fn new(board: Board, tasks: Vec<TaskResponse>) -> Self {
        Self {
            id: board.id,
            title: board.title,
            description: board.description,
            owner: board.owner_id,
            tasks,
        }
    }
}

async fn board_response(db: &PgPool, result: BoardWithTasks) -> ApiResult<BoardResponse> {
    let tasks = task_responses(db, result.tasks).await?;
    Ok(BoardResponse::new(result.board, tasks))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,

    pub description: String,

    /// Defaults to the caller
    pub owner: Option<Uuid>,

    #[serde(default)]
    pub tasks: Vec<TaskEdit>,
}

/// PUT body: title and description are required
#[derive(Debug, Deserialize, Validate)]
pub struct ReplaceBoardRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,

    pub description: String,

    /// Asserted owner; defaults to the caller
    pub owner: Option<Uuid>,

    #[serde(default)]
    pub tasks: Vec<TaskEdit>,
}

/// PATCH body: everything optional
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PatchBoardRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    /// Asserted owner; defaults to the caller
    pub owner: Option<Uuid>,

    #[serde(default)]
    pub tasks: Vec<TaskEdit>,
}

/// Body for DELETE, which may also assert an owner
#[derive(Debug, Default, Deserialize)]
pub struct DeleteBoardRequest {
    pub owner: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskCountResponse {
    pub task_count: i64,
}

pub async fn list_boards(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResult<Json<Vec<BoardResponse>>> {
    let (limit, offset) = pagination.bounds();
    let boards = Board::list(&state.db, limit, offset).await?;

    let mut rendered = Vec::with_capacity(boards.len());
    for board in boards {
        let tasks = Task::list_by_board(&state.db, board.id).await?;
        rendered.push(board_response(&state.db, BoardWithTasks { board, tasks }).await?);
    }

    Ok(Json(rendered))
}

pub async fn create_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateBoardRequest>,
) -> ApiResult<(StatusCode, Json<BoardResponse>)> {
    req.validate()?;

    let data = CreateBoard {
        title: req.title,
        description: req.description,
        owner_id: req.owner.unwrap_or(auth.user_id),
    };

    let result = reconcile::create_board(&state.db, data, req.tasks).await?;

    Ok((StatusCode::CREATED, Json(board_response(&state.db, result).await?)))
}

pub async fn get_board(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<BoardResponse>> {
    let result = query::board_with_tasks(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;

    Ok(Json(board_response(&state.db, result).await?))
}

/// Replaces title and description and merges the task batch
///
/// # Errors
///
/// - `403` if the asserted owner is not the board's owner
/// - `404` if the board, the asserted owner, an edited task (on this
///   board) or an assignee does not exist
/// - `400` for a new task without title or an unknown status
pub async fn replace_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<ReplaceBoardRequest>,
) -> ApiResult<Json<BoardResponse>> {
    req.validate()?;

    let result = reconcile::replace_board(
        &state.db,
        id,
        req.owner.unwrap_or(auth.user_id),
        req.title,
        req.description,
        req.tasks,
    )
    .await?;

    Ok(Json(board_response(&state.db, result).await?))
}

/// Partially updates the board and merges the task batch
pub async fn patch_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<PatchBoardRequest>,
) -> ApiResult<Json<BoardResponse>> {
    req.validate()?;

    let fields = BoardFields {
        title: req.title,
        description: req.description,
    };

    let result = reconcile::update_board(
        &state.db,
        id,
        req.owner.unwrap_or(auth.user_id),
        fields,
        req.tasks,
    )
    .await?;

    Ok(Json(board_response(&state.db, result).await?))
}

/// Deletes a board and, by cascade, its tasks
///
/// The body is optional; without one the caller must own the board.
pub async fn delete_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    body: Option<Json<DeleteBoardRequest>>,
) -> ApiResult<StatusCode> {
    let asserted_owner = body
        .and_then(|Json(req)| req.owner)
        .unwrap_or(auth.user_id);

    reconcile::delete_board(&state.db, id, asserted_owner).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn task_count(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<TaskCountResponse>> {
    let task_count = query::task_count(&state.db, id).await?;

    Ok(Json(TaskCountResponse { task_count }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_board_response_wire_format() {
        let board = Board {
            id: Uuid::new_v4(),
            title: "Sprint 1".to_string(),
            description: "First iteration".to_string(),
            owner_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let (id, owner) = (board.id, board.owner_id);

        let json = serde_json::to_value(BoardResponse::new(board, Vec::new())).unwrap();

        assert_eq!(
            json,
            json!({
                "id": id,
                "title": "Sprint 1",
                "description": "First iteration",
                "owner": owner,
                "tasks": [],
            })
        );
    }

    #[test]
    fn test_patch_request_parses_nested_edits() {
        let task_id = Uuid::new_v4();
        let req: PatchBoardRequest = serde_json::from_value(json!({
            "tasks": [
                { "id": task_id, "status": "completed" },
                { "title": "Retro", "assigned_to_id": null }
            ]
        }))
        .unwrap();

        assert!(req.title.is_none());
        assert!(req.owner.is_none());
        assert_eq!(req.tasks.len(), 2);
        assert_eq!(req.tasks[0].id, Some(task_id));
        assert_eq!(req.tasks[0].status.as_deref(), Some("completed"));
        assert_eq!(req.tasks[1].title.as_deref(), Some("Retro"));
    }

    #[test]
    fn test_create_request_requires_title() {
        let result: Result<CreateBoardRequest, _> =
            serde_json::from_value(json!({ "description": "no title" }));
        assert!(result.is_err());

        let req: CreateBoardRequest =
            serde_json::from_value(json!({ "title": "", "description": "" })).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_task_count_response() {
        let json = serde_json::to_value(TaskCountResponse { task_count: 3 }).unwrap();
        assert_eq!(json, json!({ "task_count": 3 }));
    }
}
