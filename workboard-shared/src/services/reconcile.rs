/// Board/task reconciliation
///
/// A board write carries optional board fields and an ordered batch of task
/// edits. Edits with an `id` update an existing task on that board; edits
/// without one create a new task. Every call runs in one transaction, so a
/// failing edit leaves the board and all of its tasks exactly as they were.
///
/// Edits are planned (status parsed, titles checked) before the transaction
/// opens, so malformed input never reaches the database.
///
/// # Example
///
/// ```no_run
/// use workboard_shared::services::reconcile::{update_board, BoardFields, TaskEdit};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, board_id: Uuid, owner: Uuid, task_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let result = update_board(
///     &pool,
///     board_id,
///     owner,
///     BoardFields { title: Some("Sprint 2".to_string()), description: None },
///     vec![
///         TaskEdit { id: Some(task_id), status: Some("completed".to_string()), ..Default::default() },
///         TaskEdit { title: Some("Retro".to_string()), ..Default::default() },
///     ],
/// )
/// .await?;
///
/// println!("{} now has {} tasks", result.board.title, result.tasks.len());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::ServiceError;
use crate::auth::authorization::require_board_owner;
use crate::models::{
    board::{Board, CreateBoard, UpdateBoard},
    task::{CreateTask, Task, TaskStatus, UpdateTask},
    user::User,
};

/// Longest accepted board or task title, in characters
pub const MAX_TITLE_LENGTH: usize = 255;

/// Partial board update; None leaves the field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardFields {
    pub title: Option<String>,

    pub description: Option<String>,
}

/// One element of a nested task batch
///
/// `status` stays a string until planning so that an unknown value is
/// reported as invalid input instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEdit {
    #[serde(default)]
    pub id: Option<Uuid>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub assigned_to_id: Option<Uuid>,
}

/// A board together with every task currently on it
#[derive(Debug, Clone, Serialize)]
pub struct BoardWithTasks {
    pub board: Board,

    pub tasks: Vec<Task>,
}

/// Task to be created on a board not yet known at planning time
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,

    pub description: String,

    pub status: TaskStatus,

    pub assigned_to: Option<Uuid>,
}

impl NewTask {
    pub fn for_board(self, board_id: Uuid) -> CreateTask {
        CreateTask {
            board_id,
            title: self.title,
            description: self.description,
            status: self.status,
            assigned_to: self.assigned_to,
        }
    }
}

/// Validated task edit, ready to be applied
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOp {
    Update { id: Uuid, changes: UpdateTask },
    Create(NewTask),
}

impl TaskOp {
    fn assignee(&self) -> Option<Uuid> {
        match self {
            TaskOp::Update { changes, .. } => changes.assigned_to,
            TaskOp::Create(new) => new.assigned_to,
        }
    }
}

pub(crate) fn validate_title(title: &str) -> Result<(), ServiceError> {
    if title.trim().is_empty() {
        return Err(ServiceError::Invalid("Title may not be blank".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ServiceError::Invalid(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LENGTH
        )));
    }

    Ok(())
}

pub(crate) fn parse_status(status: Option<String>) -> Result<Option<TaskStatus>, ServiceError> {
    status
        .map(|s| {
            s.parse::<TaskStatus>()
                .map_err(|_| ServiceError::Invalid("Invalid status".to_string()))
        })
        .transpose()
}

fn validate_fields(fields: &BoardFields) -> Result<(), ServiceError> {
    match &fields.title {
        Some(title) => validate_title(title),
        None => Ok(()),
    }
}

fn plan_new_task(edit: TaskEdit) -> Result<NewTask, ServiceError> {
    let status = parse_status(edit.status)?.unwrap_or_default();
    let title = edit
        .title
        .ok_or_else(|| ServiceError::Invalid("Title is required for new tasks".to_string()))?;
    validate_title(&title)?;

    Ok(NewTask {
        title,
        description: edit.description.unwrap_or_default(),
        status,
        assigned_to: edit.assigned_to_id,
    })
}

/// Turns one edit into an update (id present) or a create (id absent)
pub fn plan_edit(edit: TaskEdit) -> Result<TaskOp, ServiceError> {
    let Some(id) = edit.id else {
        return plan_new_task(edit).map(TaskOp::Create);
    };

    if let Some(title) = &edit.title {
        validate_title(title)?;
    }

    Ok(TaskOp::Update {
        id,
        changes: UpdateTask {
            title: edit.title,
            description: edit.description,
            status: parse_status(edit.status)?,
            assigned_to: edit.assigned_to_id,
        },
    })
}

/// Plans a whole batch, stopping at the first invalid edit
pub fn plan_edits(edits: Vec<TaskEdit>) -> Result<Vec<TaskOp>, ServiceError> {
    edits.into_iter().map(plan_edit).collect()
}

async fn ensure_assignee_exists(
    conn: &mut PgConnection,
    assignee: Option<Uuid>,
) -> Result<(), ServiceError> {
    if let Some(user_id) = assignee {
        if !User::exists(&mut *conn, user_id).await? {
            return Err(ServiceError::NotFound("Assigned user not found".to_string()));
        }
    }

    Ok(())
}

async fn apply_op(conn: &mut PgConnection, board_id: Uuid, op: TaskOp) -> Result<Task, ServiceError> {
    ensure_assignee_exists(conn, op.assignee()).await?;

    match op {
        TaskOp::Update { id, changes } => {
            let task = Task::find_by_id_and_board(&mut *conn, id, board_id)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Task {} not found on board {}", id, board_id))
                })?;

            if changes.is_empty() {
                return Ok(task);
            }

            Task::update(&mut *conn, id, changes)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("Task {} not found", id)))
        }
        TaskOp::Create(new) => Ok(Task::create(&mut *conn, new.for_board(board_id)).await?),
    }
}

/// Applies board fields and planned ops to a board locked by the caller
async fn apply_to_board(
    conn: &mut PgConnection,
    board: Board,
    fields: BoardFields,
    ops: Vec<TaskOp>,
) -> Result<BoardWithTasks, ServiceError> {
    let board_id = board.id;
    let total = ops.len();

    for op in ops {
        apply_op(conn, board_id, op).await?;
    }

    let board = if fields.title.is_some() || fields.description.is_some() {
        Board::update(
            &mut *conn,
            board_id,
            UpdateBoard {
                title: fields.title,
                description: fields.description,
            },
        )
        .await?
        .ok_or_else(|| ServiceError::NotFound("Board not found".to_string()))?
    } else {
        board
    };

    let tasks = Task::list_by_board(&mut *conn, board_id).await?;

    tracing::debug!(board_id = %board_id, edits = total, tasks = tasks.len(), "Reconciled board");

    Ok(BoardWithTasks { board, tasks })
}

async fn lock_board(conn: &mut PgConnection, board_id: Uuid) -> Result<Board, ServiceError> {
    Board::find_by_id_for_update(conn, board_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Board not found".to_string()))
}

/// Creates a board and every task in `edits` under it
///
/// Identifiers carried by edits are ignored; every edit becomes a new task.
///
/// # Errors
///
/// - `Invalid` for a blank/overlong board title or a malformed edit
/// - `NotFound` if the owner or an assignee does not exist
pub async fn create_board(
    pool: &PgPool,
    data: CreateBoard,
    edits: Vec<TaskEdit>,
) -> Result<BoardWithTasks, ServiceError> {
    validate_title(&data.title)?;
    let new_tasks = edits
        .into_iter()
        .map(|edit| plan_new_task(TaskEdit { id: None, ..edit }))
        .collect::<Result<Vec<_>, _>>()?;

    let mut tx = pool.begin().await?;

    if !User::exists(&mut *tx, data.owner_id).await? {
        return Err(ServiceError::NotFound("Owner not found".to_string()));
    }

    let board = Board::create(&mut *tx, data).await?;
    let ops = new_tasks.into_iter().map(TaskOp::Create).collect();
    let result = apply_to_board(&mut tx, board, BoardFields::default(), ops).await?;

    tx.commit().await?;

    tracing::info!(
        board_id = %result.board.id,
        owner_id = %result.board.owner_id,
        tasks = result.tasks.len(),
        "Created board"
    );

    Ok(result)
}

/// Merges board fields and task edits into an existing board
///
/// No ownership check; see [`update_board`] for the guarded entry point.
///
/// # Errors
///
/// - `NotFound` if the board, an edited task (on this board) or an assignee
///   does not exist
/// - `Invalid` for a malformed edit
pub async fn reconcile(
    pool: &PgPool,
    board_id: Uuid,
    fields: BoardFields,
    edits: Vec<TaskEdit>,
) -> Result<BoardWithTasks, ServiceError> {
    validate_fields(&fields)?;
    let ops = plan_edits(edits)?;

    let mut tx = pool.begin().await?;
    let board = lock_board(&mut tx, board_id).await?;
    let result = apply_to_board(&mut tx, board, fields, ops).await?;
    tx.commit().await?;

    Ok(result)
}

/// Ownership-guarded [`reconcile`]
///
/// The guard runs inside the transaction, after the board row is locked and
/// before any write, so a rejected call changes nothing.
///
/// # Errors
///
/// As [`reconcile`], plus `NotFound` when `asserted_owner` is not a user and
/// `Forbidden` when it is not the board's owner.
pub async fn update_board(
    pool: &PgPool,
    board_id: Uuid,
    asserted_owner: Uuid,
    fields: BoardFields,
    edits: Vec<TaskEdit>,
) -> Result<BoardWithTasks, ServiceError> {
    validate_fields(&fields)?;
    let ops = plan_edits(edits)?;

    let mut tx = pool.begin().await?;
    let board = lock_board(&mut tx, board_id).await?;
    require_board_owner(&mut *tx, &board, asserted_owner).await?;
    let result = apply_to_board(&mut tx, board, fields, ops).await?;
    tx.commit().await?;

    tracing::info!(board_id = %board_id, "Updated board");

    Ok(result)
}

/// Full replacement of the board fields plus a task batch
pub async fn replace_board(
    pool: &PgPool,
    board_id: Uuid,
    asserted_owner: Uuid,
    title: String,
    description: String,
    edits: Vec<TaskEdit>,
) -> Result<BoardWithTasks, ServiceError> {
    let fields = BoardFields {
        title: Some(title),
        description: Some(description),
    };

    update_board(pool, board_id, asserted_owner, fields, edits).await
}

/// Deletes a board (and, by cascade, its tasks) after the ownership check
pub async fn delete_board(
    pool: &PgPool,
    board_id: Uuid,
    asserted_owner: Uuid,
) -> Result<(), ServiceError> {
    let mut tx = pool.begin().await?;
    let board = lock_board(&mut tx, board_id).await?;
    require_board_owner(&mut *tx, &board, asserted_owner).await?;
    Board::delete(&mut *tx, board_id).await?;
    tx.commit().await?;

    tracing::info!(board_id = %board_id, "Deleted board");

    Ok(())
}

/// Creates a single task on an existing board
///
/// Any `id` on the edit is ignored.
pub async fn add_task(pool: &PgPool, board_id: Uuid, edit: TaskEdit) -> Result<Task, ServiceError> {
    let new = plan_new_task(TaskEdit { id: None, ..edit })?;

    let mut tx = pool.begin().await?;

    if Board::find_by_id(&mut *tx, board_id).await?.is_none() {
        return Err(ServiceError::NotFound("Work board not found".to_string()));
    }

    let task = apply_op(&mut tx, board_id, TaskOp::Create(new)).await?;
    tx.commit().await?;

    tracing::info!(task_id = %task.id, board_id = %board_id, "Created task");

    Ok(task)
}

/// Applies one edit to the task with `task_id`, on whichever board it lives
pub async fn edit_task(pool: &PgPool, task_id: Uuid, edit: TaskEdit) -> Result<Task, ServiceError> {
    let op = plan_edit(TaskEdit {
        id: Some(task_id),
        ..edit
    })?;

    let mut tx = pool.begin().await?;

    let board_id = Task::find_by_id(&mut *tx, task_id)
        .await?
        .map(|task| task.board_id)
        .ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))?;

    let task = apply_op(&mut tx, board_id, op).await?;
    tx.commit().await?;

    Ok(task)
}
