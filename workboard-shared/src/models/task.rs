/// Task model and database operations
///
/// Tasks always belong to exactly one board. The assignee is a weak
/// reference: deleting the user clears it while the task survives.
///
/// # Status
///
/// ```text
/// todo → in_progress → completed
/// ```
///
/// Any status may be set directly; there is no transition graph.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'in_progress', 'completed');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     status task_status NOT NULL DEFAULT 'todo',
///     assigned_to UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use workboard_shared::models::task::{CreateTask, Task, TaskStatus};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, board_id: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     board_id,
///     title: "Write release notes".to_string(),
///     description: String::new(),
///     status: TaskStatus::Todo,
///     assigned_to: None,
/// }).await?;
///
/// let open = Task::list_by_board_and_status(&pool, board_id, TaskStatus::Todo).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgExecutor;
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Task progress status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    #[default]
    Todo,

    /// Being worked on
    InProgress,

    /// Done
    Completed,
}

impl TaskStatus {
    /// All statuses, in workflow order
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the task statuses
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid task status: {0:?}")]
pub struct ParseTaskStatusError(pub String);

impl FromStr for TaskStatus {
    type Err = ParseTaskStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseTaskStatusError(s.to_string()))
    }
}

/// Task on a board
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,

    /// Board this task belongs to
    pub board_id: Uuid,

    pub title: String,

    /// Free text, may be empty
    pub description: String,

    pub status: TaskStatus,

    /// Assigned user (None if unassigned or the user was deleted)
    pub assigned_to: Option<Uuid>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTask {
    pub board_id: Uuid,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub assigned_to: Option<Uuid>,
}

/// Partial task update; None leaves the column unchanged
///
/// The assignee can be set or replaced here but never cleared, matching
/// how edits reach the store (clearing happens only through user deletion).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,

    pub description: Option<String>,

    pub status: Option<TaskStatus>,

    pub assigned_to: Option<Uuid>,
}

impl UpdateTask {
    /// Returns true when no field would change
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.assigned_to.is_none()
    }
}

const TASK_COLUMNS: &str =
    "id, board_id, title, description, status, assigned_to, created_at, updated_at";

impl Task {
    /// Creates a task
    ///
    /// # Errors
    ///
    /// Fails with a foreign key violation if the board or assignee do not exist.
    pub async fn create<'e, E>(executor: E, data: CreateTask) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let task = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (board_id, title, description, status, assigned_to)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(data.board_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.assigned_to)
        .fetch_one(executor)
        .await?;

        Ok(task)
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(task)
    }

    /// Finds a task only if it belongs to the given board
    ///
    /// Used by reconciliation so that an edit can never reach a task on a
    /// different board.
    pub async fn find_by_id_and_board<'e, E>(
        executor: E,
        id: Uuid,
        board_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND board_id = $2"
        ))
        .bind(id)
        .bind(board_id)
        .fetch_optional(executor)
        .await?;

        Ok(task)
    }

    /// Applies a partial update
    ///
    /// # Returns
    ///
    /// The updated task, or None if it does not exist
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks
             SET title = COALESCE($2, title),
                 description = COALESCE($3, description),
                 status = COALESCE($4, status),
                 assigned_to = COALESCE($5, assigned_to),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.assigned_to)
        .fetch_optional(executor)
        .await?;

        Ok(task)
    }

    /// Lists all tasks, oldest first
    pub async fn list<'e, E>(executor: E, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             ORDER BY created_at ASC
             LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?;

        Ok(tasks)
    }

    /// Lists every task on a board in creation order
    pub async fn list_by_board<'e, E>(executor: E, board_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE board_id = $1
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(board_id)
        .fetch_all(executor)
        .await?;

        Ok(tasks)
    }

    /// Lists tasks on a board with the given status
    pub async fn list_by_board_and_status<'e, E>(
        executor: E,
        board_id: Uuid,
        status: TaskStatus,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE board_id = $1 AND status = $2
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(board_id)
        .bind(status)
        .fetch_all(executor)
        .await?;

        Ok(tasks)
    }

    /// Counts tasks on a board
    pub async fn count_by_board<'e, E>(executor: E, board_id: Uuid) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE board_id = $1")
            .bind(board_id)
            .fetch_one(executor)
            .await?;

        Ok(count)
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_as_str() {
        assert_eq!(TaskStatus::Todo.as_str(), "todo");
        assert_eq!(TaskStatus::InProgress.as_str(), "in_progress");
        assert_eq!(TaskStatus::Completed.as_str(), "completed");
    }

    #[test]
    fn test_task_status_from_str() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>(), Ok(status));
        }

        assert!("done".parse::<TaskStatus>().is_err());
        assert!("TODO".parse::<TaskStatus>().is_err());
        assert!("".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_task_status_serde_matches_as_str() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let parsed: TaskStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, TaskStatus::Completed);
    }

    #[test]
    fn test_create_task_defaults() {
        let board_id = Uuid::new_v4();
        let data: CreateTask = serde_json::from_value(serde_json::json!({
            "board_id": board_id,
            "title": "A",
        }))
        .unwrap();

        assert_eq!(data.status, TaskStatus::Todo);
        assert_eq!(data.description, "");
        assert!(data.assigned_to.is_none());
    }

    #[test]
    fn test_update_task_is_empty() {
        assert!(UpdateTask::default().is_empty());

        let update = UpdateTask {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
