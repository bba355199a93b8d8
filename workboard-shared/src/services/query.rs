/// Read-only board queries
///
/// None of these check that the board exists; an unknown board id simply
/// yields an empty list or zero.

use sqlx::{postgres::PgExecutor, PgPool};
use uuid::Uuid;

use super::reconcile::BoardWithTasks;
use crate::models::{
    board::Board,
    task::{Task, TaskStatus},
    user::User,
};

/// Tasks on a board with the given status
///
/// `status` comes straight from the URL. A value that is not a known status
/// matches nothing, so the result is empty rather than an error.
pub async fn tasks_by_status<'e, E>(
    executor: E,
    board_id: Uuid,
    status: &str,
) -> Result<Vec<Task>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    match status.parse::<TaskStatus>() {
        Ok(status) => Task::list_by_board_and_status(executor, board_id, status).await,
        Err(_) => {
            tracing::debug!(board_id = %board_id, status, "Unknown status filter");
            Ok(Vec::new())
        }
    }
}

/// Distinct users assigned to at least one task on the board
pub async fn users_on_board<'e, E>(executor: E, board_id: Uuid) -> Result<Vec<User>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    User::list_assigned_on_board(executor, board_id).await
}

pub async fn task_count<'e, E>(executor: E, board_id: Uuid) -> Result<i64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    Task::count_by_board(executor, board_id).await
}

/// Loads a board and its tasks
pub async fn board_with_tasks(
    pool: &PgPool,
    board_id: Uuid,
) -> Result<Option<BoardWithTasks>, sqlx::Error> {
    let Some(board) = Board::find_by_id(pool, board_id).await? else {
        return Ok(None);
    };
    let tasks = Task::list_by_board(pool, board_id).await?;

    Ok(Some(BoardWithTasks { board, tasks }))
}
