/// Board model and database operations
///
/// A board is a named container of tasks, exclusively owned by one user.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE boards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

/// Work board
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    pub id: Uuid,

    /// Board title (at most 255 characters)
    pub title: String,

    pub description: String,

    /// Owning user; deleting the owner deletes the board
    pub owner_id: Uuid,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBoard {
    pub title: String,

    pub description: String,

    pub owner_id: Uuid,
}

/// Partial board update; None leaves the column unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBoard {
    pub title: Option<String>,

    pub description: Option<String>,
}

const BOARD_COLUMNS: &str = "id, title, description, owner_id, created_at, updated_at";

impl Board {
    /// Creates a board
    ///
    /// # Errors
    ///
    /// Fails with a foreign key violation if `owner_id` does not exist.
    pub async fn create<'e, E>(executor: E, data: CreateBoard) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let board = sqlx::query_as::<_, Board>(&format!(
            "INSERT INTO boards (title, description, owner_id)
             VALUES ($1, $2, $3)
             RETURNING {BOARD_COLUMNS}"
        ))
        .bind(data.title)
        .bind(data.description)
        .bind(data.owner_id)
        .fetch_one(executor)
        .await?;

        Ok(board)
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let board = sqlx::query_as::<_, Board>(&format!(
            "SELECT {BOARD_COLUMNS} FROM boards WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(board)
    }

    /// Finds a board and locks its row until the surrounding transaction ends
    ///
    /// Serializes concurrent reconciliations of the same board.
    pub async fn find_by_id_for_update<'e, E>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let board = sqlx::query_as::<_, Board>(&format!(
            "SELECT {BOARD_COLUMNS} FROM boards WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(board)
    }

    /// Applies a partial update
    ///
    /// # Returns
    ///
    /// The updated board, or None if it does not exist
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        data: UpdateBoard,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let board = sqlx::query_as::<_, Board>(&format!(
            "UPDATE boards
             SET title = COALESCE($2, title),
                 description = COALESCE($3, description),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {BOARD_COLUMNS}"
        ))
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .fetch_optional(executor)
        .await?;

        Ok(board)
    }

    /// Deletes a board
    ///
    /// ⚠️  This also deletes every task on the board due to CASCADE.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists boards, oldest first
    pub async fn list<'e, E>(executor: E, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let boards = sqlx::query_as::<_, Board>(&format!(
            "SELECT {BOARD_COLUMNS} FROM boards
             ORDER BY created_at ASC
             LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?;

        Ok(boards)
    }
}
