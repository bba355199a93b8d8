/// Database models for Workboard
///
/// Each model is a plain data struct with associated functions that take an
/// explicit executor (`&PgPool` or `&mut PgConnection` inside a transaction).
///
/// # Models
///
/// - `user`: User accounts and roles (identity store)
/// - `board`: Work boards, each owned by exactly one user
/// - `task`: Tasks belonging to a board, optionally assigned to a user
///
/// # Example
///
/// ```no_run
/// use workboard_shared::models::board::{Board, CreateBoard};
/// use workboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(owner_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let board = Board::create(&pool, CreateBoard {
///     title: "Sprint 1".to_string(),
///     description: "First iteration".to_string(),
///     owner_id,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod board;
pub mod task;
pub mod user;
