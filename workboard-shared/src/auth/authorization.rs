/// Board ownership checks
///
/// Only a board's owner may change or delete it. The caller asserts an owner
/// id (taken from the request body, or the authenticated user when the body
/// has none); the assertion must name an existing user and must match the
/// board's current owner.
///
/// # Example
///
/// ```no_run
/// use workboard_shared::auth::authorization::require_board_owner;
/// use workboard_shared::models::board::Board;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, board_id: Uuid, caller: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let mut tx = pool.begin().await?;
/// let board = Board::find_by_id_for_update(&mut *tx, board_id).await?.expect("board");
/// require_board_owner(&mut *tx, &board, caller).await?;
/// // ... mutate inside the same transaction ...
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```

use sqlx::postgres::PgExecutor;
use uuid::Uuid;

use crate::models::{board::Board, user::User};

#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// The asserted owner is not a known user
    #[error("Owner {0} not found")]
    OwnerNotFound(Uuid),

    /// The asserted owner exists but does not own the board
    #[error("You are not the owner of this board")]
    NotOwner,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Compares the asserted owner against the board's owner
pub fn require_ownership(board: &Board, asserted_owner: Uuid) -> Result<(), AuthzError> {
    if board.owner_id != asserted_owner {
        return Err(AuthzError::NotOwner);
    }

    Ok(())
}

/// Resolves the asserted owner and checks they own `board`
///
/// Pass the same transaction that will perform the mutation so the check
/// and the write see the same rows.
///
/// # Errors
///
/// - `OwnerNotFound` if `asserted_owner` is not a user
/// - `NotOwner` if it is a user other than the board's owner
pub async fn require_board_owner<'e, E>(
    executor: E,
    board: &Board,
    asserted_owner: Uuid,
) -> Result<User, AuthzError>
where
    E: PgExecutor<'e>,
{
    let owner = User::find_by_id(executor, asserted_owner)
        .await?
        .ok_or(AuthzError::OwnerNotFound(asserted_owner))?;

    require_ownership(board, owner.id)?;

    Ok(owner)
}
