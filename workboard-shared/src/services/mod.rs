/// Board and task business logic
///
/// - [`reconcile`]: board create/update with nested task edits, applied
///   atomically
/// - [`query`]: read-only board queries (tasks by status, assignees, counts)

pub mod query;
pub mod reconcile;

use crate::auth::authorization::AuthzError;

/// Error returned by service operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A referenced board, task or user does not exist
    #[error("{0}")]
    NotFound(String),

    /// The caller may not perform this change
    #[error("{0}")]
    Forbidden(String),

    /// The input is malformed (missing title, unknown status, ...)
    #[error("{0}")]
    Invalid(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<AuthzError> for ServiceError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::OwnerNotFound(_) => ServiceError::NotFound(err.to_string()),
            AuthzError::NotOwner => ServiceError::Forbidden(err.to_string()),
            AuthzError::DatabaseError(e) => ServiceError::Database(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_authz_error_conversion() {
        assert!(matches!(
            ServiceError::from(AuthzError::OwnerNotFound(Uuid::new_v4())),
            ServiceError::NotFound(_)
        ));
        assert!(matches!(
            ServiceError::from(AuthzError::NotOwner),
            ServiceError::Forbidden(_)
        ));
        assert!(matches!(
            ServiceError::from(AuthzError::DatabaseError(sqlx::Error::RowNotFound)),
            ServiceError::Database(_)
        ));
    }
}
