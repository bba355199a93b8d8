/// API route handlers
///
/// - `health`: health check
/// - `auth`: login and token refresh
/// - `users`: user registration and management (public)
/// - `boards`: boards with nested task edits (authenticated)
/// - `tasks`: task CRUD and board queries (authenticated)

pub mod auth;
pub mod boards;
pub mod health;
pub mod tasks;
pub mod users;

use serde::Deserialize;

/// `?limit=&offset=` query parameters for list endpoints
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "Pagination::default_limit")]
    pub limit: i64,

    #[serde(default)]
    pub offset: i64,
}

impl Pagination {
    pub const MAX_LIMIT: i64 = 500;

    fn default_limit() -> i64 {
        100
    }

    /// Limit and offset clamped to sane bounds
    pub fn bounds(&self) -> (i64, i64) {
        (self.limit.clamp(1, Self::MAX_LIMIT), self.offset.max(0))
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: Self::default_limit(),
            offset: 0,
        }
    }
}
