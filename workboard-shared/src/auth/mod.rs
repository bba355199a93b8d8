/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: access/refresh token issuance and validation
/// - [`middleware`]: Axum bearer-token middleware and `AuthContext`
/// - [`authorization`]: board ownership guard
///
/// # Example
///
/// ```no_run
/// use workboard_shared::auth::password::{hash_password, verify_password};
/// use workboard_shared::auth::jwt::{issue_token_pair, TokenLifetimes};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let pair = issue_token_pair(Uuid::new_v4(), "alice", "secret-key", &TokenLifetimes::default())?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
