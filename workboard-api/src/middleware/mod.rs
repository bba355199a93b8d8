/// HTTP middleware for the API server
///
/// - `security`: security response headers
///
/// Bearer-token authentication lives in `workboard_shared::auth::middleware`
/// and is wired up in `app::build_router`.

pub mod security;
