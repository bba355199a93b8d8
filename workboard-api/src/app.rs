/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use workboard_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use workboard_shared::auth::{jwt::TokenLifetimes, middleware::jwt_auth_middleware};

/// Shared application state
///
/// Cloned into every handler via `State`; the config sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,

    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    pub fn token_lifetimes(&self) -> TokenLifetimes {
        self.config.token_lifetimes()
    }
}

/// Builds the complete router
///
/// ```text
/// /health                                   public
/// /auth/login/, /auth/token/refresh/        public
/// /api/users/...                            public
/// /api/boards/...                           bearer token
/// /api/tasks/...                            bearer token
/// ```
///
/// Layers, outermost first: security headers, CORS, request tracing, then
/// JWT auth on the board and task routes only.
pub fn build_router(state: AppState) -> Router {
    use crate::routes::{auth, boards, health, tasks, users};

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/login/", post(auth::login))
        .route("/auth/token/refresh/", post(auth::refresh))
        .route("/api/users/", get(users::list_users).post(users::create_user))
        .route(
            "/api/users/:id/",
            get(users::get_user)
                .put(users::replace_user)
                .patch(users::patch_user)
                .delete(users::delete_user),
        );

    let protected_routes = Router::new()
        .route("/api/boards/", get(boards::list_boards).post(boards::create_board))
        .route(
            "/api/boards/:id/",
            get(boards::get_board)
                .put(boards::replace_board)
                .patch(boards::patch_board)
                .delete(boards::delete_board),
        )
        .route("/api/boards/:id/task-count/", get(boards::task_count))
        .route("/api/tasks/", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/api/tasks/:id/",
            get(tasks::get_task)
                .put(tasks::replace_task)
                .patch(tasks::patch_task)
                .delete(tasks::delete_task),
        )
        .route(
            "/api/tasks/status/:board_id/:status/",
            get(tasks::tasks_by_status),
        )
        .route("/api/tasks/users/:board_id/", get(tasks::users_on_board))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_layer));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config.api.cors_origins))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Validates the bearer token and injects `AuthContext`
async fn jwt_auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    jwt_auth_middleware(state.jwt_secret().to_string(), req, next)
        .await
        .map_err(ApiError::from)
}
