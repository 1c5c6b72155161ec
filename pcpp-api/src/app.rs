/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use pcpp_api::{app::{build_router, AppState}, config::Config};
/// use pcpp_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
/// let app = build_router(AppState::new(pool, config));
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{security::SecurityHeadersLayer, session::session_layer},
    routes,
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    // Credentials are needed for the session cookie
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET  /health
/// ├── GET|POST /api?action=...          # action dispatcher
/// └── /v1/
///     ├── /auth/
///     │   ├── POST /register
///     │   ├── POST /login
///     │   ├── POST /logout
///     │   └── GET  /me
///     ├── GET|POST    /notes
///     ├── GET         /notes/search
///     ├── GET|DELETE  /notes/:id
///     ├── GET|POST    /notes/:id/comments
///     └── GET         /stats
/// ```
///
/// `/api` and `/v1` run behind the session layer, which resolves the cookie
/// into an `AuthContext` for every request. Request bodies are capped at
/// `MAX_UPLOAD_MB`.
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/me", get(routes::auth::check_auth));

    let note_routes = Router::new()
        .route(
            "/",
            get(routes::notes::list_notes).post(routes::notes::add_note),
        )
        .route("/search", get(routes::notes::search_notes))
        .route(
            "/:id",
            get(routes::notes::get_note_by_path).delete(routes::notes::delete_note_by_path),
        )
        .route(
            "/:id/comments",
            get(routes::comments::get_comments_by_path).post(routes::comments::add_comment_by_path),
        );

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/notes", note_routes)
        .route("/stats", get(routes::stats::get_stats));

    let session_routes = Router::new()
        .route(
            "/api",
            get(routes::action::dispatch).post(routes::action::dispatch),
        )
        .nest("/v1", v1_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_layer,
        ));

    Router::new()
        .merge(health_routes)
        .merge(session_routes)
        .layer(DefaultBodyLimit::max(state.config.api.max_upload_bytes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
