/// Application state and router builder
///
/// This module defines the shared application state and builds the Axum
/// router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use botboard_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = botboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use botboard_shared::auth::{jwt, AdminContext};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into each request handler via Axum's `State` extractor; the pool
/// is internally reference-counted and the config sits behind an Arc, so
/// the clone is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// └── /api/
///     ├── POST /auth/login           # Admin login (public)
///     ├── GET  /overview             # Quick metrics (authenticated below)
///     ├── GET  /users/summary
///     ├── GET  /conversations/summary
///     ├── GET  /conversations/user/:id
///     ├── GET  /messages/peak-hours
///     ├── GET  /menu/funnel
///     ├── GET  /services/top
///     ├── GET  /export/csv
///     └── GET  /raw-events
/// ```
///
/// Everything under `/api` except the login endpoint requires a bearer
/// token issued by login.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Login (public, no auth)
    let auth_routes = Router::new().route("/login", post(routes::auth::login));

    // Report endpoints (require a valid admin token)
    let report_routes = Router::new()
        .route("/overview", get(routes::overview::overview))
        .route("/users/summary", get(routes::users::users_summary))
        .route(
            "/conversations/summary",
            get(routes::conversations::conversations_summary),
        )
        .route(
            "/conversations/user/:id",
            get(routes::conversations::user_conversations),
        )
        .route("/messages/peak-hours", get(routes::messages::peak_hours))
        .route("/menu/funnel", get(routes::menu::menu_funnel))
        .route("/services/top", get(routes::services::top_services))
        .route("/export/csv", get(routes::export::export_csv))
        .route("/raw-events", get(routes::raw_events::recent_raw_events))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(report_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        // CSV exports compress well
        .layer(CompressionLayer::new())
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the bearer token from the Authorization header,
/// then injects the admin identity into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        crate::error::ApiError::BadRequest("Expected Bearer token".to_string())
    })?;

    let claims = jwt::validate_token(token, state.jwt_secret())?;

    req.extensions_mut().insert(AdminContext::from_claims(&claims));

    Ok(next.run(req).await)
}
