//! # Kasir API
//!
//! HTTP server for the Kasir point-of-sale backend.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  client ──► CorsLayer ──► TraceLayer ──► Router ──► handler             │
//! │                                                       │                 │
//! │                                   State(AppState) ◄───┘                 │
//! │                                          │                              │
//! │                                          ▼                              │
//! │                                   kasir_db::Database                    │
//! │                                                                         │
//! │  handler error ──► ApiError ──► (status, { code, message })            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod routes;

use axum::Router;
use kasir_db::Database;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::{AppConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};

/// Shared handler state.
///
/// `Database` wraps a pool, so cloning per request is cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}

/// Builds the full application router.
///
/// ## Example
/// ```rust,ignore
/// let db = Database::new(config.db_config()).await?;
/// let app = kasir_api::build_router(AppState::new(db));
/// axum::serve(listener, app).await?;
/// ```
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::categories::router())
        .merge(routes::products::router())
        .merge(routes::checkout::router())
        .merge(routes::report::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
