pub mod drops;
pub mod health;
pub mod schemas;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use linkvault_engine::DropEngine;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The drop lifecycle engine.
    pub engine: DropEngine,
    /// Base URL share links are built from, without a trailing slash.
    pub public_url: String,
    /// Largest accepted request body in bytes.
    pub max_upload_bytes: usize,
}

/// Build the Axum router with all API routes and middleware.
pub fn router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        // Health & metrics
        .route("/health", get(health::health))
        .route("/metrics", get(health::metrics))
        // Drops
        .route("/api/upload", post(drops::upload))
        .route("/api/delete", post(drops::delete_drop))
        .route("/api/{id}", get(drops::get_drop))
        .route("/api/{id}/download", get(drops::download))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
