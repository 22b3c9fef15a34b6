//! HTTP API route definitions.

use axum::{routing::get, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::error::panic_response;
use super::handlers::{
    create_student, health, index, list_students, metrics_export, not_found, AppState,
};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        // Health endpoints
        .route("/health", get(health))
        .route("/metrics", get(metrics_export))
        // Student endpoints
        .route("/api/students", get(list_students).post(create_student))
        .fallback(not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        // Any origin; answers OPTIONS preflight before routing.
        .layer(CorsLayer::permissive())
}
