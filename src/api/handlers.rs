//! HTTP API handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::error::ApiError;
use crate::error::ValidationError;
use crate::metrics::{self, RequestTimer};
use crate::store::Store;
use crate::student::{self, Student};

/// Plain-text body served at `/`.
pub const WELCOME_MESSAGE: &str = "✅ Student API is running! Use /api/students";

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Student collection store.
    pub store: Arc<Store>,
    /// Prometheus scrape handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state.
    pub fn new(store: Store) -> Self {
        Self {
            store: Arc::new(store),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle so `/metrics` can render it.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Welcome handler.
pub async fn index() -> &'static str {
    WELCOME_MESSAGE
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Prometheus scrape handler - 404 when metrics are disabled.
pub async fn metrics_export(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()).into_response(),
        None => ApiError::NotFound.into_response(),
    }
}

/// Create a student from a loosely typed JSON body.
pub async fn create_student(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    let timer = RequestTimer::new("create_student");

    let body = parse_body(&body)?;
    let new_student = student::validate(&body).inspect_err(|err| {
        debug!(reason = %err, "Rejected create request");
        metrics::inc_validation_failures(failing_field(err));
    })?;

    let created = state
        .store
        .append(new_student.into_student())
        .await
        .map_err(ApiError::CreateFailed)?;

    metrics::inc_students_created();
    info!(
        id = %created.id,
        name = %created.name,
        elapsed_ms = timer.elapsed_ms(),
        "Student created"
    );

    Ok((StatusCode::CREATED, Json(created)))
}

/// List every stored record as-is, in stored order.
pub async fn list_students(State(state): State<AppState>) -> Result<Json<Vec<Value>>, ApiError> {
    let _timer = RequestTimer::new("list_students");

    let students = state.store.read().await.map_err(ApiError::ListFailed)?;
    Ok(Json(students))
}

/// Fallback for unmatched routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// An empty body is treated as `{}`.
fn parse_body(raw: &[u8]) -> Result<Value, ApiError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(raw).map_err(ApiError::MalformedBody)
}

fn failing_field(err: &ValidationError) -> &'static str {
    match err {
        ValidationError::NameRequired => "name",
        ValidationError::CourseRequired => "course",
        ValidationError::YearRequired => "year",
        ValidationError::AgeInvalid => "age",
    }
}
