//! Prometheus metrics for request latency and store health.
//!
//! This module provides metrics for:
//! - HTTP request latency per endpoint
//! - Students created
//! - Validation failures
//! - Store corruption recoveries and I/O failures

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// Students created counter metric name.
pub const METRIC_STUDENTS_CREATED: &str = "students_created_total";
/// Validation failures counter metric name.
pub const METRIC_VALIDATION_FAILURES: &str = "validation_failures_total";
/// Store corruption recoveries counter metric name.
pub const METRIC_STORE_CORRUPTIONS: &str = "store_corruptions_total";
/// Store I/O failures counter metric name.
pub const METRIC_STORE_ERRORS: &str = "store_errors_total";

/// Install the global Prometheus recorder and register metric descriptions.
///
/// Call this once at startup. The returned handle renders the scrape output.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );
    describe_counter!(METRIC_STUDENTS_CREATED, "Total number of students created");
    describe_counter!(
        METRIC_VALIDATION_FAILURES,
        "Total number of create requests rejected by validation"
    );
    describe_counter!(
        METRIC_STORE_CORRUPTIONS,
        "Total number of corrupted store files quarantined"
    );
    describe_counter!(METRIC_STORE_ERRORS, "Total number of store I/O failures");

    debug!("Metrics initialized");
    Ok(handle)
}

/// Record HTTP request latency.
pub fn record_http_latency(start: Instant, endpoint: &'static str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_HTTP_REQUEST_LATENCY, "endpoint" => endpoint).record(latency_ms);
}

/// Increment students created counter.
pub fn inc_students_created() {
    counter!(METRIC_STUDENTS_CREATED).increment(1);
}

/// Increment validation failures counter, labelled by the failing field.
pub fn inc_validation_failures(field: &'static str) {
    counter!(METRIC_VALIDATION_FAILURES, "field" => field).increment(1);
}

/// Increment store corruption counter.
pub fn inc_store_corruptions() {
    counter!(METRIC_STORE_CORRUPTIONS).increment(1);
}

/// Increment store I/O failure counter.
pub fn inc_store_errors() {
    counter!(METRIC_STORE_ERRORS).increment(1);
}

/// RAII guard that records request latency for an endpoint when dropped.
pub struct RequestTimer {
    start: Instant,
    endpoint: &'static str,
}

impl RequestTimer {
    /// Start timing a request to `endpoint`.
    pub fn new(endpoint: &'static str) -> Self {
        Self {
            start: Instant::now(),
            endpoint,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        record_http_latency(self.start, self.endpoint);
    }
}
