//! Prometheus metrics for request and store monitoring.
//!
//! This module provides metrics for:
//! - HTTP requests per endpoint
//! - Store call latency per operation
//! - Counter mutations and store errors

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{debug, warn};

// === Metric Name Constants ===

/// HTTP requests counter metric name.
pub const METRIC_HTTP_REQUESTS: &str = "http_requests_total";
/// Store call latency metric name.
pub const METRIC_STORE_LATENCY: &str = "store_latency_ms";
/// Store errors counter metric name.
pub const METRIC_STORE_ERRORS: &str = "store_errors_total";
/// Counter increments metric name.
pub const METRIC_COUNTER_INCREMENTS: &str = "counter_increments_total";
/// Counter resets metric name.
pub const METRIC_COUNTER_RESETS: &str = "counter_resets_total";

/// Install the Prometheus recorder and register metric descriptions.
///
/// Returns `None` if a global recorder is already installed.
pub fn init_metrics() -> Option<PrometheusHandle> {
    let handle = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => handle,
        Err(e) => {
            warn!("Metrics recorder not installed: {}", e);
            return None;
        }
    };

    describe_counter!(METRIC_HTTP_REQUESTS, "Total number of HTTP requests by endpoint");
    describe_histogram!(
        METRIC_STORE_LATENCY,
        "Key-value store call latency in milliseconds"
    );
    describe_counter!(METRIC_STORE_ERRORS, "Total number of failed store calls");
    describe_counter!(
        METRIC_COUNTER_INCREMENTS,
        "Total number of successful counter increments"
    );
    describe_counter!(METRIC_COUNTER_RESETS, "Total number of counter resets");

    debug!("Metrics initialized");
    Some(handle)
}

/// Increment HTTP requests counter.
pub fn inc_http_requests(endpoint: &'static str) {
    counter!(METRIC_HTTP_REQUESTS, "endpoint" => endpoint).increment(1);
}

/// Increment store errors counter.
pub fn inc_store_errors() {
    counter!(METRIC_STORE_ERRORS).increment(1);
}

/// Increment counter increments counter.
pub fn inc_counter_increments() {
    counter!(METRIC_COUNTER_INCREMENTS).increment(1);
}

/// Increment counter resets counter.
pub fn inc_counter_resets() {
    counter!(METRIC_COUNTER_RESETS).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
    operation: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric and operation label.
    pub fn new(metric_name: &'static str, operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
            operation,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        let latency_ms = self.elapsed_ms();
        histogram!(self.metric_name, "operation" => self.operation).record(latency_ms);
    }
}

/// Create a latency timer for a store call.
pub fn timer_store(operation: &'static str) -> LatencyTimer {
    LatencyTimer::new(METRIC_STORE_LATENCY, operation)
}
