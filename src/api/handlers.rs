//! HTTP API handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::counter::{CounterResponse, CounterService, IncrementRequest};
use crate::error::{ApiError, ErrorResponse};
use crate::metrics;

use super::docs::ApiDoc;

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Counter operations.
    pub counter: CounterService,
    /// Prometheus handle, `None` when no recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("counter", &self.counter)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

impl AppState {
    /// Create new app state.
    pub fn new(counter: CounterService) -> Self {
        Self {
            counter,
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for the `/metrics` endpoint.
    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }
}

/// Service metadata response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfo {
    /// Greeting.
    pub message: String,
    /// Package version.
    pub version: String,
    /// Always "healthy".
    pub status: String,
    /// Routes served by this API.
    pub endpoints: Vec<String>,
}

/// Health check and service metadata - always returns 200.
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Service metadata", body = ServiceInfo))
)]
pub async fn root() -> Json<ServiceInfo> {
    metrics::inc_http_requests("root");

    Json(ServiceInfo {
        message: "Counter API Ready".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "healthy".to_string(),
        endpoints: [
            "GET /",
            "GET /counter",
            "POST /counter",
            "DELETE /counter",
            "GET /openapi.json",
            "GET /metrics",
        ]
        .iter()
        .map(|e| e.to_string())
        .collect(),
    })
}

/// Read the counter; a never-written counter reads as zero.
#[utoipa::path(
    get,
    path = "/counter",
    tag = "counter",
    responses(
        (status = 200, description = "Current counter value", body = CounterResponse),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn get_counter(State(state): State<AppState>) -> Result<Json<CounterResponse>, ApiError> {
    metrics::inc_http_requests("get_counter");

    let counter = state.counter.read().await?;
    let message = if counter.is_initialized() {
        "Current counter value"
    } else {
        "Counter has not been initialized"
    };

    Ok(Json(CounterResponse::from_counter(counter, message)))
}

/// Atomically add `increment` (default 1) to the counter.
#[utoipa::path(
    post,
    path = "/counter",
    tag = "counter",
    request_body(content = IncrementRequest, description = "Optional; an empty body increments by 1"),
    responses(
        (status = 200, description = "Counter after the increment", body = CounterResponse),
        (status = 422, description = "Body is not a valid increment request", body = ErrorResponse),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn increment_counter(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CounterResponse>, ApiError> {
    metrics::inc_http_requests("increment_counter");

    let request = parse_increment(&body)?;
    let counter = state.counter.increment(request.increment).await?;

    Ok(Json(CounterResponse::from_counter(
        counter,
        format!("Counter incremented by {}", request.increment),
    )))
}

/// Reset the counter to zero.
#[utoipa::path(
    delete,
    path = "/counter",
    tag = "counter",
    responses(
        (status = 200, description = "Counter after the reset", body = CounterResponse),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn reset_counter(State(state): State<AppState>) -> Result<Json<CounterResponse>, ApiError> {
    metrics::inc_http_requests("reset_counter");

    let counter = state.counter.reset().await?;
    Ok(Json(CounterResponse::from_counter(counter, "Counter reset")))
}

/// OpenAPI document.
pub async fn openapi() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Prometheus text exposition.
pub async fn metrics_text(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let handle = state.metrics.as_ref().ok_or(ApiError::NotFound)?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    ))
}

/// An empty body means the default increment.
fn parse_increment(body: &[u8]) -> Result<IncrementRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(IncrementRequest::default());
    }

    serde_json::from_slice(body)
        .map_err(|e| ApiError::Unprocessable(format!("invalid increment request: {e}")))
}
