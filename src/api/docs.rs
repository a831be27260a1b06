//! OpenAPI document for the HTTP API.

use utoipa::OpenApi;

use crate::counter::{CounterResponse, IncrementRequest};
use crate::error::ErrorResponse;

use super::handlers::{self, ServiceInfo};

/// Generated OpenAPI description of every documented route.
#[derive(OpenApi)]
#[openapi(
    info(title = "Counter API", description = "Atomic counter backed by DynamoDB"),
    paths(
        handlers::root,
        handlers::get_counter,
        handlers::increment_counter,
        handlers::reset_counter
    ),
    components(schemas(ServiceInfo, CounterResponse, IncrementRequest, ErrorResponse)),
    tags(
        (name = "health", description = "Service metadata"),
        (name = "counter", description = "Global counter resource")
    )
)]
pub struct ApiDoc;
