//! HTTP API route definitions.

use axum::http::{header, HeaderValue, Method};
use axum::{routing::get, Router};
use tower_http::cors::{AllowHeaders, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{
    get_counter, increment_counter, metrics_text, openapi, reset_counter, root, AppState,
};

/// Create the API router with CORS, security headers and request tracing.
pub fn create_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        // Health endpoint
        .route("/", get(root))
        // Counter resource
        .route(
            "/counter",
            get(get_counter).post(increment_counter).delete(reset_counter),
        )
        // Introspection
        .route("/openapi.json", get(openapi))
        .route("/metrics", get(metrics_text))
        .with_state(state)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Build the CORS layer. `None` allows any origin without credentials.
pub fn cors_layer(origins: Option<Vec<HeaderValue>>) -> CorsLayer {
    match origins {
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        // Credentials cannot be combined with wildcards.
        Some(origins) => CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true),
    }
}
