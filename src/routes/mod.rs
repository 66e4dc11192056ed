//! HTTP route handlers.
//!
//! The webhook route is mounted at the configured `http.path` and carries
//! `Cache-Control: no-store`. Request bodies are not size-limited on that
//! route. The health route is fixed at `/health`.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request, allowing correlation of all logs within a request.

pub mod health;
pub mod status;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::{CACHE_CONTROL_WEBHOOK, HEALTH_PATH};
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Creates the Axum router with the webhook and health routes.
pub fn create_router(state: AppState) -> Router {
    let webhook_routes = Router::new()
        .route(&state.config.http.path, post(status::update))
        .layer(DefaultBodyLimit::disable())
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_WEBHOOK),
        ));

    // Health check - no caching, always fresh for liveness checks
    let health_routes = Router::new().route(HEALTH_PATH, get(health::health));

    Router::new()
        .merge(webhook_routes)
        .merge(health_routes)
        .with_state(state)
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
