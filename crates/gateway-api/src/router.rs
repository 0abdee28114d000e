//! Route configuration.

use crate::handlers;
use crate::middleware::{
    auth_context_middleware, authorize_middleware, forward_headers_middleware,
    rate_limit_middleware,
};
use crate::proxy;
use crate::state::AppState;
use axum::routing::get;
use axum::{middleware, Router};
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Create the application router.
///
/// ## Routes
/// - GET /health, /health/ready, /health/live - probes
/// - GET /version - build information
/// - everything else - the guarded proxy pipeline
///
/// Proxied traffic traverses the ordered stages (layers run bottom-up):
/// rate limit -> auth context -> header forwarding -> authorization ->
/// proxy hop. Probe routes sit outside the guarded chain.
pub fn create_router(state: AppState) -> Router {
    let guarded = Router::new()
        .fallback(proxy::forward_to_backend)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authorize_middleware,
        ))
        .layer(middleware::from_fn(forward_headers_middleware))
        .layer(middleware::from_fn(auth_context_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/health/ready", get(handlers::ready))
        .route("/health/live", get(handlers::live))
        .route("/version", get(handlers::version))
        .merge(guarded)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(60)))
        .with_state(state)
}
