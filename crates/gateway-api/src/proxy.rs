//! The final hop: forward the (header-rewritten) request to the backend
//! selected by the route table and relay the response.

use crate::error::error_response;
use crate::state::AppState;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::response::Response;
use gateway_core::GatewayError;
use tracing::{debug, error};

/// Request bodies above this size are not proxied.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Headers that describe the connection, not the request; never relayed.
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
];

/// Fallback handler behind the full middleware chain.
pub async fn forward_to_backend(State(state): State<AppState>, request: Request) -> Response {
    match proxy(&state, request).await {
        Ok(response) => response,
        Err(err) => {
            error!(error = %err, "proxy hop failed");
            error_response(&err)
        }
    }
}

async fn proxy(state: &AppState, request: Request) -> Result<Response, GatewayError> {
    let path = request.uri().path().to_string();
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.clone());
    let method = request.method().clone();

    // The authorization stage already denied unmatched routes; reaching
    // this point without a rule means the tables disagree.
    let rule = state
        .engine
        .select(&path, method.as_str())
        .ok_or(GatewayError::PolicyDenied)?;
    let backend = rule.backend.clone().ok_or_else(|| {
        GatewayError::BackendUnavailable(format!("no backend configured for {path}"))
    })?;
    let url = format!("{}{}", backend.trim_end_matches('/'), path_and_query);

    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| GatewayError::Internal(format!("reading request body: {e}")))?;

    let mut outbound = parts.headers;
    for name in HOP_BY_HOP {
        outbound.remove(name);
    }

    debug!(method = %method, url = %url, "forwarding to backend");
    let upstream = state
        .http
        .request(method, &url)
        .headers(outbound)
        .body(bytes)
        .send()
        .await
        .map_err(|e| GatewayError::BackendUnavailable(e.to_string()))?;

    let mut builder = Response::builder().status(upstream.status());
    for (name, value) in upstream.headers() {
        if !HOP_BY_HOP.contains(&name.as_str()) {
            builder = builder.header(name, value);
        }
    }
    builder
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| GatewayError::Internal(format!("assembling response: {e}")))
}
