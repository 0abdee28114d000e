//! Authorization stage: select the matching route policy and evaluate it
//! against the request's verified attributes.
//!
//! Runs after header forwarding so the gateway-origin marker and identity
//! headers are already in place. Denials are logged with client identity
//! and path for audit; the client sees a generic 403.

use crate::error::error_response;
use crate::headers::{GATEWAY_REQUEST_VALUE, X_API_KEY, X_GATEWAY_REQUEST};
use crate::middleware::rate_limit::ClientId;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use gateway_core::client_ip::UNKNOWN_CLIENT;
use gateway_core::{AuthContext, GatewayError, RequestAttributes};
use tracing::warn;

pub async fn authorize_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let attrs = RequestAttributes {
        gateway_origin: request
            .headers()
            .get(X_GATEWAY_REQUEST)
            .and_then(|v| v.to_str().ok())
            == Some(GATEWAY_REQUEST_VALUE),
        api_key: request
            .headers()
            .get(X_API_KEY)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        authorities: request
            .extensions()
            .get::<AuthContext>()
            .map(AuthContext::authorities)
            .unwrap_or_default(),
    };

    let path = request.uri().path();
    let method = request.method().as_str();
    let decision = state.engine.authorize(path, method, &attrs);

    if decision.allowed {
        return next.run(request).await;
    }

    let client_id = request
        .extensions()
        .get::<ClientId>()
        .map(|c| c.0.as_str())
        .unwrap_or(UNKNOWN_CLIENT);
    warn!(
        client_id = %client_id,
        path = %path,
        method = %method,
        reason = %decision.reason.as_deref().unwrap_or("denied"),
        "authorization denied"
    );
    error_response(&GatewayError::PolicyDenied)
}
