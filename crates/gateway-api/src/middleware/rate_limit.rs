//! Rate-limiting stage: resolve the client identity, check its quota,
//! short-circuit with 429 when exhausted.

use crate::error::error_response;
use crate::headers::{X_FORWARDED_FOR, X_REAL_IP};
use crate::state::AppState;
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use gateway_core::rate_limit::epoch_ms;
use gateway_core::{resolve_client_ip, GatewayError, RateDecision};
use std::net::SocketAddr;
use tracing::warn;

/// Resolved rate-limiting identity, added to request extensions so later
/// stages can log it without re-resolving.
#[derive(Debug, Clone)]
pub struct ClientId(pub String);

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let client_id = {
        let headers = request.headers();
        let forwarded_for = headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok());
        let real_ip = headers.get(X_REAL_IP).and_then(|v| v.to_str().ok());
        let peer = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());
        resolve_client_ip(forwarded_for, real_ip, peer.as_deref())
    };
    let path = request.uri().path().to_string();
    request.extensions_mut().insert(ClientId(client_id.clone()));

    // Health probes, API docs and static assets bypass the limiter before
    // any counter lookup.
    if state.limiter.is_exempt(&path) {
        return next.run(request).await;
    }

    match state.limiter.check_and_increment(&client_id, epoch_ms()) {
        RateDecision::Allowed { .. } => next.run(request).await,
        RateDecision::Rejected { retry_after_secs } => {
            warn!(
                client_id = %client_id,
                path = %path,
                retry_after_secs,
                "rate limit exceeded"
            );
            error_response(&GatewayError::RateLimited { retry_after_secs })
        }
    }
}
