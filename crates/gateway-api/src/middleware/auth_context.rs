//! Authentication-context stage: decode the bearer credential's claim set
//! and attach an [`AuthContext`] to the request.
//!
//! Signature and expiry were already verified by the identity provider in
//! front of this service; only the payload segment is decoded here. A
//! missing or malformed token makes the request anonymous, never rejected —
//! downstream route policies decide whether anonymity is acceptable.

use axum::extract::Request;
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use gateway_core::AuthContext;
use tracing::warn;

pub async fn auth_context_middleware(mut request: Request, next: Next) -> Response {
    if let Some(claims) = bearer_claims(request.headers()) {
        request
            .extensions_mut()
            .insert(AuthContext::from_claims(&claims));
    }
    next.run(request).await
}

fn bearer_claims(headers: &HeaderMap) -> Option<serde_json::Value> {
    let authorization = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = authorization
        .strip_prefix("Bearer ")
        .or_else(|| authorization.strip_prefix("bearer "))?
        .trim();
    decode_payload_segment(token)
}

/// Decode the payload segment of a compact JWS. Accepts padded and
/// unpadded base64url.
fn decode_payload_segment(token: &str) -> Option<serde_json::Value> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        warn!("bearer token is not a compact JWS; treating request as anonymous");
        return None;
    }

    let payload = URL_SAFE_NO_PAD
        .decode(parts[1])
        .or_else(|_| URL_SAFE.decode(parts[1]))
        .ok()
        .or_else(|| {
            warn!("bearer payload is not valid base64url; treating request as anonymous");
            None
        })?;

    serde_json::from_slice(&payload).ok().or_else(|| {
        warn!("bearer payload is not valid JSON; treating request as anonymous");
        None
    })
}
