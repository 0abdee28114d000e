//! Header-forwarding stage: rewrite the outbound request with trusted
//! identity headers and the gateway-origin marker.
//!
//! The marker is how backends distinguish "came through the gateway" from
//! direct access, so every trusted header is stripped from the inbound
//! request before the gateway stamps its own values — a client-supplied
//! `X-JWT-Authorities` must never survive this stage.

use crate::headers::{
    GATEWAY_REQUEST_VALUE, TRUSTED_HEADERS, X_GATEWAY_REQUEST, X_JWT_ACCOUNT_ID,
    X_JWT_AUTHORITIES, X_JWT_SUBJECT, X_JWT_USERNAME, X_REQUEST_ID, X_USER_PERMISSIONS,
    X_USER_ROLES,
};
use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use gateway_core::AuthContext;
use std::collections::BTreeSet;

pub async fn forward_headers_middleware(mut request: Request, next: Next) -> Response {
    let auth = request.extensions().get::<AuthContext>().cloned();
    let headers = request.headers_mut();

    for name in TRUSTED_HEADERS {
        headers.remove(name);
    }

    headers.insert(
        X_GATEWAY_REQUEST,
        HeaderValue::from_static(GATEWAY_REQUEST_VALUE),
    );
    if !headers.contains_key(X_REQUEST_ID) {
        if let Ok(value) = HeaderValue::from_str(&uuid::Uuid::new_v4().to_string()) {
            headers.insert(X_REQUEST_ID, value);
        }
    }

    if let Some(ctx) = auth {
        set_if_nonempty(headers, X_JWT_SUBJECT, &ctx.subject);
        if let Some(username) = &ctx.username {
            set_if_nonempty(headers, X_JWT_USERNAME, username);
        }
        if let Some(account_id) = ctx.account_id {
            set_if_nonempty(headers, X_JWT_ACCOUNT_ID, &account_id.to_string());
        }
        set_joined(headers, X_JWT_AUTHORITIES, &ctx.authorities());
        set_joined(headers, X_USER_ROLES, &ctx.roles);
        set_joined(headers, X_USER_PERMISSIONS, &ctx.permissions);
    }

    next.run(request).await
}

/// Empty or unrepresentable values are omitted, never sent as "".
fn set_if_nonempty(headers: &mut HeaderMap, name: &'static str, value: &str) {
    if value.is_empty() {
        return;
    }
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}

fn set_joined(headers: &mut HeaderMap, name: &'static str, values: &BTreeSet<String>) {
    let joined = values.iter().cloned().collect::<Vec<_>>().join(",");
    set_if_nonempty(headers, name, &joined);
}
