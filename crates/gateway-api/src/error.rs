//! Mapping from [`GatewayError`] to HTTP responses.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use gateway_core::GatewayError;

/// Build the terminal response for a handled failure.
///
/// Every branch returns the standard JSON envelope; internal detail stays
/// in the logs.
pub fn error_response(err: &GatewayError) -> Response {
    let body = err.to_body();
    match err {
        GatewayError::RateLimited { retry_after_secs } => (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, retry_after_secs.to_string())],
            Json(body),
        )
            .into_response(),
        GatewayError::PolicyDenied => (StatusCode::FORBIDDEN, Json(body)).into_response(),
        GatewayError::BackendUnavailable(_) => {
            (StatusCode::BAD_GATEWAY, Json(body)).into_response()
        }
        GatewayError::Internal(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
