//! Gateway error taxonomy and the JSON error envelope.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Errors surfaced by the gateway edge layer.
///
/// Authentication absence or malformance is deliberately NOT represented
/// here: an anonymous request is a normal request, and malformed optional
/// claims degrade to absent fields instead of failing the chain.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Client exhausted its per-window quota.
    #[error("Rate limit exceeded: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// The matched route policy denied the request.
    #[error("Access denied")]
    PolicyDenied,

    /// The proxy hop to the backend failed.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Anything unexpected caught at the boundary.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Machine-readable body returned for every handled failure mode.
///
/// Clients always receive this envelope, never a stack trace. The `message`
/// is intentionally generic for denials: the specific failing authority is
/// logged for audit, not disclosed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    /// ISO-8601 timestamp of when the error was produced.
    pub timestamp: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl GatewayError {
    /// The client-facing envelope for this error.
    pub fn to_body(&self) -> ErrorBody {
        match self {
            Self::RateLimited { .. } => {
                ErrorBody::new("Rate limit exceeded", "Too many requests. Try again later.")
            }
            Self::PolicyDenied => ErrorBody::new("Forbidden", "Access denied."),
            Self::BackendUnavailable(_) => {
                ErrorBody::new("Bad Gateway", "Upstream service is unavailable.")
            }
            Self::Internal(_) => {
                ErrorBody::new("Internal Server Error", "An unexpected error occurred.")
            }
        }
    }
}
