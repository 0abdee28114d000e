//! Header names owned by the gateway.

// Inbound
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_REAL_IP: &str = "x-real-ip";
pub const X_API_KEY: &str = "x-api-key";

// Outbound, injected by the forwarding stage
pub const X_GATEWAY_REQUEST: &str = "x-gateway-request";
/// Fixed truthy value of the gateway-origin marker. Backends outside the
/// gateway network boundary must reject this header from any other source.
pub const GATEWAY_REQUEST_VALUE: &str = "true";
pub const X_JWT_SUBJECT: &str = "x-jwt-subject";
pub const X_JWT_USERNAME: &str = "x-jwt-username";
pub const X_JWT_ACCOUNT_ID: &str = "x-jwt-account-id";
pub const X_JWT_AUTHORITIES: &str = "x-jwt-authorities";
pub const X_USER_ROLES: &str = "x-user-roles";
pub const X_USER_PERMISSIONS: &str = "x-user-permissions";
pub const X_REQUEST_ID: &str = "x-request-id";

/// Trust-carrying headers only the gateway may set. Any inbound occurrence
/// is stripped before the forwarding stage stamps its own values.
pub const TRUSTED_HEADERS: [&str; 7] = [
    X_GATEWAY_REQUEST,
    X_JWT_SUBJECT,
    X_JWT_USERNAME,
    X_JWT_ACCOUNT_ID,
    X_JWT_AUTHORITIES,
    X_USER_ROLES,
    X_USER_PERMISSIONS,
];
