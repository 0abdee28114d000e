//! Middleware pipeline stages.
//!
//! The stages run in a fixed order — rate limit, then auth context, then
//! header forwarding, then authorization — wired explicitly in
//! `router::create_router`. Rejecting over-quota clients first avoids
//! wasted authentication work, and authorization must see the headers the
//! forwarding stage establishes.

pub mod auth_context;
pub mod authorize;
pub mod forward;
pub mod rate_limit;

// Re-exports
pub use auth_context::auth_context_middleware;
pub use authorize::authorize_middleware;
pub use forward::forward_headers_middleware;
pub use rate_limit::{rate_limit_middleware, ClientId};
