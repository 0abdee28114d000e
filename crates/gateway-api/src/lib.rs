//! API gateway edge service.
//!
//! Every proxied request traverses a statically ordered pipeline:
//! rate limit -> auth context -> header forwarding -> authorization ->
//! proxy hop. The order is load-bearing: over-quota clients are rejected
//! before any authentication work, and authorization evaluates the
//! fully-populated headers the forwarding stage establishes.

pub mod error;
pub mod handlers;
pub mod headers;
pub mod middleware;
pub mod proxy;
pub mod router;
pub mod settings;
pub mod state;
