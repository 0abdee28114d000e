//! # Gateway Core
//!
//! Edge-layer logic for the API gateway: the pieces that must reason about
//! concurrent mutable state and policy composition, kept free of any HTTP
//! framework so they are unit-testable in isolation.
//!
//! ## Overview
//!
//! Every inbound request flows through a fixed pipeline:
//!
//! - **Client identity**: derive a stable rate-limiting key from proxy
//!   headers or the peer address ([`client_ip`])
//! - **Rate limiting**: fixed-window per-client quotas over a concurrent
//!   client->window table ([`rate_limit`])
//! - **Authentication context**: lenient claim extraction into an immutable
//!   per-request identity ([`auth`])
//! - **Authorization**: a closed policy table evaluated fail-closed
//!   ([`policy`])
//!
//! The stages short-circuit with a terminal response; the error envelope
//! for every handled failure lives in [`error`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gateway_core::policy::{PolicyEngine, RequestAttributes, RoutePolicy, RouteRule};
//! use gateway_core::rate_limit::{RateLimitConfig, RateLimiterState, epoch_ms};
//!
//! let limiter = RateLimiterState::new(RateLimitConfig::default());
//! let decision = limiter.check_and_increment("1.2.3.4", epoch_ms());
//!
//! let engine = PolicyEngine::new(
//!     vec![RouteRule {
//!         path: "/api/users".to_string(),
//!         method: None,
//!         policy: RoutePolicy::PublicAccess,
//!         backend: Some("http://user-service:8081".to_string()),
//!     }],
//!     Some("shared-secret".to_string()),
//! );
//! let verdict = engine.authorize("/api/users/7", "GET", &RequestAttributes::default());
//! ```

pub mod auth;
pub mod client_ip;
pub mod error;
pub mod policy;
pub mod rate_limit;

// Primary exports
pub use auth::AuthContext;
pub use client_ip::resolve_client_ip;
pub use error::{ErrorBody, GatewayError};
pub use policy::{PolicyDecision, PolicyEngine, RequestAttributes, RoutePolicy, RouteRule};
pub use rate_limit::{RateDecision, RateLimitConfig, RateLimiterState};
