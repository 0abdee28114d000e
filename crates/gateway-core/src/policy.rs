//! Route policy table and authorization evaluation.
//!
//! Policies form a closed set evaluated by one exhaustive match, so an
//! unmatched route can never be silently allowed: no rule means deny.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Access requirement attached to a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum RoutePolicy {
    /// Anyone may call the route.
    PublicAccess,
    /// The request must carry the gateway-origin marker.
    RequireGatewayOrigin,
    /// The request must present the shared API-key secret.
    RequireApiKey,
    /// Either the API key or the gateway-origin marker suffices.
    RequireApiKeyOrGatewayOrigin,
    /// Every listed authority must be present in the principal's
    /// granted-authority set. An absent principal is the empty set and is
    /// denied for any non-empty requirement.
    RequireAllAuthorities { authorities: BTreeSet<String> },
}

/// One routing rule: path prefix, optional method restriction, the policy
/// guarding it, and the backend the proxy forwards matching requests to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRule {
    /// Path prefix this rule covers.
    pub path: String,
    /// Restrict to one HTTP method; `None` matches all.
    #[serde(default)]
    pub method: Option<String>,
    #[serde(flatten)]
    pub policy: RoutePolicy,
    /// Upstream base URL for the proxy hop.
    #[serde(default)]
    pub backend: Option<String>,
}

/// Result of a policy authorization check.
///
/// The reason is for audit logs only; clients receive a generic denial.
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl PolicyDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Verified request attributes the engine evaluates policies against.
#[derive(Debug, Clone, Default)]
pub struct RequestAttributes {
    /// Whether the gateway-origin marker header carries the trusted value.
    pub gateway_origin: bool,
    /// The API key presented by the caller, if any.
    pub api_key: Option<String>,
    /// The principal's granted authorities; empty when anonymous.
    pub authorities: BTreeSet<String>,
}

/// Immutable policy table, built once at startup and shared read-only
/// across all requests.
pub struct PolicyEngine {
    rules: Vec<RouteRule>,
    api_key_secret: Option<String>,
}

impl PolicyEngine {
    /// An empty or missing secret means `RequireApiKey` can never match.
    pub fn new(rules: Vec<RouteRule>, api_key_secret: Option<String>) -> Self {
        Self {
            rules,
            api_key_secret: api_key_secret.filter(|s| !s.is_empty()),
        }
    }

    /// Select the matching rule: longest path prefix wins, ties broken by
    /// registration order.
    pub fn select(&self, path: &str, method: &str) -> Option<&RouteRule> {
        let mut best: Option<&RouteRule> = None;
        for rule in &self.rules {
            if !path.starts_with(rule.path.as_str()) {
                continue;
            }
            if let Some(required) = &rule.method {
                if !required.eq_ignore_ascii_case(method) {
                    continue;
                }
            }
            // Strictly-greater keeps the earliest rule on equal lengths.
            if best.map_or(true, |b| rule.path.len() > b.path.len()) {
                best = Some(rule);
            }
        }
        best
    }

    /// Authorize a request against the table. Fail-closed: no matching
    /// rule denies.
    pub fn authorize(&self, path: &str, method: &str, attrs: &RequestAttributes) -> PolicyDecision {
        match self.select(path, method) {
            Some(rule) => self.evaluate(&rule.policy, attrs),
            None => PolicyDecision::deny(format!("no policy registered for {method} {path}")),
        }
    }

    fn evaluate(&self, policy: &RoutePolicy, attrs: &RequestAttributes) -> PolicyDecision {
        match policy {
            RoutePolicy::PublicAccess => PolicyDecision::allow(),
            RoutePolicy::RequireGatewayOrigin => {
                if attrs.gateway_origin {
                    PolicyDecision::allow()
                } else {
                    PolicyDecision::deny("request did not pass through the gateway")
                }
            }
            RoutePolicy::RequireApiKey => {
                if self.api_key_matches(attrs) {
                    PolicyDecision::allow()
                } else {
                    PolicyDecision::deny("API key missing or mismatched")
                }
            }
            RoutePolicy::RequireApiKeyOrGatewayOrigin => {
                if attrs.gateway_origin || self.api_key_matches(attrs) {
                    PolicyDecision::allow()
                } else {
                    PolicyDecision::deny("neither API key nor gateway origin present")
                }
            }
            RoutePolicy::RequireAllAuthorities { authorities } => {
                if authorities.is_subset(&attrs.authorities) {
                    PolicyDecision::allow()
                } else {
                    let missing: Vec<&str> = authorities
                        .difference(&attrs.authorities)
                        .map(String::as_str)
                        .collect();
                    PolicyDecision::deny(format!("missing authorities: {}", missing.join(",")))
                }
            }
        }
    }

    fn api_key_matches(&self, attrs: &RequestAttributes) -> bool {
        match (&self.api_key_secret, &attrs.api_key) {
            (Some(secret), Some(presented)) => {
                constant_time_eq(secret.as_bytes(), presented.as_bytes())
            }
            _ => false,
        }
    }
}

/// Byte-wise comparison that does not short-circuit on the first mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authorities(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn rule(path: &str, policy: RoutePolicy) -> RouteRule {
        RouteRule {
            path: path.to_string(),
            method: None,
            policy,
            backend: None,
        }
    }

    fn engine(rules: Vec<RouteRule>) -> PolicyEngine {
        PolicyEngine::new(rules, Some("shared-secret".to_string()))
    }

    #[test]
    fn test_public_access_always_allows() {
        let engine = engine(vec![rule("/api/public", RoutePolicy::PublicAccess)]);
        let decision = engine.authorize("/api/public/items", "GET", &RequestAttributes::default());
        assert!(decision.allowed);
    }

    #[test]
    fn test_unmatched_route_is_denied() {
        let engine = engine(vec![rule("/api/public", RoutePolicy::PublicAccess)]);
        let decision = engine.authorize("/api/private", "GET", &RequestAttributes::default());
        assert!(!decision.allowed);
        assert!(decision.reason.is_some());
    }

    #[test]
    fn test_require_all_authorities_fail_closed() {
        let engine = engine(vec![rule(
            "/api/admin",
            RoutePolicy::RequireAllAuthorities {
                authorities: authorities(&["ADMIN", "SYSTEM"]),
            },
        )]);

        // Subset of the requirement: denied.
        let attrs = RequestAttributes {
            authorities: authorities(&["ADMIN"]),
            ..Default::default()
        };
        assert!(!engine.authorize("/api/admin", "GET", &attrs).allowed);

        // Absent principal (empty set): denied.
        assert!(
            !engine
                .authorize("/api/admin", "GET", &RequestAttributes::default())
                .allowed
        );

        // Superset: allowed.
        let attrs = RequestAttributes {
            authorities: authorities(&["ADMIN", "SYSTEM", "EXTRA"]),
            ..Default::default()
        };
        assert!(engine.authorize("/api/admin", "GET", &attrs).allowed);
    }

    #[test]
    fn test_denial_reason_never_reaches_the_client_envelope() {
        let engine = engine(vec![rule(
            "/api/admin",
            RoutePolicy::RequireAllAuthorities {
                authorities: authorities(&["SYSTEM"]),
            },
        )]);
        let decision = engine.authorize("/api/admin", "GET", &RequestAttributes::default());
        // The reason names the missing authority for audit logging; the
        // client envelope is built from GatewayError::PolicyDenied instead.
        assert!(decision.reason.unwrap().contains("SYSTEM"));
        let body = crate::error::GatewayError::PolicyDenied.to_body();
        assert!(!body.message.contains("SYSTEM"));
    }

    #[test]
    fn test_gateway_origin_marker() {
        let engine = engine(vec![rule("/internal", RoutePolicy::RequireGatewayOrigin)]);
        let attrs = RequestAttributes {
            gateway_origin: true,
            ..Default::default()
        };
        assert!(engine.authorize("/internal/x", "GET", &attrs).allowed);
        assert!(
            !engine
                .authorize("/internal/x", "GET", &RequestAttributes::default())
                .allowed
        );
    }

    #[test]
    fn test_api_key_exact_match() {
        let engine = engine(vec![rule("/hooks", RoutePolicy::RequireApiKey)]);
        let good = RequestAttributes {
            api_key: Some("shared-secret".to_string()),
            ..Default::default()
        };
        assert!(engine.authorize("/hooks/x", "POST", &good).allowed);

        let bad = RequestAttributes {
            api_key: Some("shared-secret-".to_string()),
            ..Default::default()
        };
        assert!(!engine.authorize("/hooks/x", "POST", &bad).allowed);
        assert!(
            !engine
                .authorize("/hooks/x", "POST", &RequestAttributes::default())
                .allowed
        );
    }

    #[test]
    fn test_api_key_or_gateway_origin() {
        let engine = engine(vec![rule(
            "/mixed",
            RoutePolicy::RequireApiKeyOrGatewayOrigin,
        )]);
        let by_key = RequestAttributes {
            api_key: Some("shared-secret".to_string()),
            ..Default::default()
        };
        let by_origin = RequestAttributes {
            gateway_origin: true,
            ..Default::default()
        };
        assert!(engine.authorize("/mixed", "GET", &by_key).allowed);
        assert!(engine.authorize("/mixed", "GET", &by_origin).allowed);
        assert!(
            !engine
                .authorize("/mixed", "GET", &RequestAttributes::default())
                .allowed
        );
    }

    #[test]
    fn test_unset_secret_never_matches() {
        let engine = PolicyEngine::new(vec![rule("/hooks", RoutePolicy::RequireApiKey)], None);
        let attrs = RequestAttributes {
            api_key: Some(String::new()),
            ..Default::default()
        };
        assert!(!engine.authorize("/hooks", "POST", &attrs).allowed);

        // Empty configured secret is treated as unset, not as match-empty.
        let engine = PolicyEngine::new(
            vec![rule("/hooks", RoutePolicy::RequireApiKey)],
            Some(String::new()),
        );
        assert!(!engine.authorize("/hooks", "POST", &attrs).allowed);
    }

    #[test]
    fn test_longest_prefix_wins() {
        let engine = engine(vec![
            rule("/api", RoutePolicy::PublicAccess),
            rule(
                "/api/admin",
                RoutePolicy::RequireAllAuthorities {
                    authorities: authorities(&["ADMIN"]),
                },
            ),
        ]);
        // The more specific admin rule shadows the public one.
        assert!(
            !engine
                .authorize("/api/admin/users", "GET", &RequestAttributes::default())
                .allowed
        );
        assert!(
            engine
                .authorize("/api/items", "GET", &RequestAttributes::default())
                .allowed
        );
    }

    #[test]
    fn test_equal_length_tie_keeps_registration_order() {
        let engine = engine(vec![
            rule("/same", RoutePolicy::PublicAccess),
            rule("/same", RoutePolicy::RequireApiKey),
        ]);
        assert!(
            engine
                .authorize("/same", "GET", &RequestAttributes::default())
                .allowed
        );
    }

    #[test]
    fn test_method_restriction() {
        let engine = engine(vec![
            RouteRule {
                path: "/api/items".to_string(),
                method: Some("GET".to_string()),
                policy: RoutePolicy::PublicAccess,
                backend: None,
            },
            rule(
                "/api",
                RoutePolicy::RequireAllAuthorities {
                    authorities: authorities(&["USER"]),
                },
            ),
        ]);
        let anon = RequestAttributes::default();
        assert!(engine.authorize("/api/items", "get", &anon).allowed);
        // POST falls through to the broader authenticated rule.
        assert!(!engine.authorize("/api/items", "POST", &anon).allowed);
    }

    #[test]
    fn test_empty_requirement_is_vacuously_satisfied() {
        let engine = engine(vec![rule(
            "/open",
            RoutePolicy::RequireAllAuthorities {
                authorities: BTreeSet::new(),
            },
        )]);
        assert!(
            engine
                .authorize("/open", "GET", &RequestAttributes::default())
                .allowed
        );
    }

    #[test]
    fn test_rule_deserializes_from_tagged_config() {
        let rule: RouteRule = serde_json::from_value(serde_json::json!({
            "path": "/api/admin",
            "method": "POST",
            "policy": "require_all_authorities",
            "authorities": ["ADMIN", "SYSTEM"],
            "backend": "http://admin-service:8080"
        }))
        .unwrap();
        assert_eq!(rule.method.as_deref(), Some("POST"));
        assert_eq!(
            rule.policy,
            RoutePolicy::RequireAllAuthorities {
                authorities: authorities(&["ADMIN", "SYSTEM"]),
            }
        );
        assert_eq!(rule.backend.as_deref(), Some("http://admin-service:8080"));

        let rule: RouteRule = serde_json::from_value(serde_json::json!({
            "path": "/health",
            "policy": "public_access"
        }))
        .unwrap();
        assert_eq!(rule.policy, RoutePolicy::PublicAccess);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(constant_time_eq(b"", b""));
    }
}
