//! Authentication context extracted from a validated bearer credential.
//!
//! The identity provider validates signature and expiry before the claims
//! reach this module; extraction here is lenient by contract. A malformed
//! optional claim degrades to an absent field, never to a failed request:
//! header forwarding must proceed even for tokens a downstream service may
//! still want to see as "unauthenticated".

use serde_json::Value;
use std::collections::BTreeSet;
use tracing::warn;

/// Immutable per-request identity derived from bearer-token claims.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    /// The principal's subject claim.
    pub subject: String,
    /// Display username, when the token carries one.
    pub username: Option<String>,
    /// Optional integer account claim, parsed leniently.
    pub account_id: Option<i64>,
    pub roles: BTreeSet<String>,
    pub permissions: BTreeSet<String>,
}

impl AuthContext {
    /// Build a context from a decoded claim set. Never fails.
    pub fn from_claims(claims: &Value) -> Self {
        let subject = claims
            .get("sub")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let username = ["username", "preferred_username"]
            .iter()
            .find_map(|key| claims.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .filter(|s| !s.is_empty());

        Self {
            subject,
            username,
            account_id: parse_account_id(claims.get("accountId")),
            roles: string_set(claims.get("roles"), "roles"),
            permissions: string_set(claims.get("permissions"), "permissions"),
        }
    }

    /// The full granted-authority set: roles and permissions blended.
    pub fn authorities(&self) -> BTreeSet<String> {
        self.roles.union(&self.permissions).cloned().collect()
    }
}

fn parse_account_id(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        other => {
            warn!(claim = "accountId", shape = ?other, "ignoring malformed claim");
            None
        }
    }
}

/// Normalize a claim that may be a list of strings or a single string.
fn string_set(value: Option<&Value>, claim: &str) -> BTreeSet<String> {
    match value {
        None | Some(Value::Null) => BTreeSet::new(),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                BTreeSet::new()
            } else {
                BTreeSet::from([s.to_string()])
            }
        }
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(other) => {
            warn!(claim, shape = ?other, "ignoring malformed claim");
            BTreeSet::new()
        }
    }
}
