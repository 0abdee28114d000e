//! Client identity resolution for rate limiting.
//!
//! Derives a stable per-request key from proxy headers, falling back to the
//! transport peer address. Best-effort by contract: this never fails and
//! never blocks a request.

/// Identity used when no header or peer address is available.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Resolve the rate-limiting identity for a request.
///
/// Priority order, first non-empty wins:
/// 1. first comma-separated value of `X-Forwarded-For`, trimmed
/// 2. `X-Real-IP`, trimmed
/// 3. the transport-level peer address
/// 4. the literal `"unknown"`
///
/// Always returns a non-empty string.
pub fn resolve_client_ip(
    forwarded_for: Option<&str>,
    real_ip: Option<&str>,
    peer_addr: Option<&str>,
) -> String {
    if let Some(forwarded) = forwarded_for {
        // Take the first hop in the chain: the original client.
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real) = real_ip {
        let real = real.trim();
        if !real.is_empty() {
            return real.to_string();
        }
    }

    if let Some(peer) = peer_addr {
        let peer = peer.trim();
        if !peer.is_empty() {
            return peer.to_string();
        }
    }

    UNKNOWN_CLIENT.to_string()
}
