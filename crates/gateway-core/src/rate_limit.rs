//! Per-client fixed-window rate limiting.
//!
//! Each client identity owns one `RateWindow` record in a concurrent map.
//! The window is fixed, not sliding: when it expires the counter resets to
//! zero. A client can therefore burst up to `2N` requests across a window
//! boundary (N at the end of one window, N at the start of the next). That
//! is a known characteristic of fixed-window limiting, accepted here in
//! exchange for O(1) state per client.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Rate limiter tuning knobs, deserializable straight from config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum requests per client per window.
    pub max_requests: u32,
    /// Window duration in seconds.
    pub window_secs: u64,
    /// Path fragments exempt from limiting (health probes, API docs,
    /// static assets). Substring match, checked before any counter lookup.
    pub exempt_paths: Vec<String>,
    /// Entries idle for this many windows are removed by [`RateLimiterState::evict_stale`].
    pub stale_after_windows: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 300,
            window_secs: 60,
            exempt_paths: vec![
                "/actuator/health".to_string(),
                "/v3/api-docs".to_string(),
                "/swagger-ui".to_string(),
                "/webjars".to_string(),
                "/favicon.ico".to_string(),
            ],
            stale_after_windows: 10,
        }
    }
}

impl RateLimitConfig {
    pub fn window_ms(&self) -> u64 {
        self.window_secs * 1000
    }
}

/// Outcome of a single `check_and_increment` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateDecision {
    /// Under quota; the counter was incremented as part of the check.
    Allowed { remaining: u32 },
    /// Over quota; nothing was forwarded downstream.
    Rejected { retry_after_secs: u64 },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Mutable per-client state: request count within the current window.
#[derive(Debug)]
struct RateWindow {
    count: u32,
    window_start_ms: u64,
}

/// Owned rate-limiter state, injected into the request path.
///
/// The client->window table supports concurrent insertion of first-seen
/// clients, and each entry is mutated under its own shard lock so unrelated
/// clients never contend. The reset-then-increment sequence is atomic with
/// respect to concurrent requests from the same client.
pub struct RateLimiterState {
    windows: DashMap<String, RateWindow>,
    config: RateLimitConfig,
}

impl RateLimiterState {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Whether the path bypasses the limiter entirely.
    pub fn is_exempt(&self, path: &str) -> bool {
        self.config
            .exempt_paths
            .iter()
            .any(|fragment| path.contains(fragment.as_str()))
    }

    /// Check the client's quota and, if allowed, count this request.
    ///
    /// The increment happens inside the same locked section as the check,
    /// so two concurrent requests can never both observe "under quota" and
    /// both slip past the limit. Once applied the increment is never rolled
    /// back, even if the request is later abandoned.
    pub fn check_and_increment(&self, client_id: &str, now_ms: u64) -> RateDecision {
        debug_assert!(!client_id.is_empty(), "resolver guarantees a non-empty id");

        let mut entry = self
            .windows
            .entry(client_id.to_string())
            .or_insert_with(|| RateWindow {
                count: 0,
                window_start_ms: now_ms,
            });
        let window = entry.value_mut();

        if now_ms.saturating_sub(window.window_start_ms) > self.config.window_ms() {
            window.count = 0;
            window.window_start_ms = now_ms;
        }

        if window.count < self.config.max_requests {
            window.count += 1;
            RateDecision::Allowed {
                remaining: self.config.max_requests - window.count,
            }
        } else {
            let elapsed = now_ms.saturating_sub(window.window_start_ms);
            let remaining_ms = self.config.window_ms().saturating_sub(elapsed);
            RateDecision::Rejected {
                retry_after_secs: remaining_ms.div_ceil(1000).max(1),
            }
        }
    }

    /// Remove entries whose window started more than
    /// `stale_after_windows * window` ago.
    ///
    /// The table otherwise grows with client churn; a periodic sweep keeps
    /// it bounded by the set of clients seen recently. Returns how many
    /// entries were dropped.
    pub fn evict_stale(&self, now_ms: u64) -> usize {
        let horizon = self.config.window_ms() * u64::from(self.config.stale_after_windows);
        let before = self.windows.len();
        self.windows
            .retain(|_, window| now_ms.saturating_sub(window.window_start_ms) <= horizon);
        before - self.windows.len()
    }

    /// Number of client identities currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

/// Milliseconds since the Unix epoch, the limiter's clock.
///
/// Kept as a free function so tests can drive `check_and_increment` with an
/// explicit clock instead.
pub fn epoch_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
