//! Gateway configuration: TOML file plus `GATEWAY_`-prefixed environment
//! overrides (`GATEWAY_SERVER__PORT=9090` overrides `[server] port`).

use gateway_core::{RateLimitConfig, RouteRule};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub rate_limit: RateLimitConfig,
    pub auth: AuthSettings,
    pub proxy: ProxySettings,
    /// Ordered route table; first-registered wins on equal-length prefixes.
    pub routes: Vec<RouteRule>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            rate_limit: RateLimitConfig::default(),
            auth: AuthSettings::default(),
            proxy: ProxySettings::default(),
            routes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Shared secret matched by `require_api_key` policies. Unset or empty
    /// means those policies never allow.
    pub api_key_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Load from `$GATEWAY_CONFIG` (default `gateway.toml` next to the
    /// binary), then apply environment overrides. A missing file is fine;
    /// defaults deny everything until routes are configured.
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var("GATEWAY_CONFIG").unwrap_or_else(|_| "gateway".to_string());
        config::Config::builder()
            .add_source(config::File::with_name(&path).required(false))
            .add_source(config::Environment::with_prefix("GATEWAY").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// How often the stale-window sweep runs.
    pub fn eviction_period(&self) -> Duration {
        Duration::from_secs(self.rate_limit.window_secs.max(1) * 5)
    }
}
