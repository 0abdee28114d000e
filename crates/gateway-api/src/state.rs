//! Shared application state.

use crate::settings::Settings;
use anyhow::Context;
use gateway_core::{PolicyEngine, RateLimiterState};
use std::sync::Arc;
use std::time::Duration;

/// Cloned per request; the rate-limiter table and policy table are shared.
#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<RateLimiterState>,
    pub engine: Arc<PolicyEngine>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(settings.proxy.connect_timeout_secs))
            .timeout(Duration::from_secs(settings.proxy.request_timeout_secs))
            .build()
            .context("building proxy HTTP client")?;

        Ok(Self {
            limiter: Arc::new(RateLimiterState::new(settings.rate_limit.clone())),
            engine: Arc::new(PolicyEngine::new(
                settings.routes.clone(),
                settings.auth.api_key_secret.clone(),
            )),
            http,
        })
    }
}
