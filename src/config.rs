//! Provider configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{GateError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base of the REST API; the user record lives at `{api_base_url}/users/me`
    pub api_base_url: String,
    /// Scheme sent in the Authorization header
    pub token_type: String,
    /// Extra attempts after a server-class (5xx) failure
    pub max_retries: u32,
    pub retry_base_ms: u64,
    pub retry_cap_ms: u64,
    /// How long a cached user record may stand in while a fetch runs
    pub cache_ttl_secs: u64,
    pub cache_path: Option<PathBuf>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            api_base_url: "http://localhost:7000/api/v1".into(),
            token_type: "Bearer".into(),
            max_retries: 2,
            retry_base_ms: 1000,
            retry_cap_ms: 30_000,
            cache_ttl_secs: 300,
            cache_path: None,
        }
    }
}

impl ProviderConfig {
    /// Defaults overlaid with `CAPGATE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Defaults overlaid with whatever `get` returns for each `CAPGATE_*` key
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut c = ProviderConfig::default();
        if let Some(v) = get("CAPGATE_API_BASE_URL") { c.api_base_url = v; }
        if let Some(v) = get("CAPGATE_TOKEN_TYPE") { c.token_type = v; }
        if let Some(v) = get("CAPGATE_MAX_RETRIES") { c.max_retries = num("CAPGATE_MAX_RETRIES", &v)?; }
        if let Some(v) = get("CAPGATE_RETRY_BASE_MS") { c.retry_base_ms = num("CAPGATE_RETRY_BASE_MS", &v)?; }
        if let Some(v) = get("CAPGATE_RETRY_CAP_MS") { c.retry_cap_ms = num("CAPGATE_RETRY_CAP_MS", &v)?; }
        if let Some(v) = get("CAPGATE_CACHE_TTL_SECS") { c.cache_ttl_secs = num("CAPGATE_CACHE_TTL_SECS", &v)?; }
        if let Some(v) = get("CAPGATE_CACHE_PATH") { c.cache_path = Some(v.into()); }
        Ok(c)
    }

    /// Delay before retry number `attempt` (0-based): `min(base * 2^attempt, cap)`
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let ms = self.retry_base_ms.saturating_mul(1u64.checked_shl(attempt).unwrap_or(u64::MAX));
        Duration::from_millis(ms.min(self.retry_cap_ms))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

fn num<T: std::str::FromStr>(key: &str, v: &str) -> Result<T> {
    v.trim().parse().map_err(|_| GateError::Config(format!("{key}: not a number: {v:?}")))
}
