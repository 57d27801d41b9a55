//! Session configuration and its sources.
//!
//! Model parameters come from a remote, refreshable document. The defaults
//! below apply only before the first successful fetch; an empty API key after
//! a fetch is a configuration error, distinct from the fetch failing.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::core::errors::ConfigFetchError;

pub const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/chat-bison-001";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TOP_K: u32 = 40;
pub const DEFAULT_TOP_P: f64 = 0.95;

/// How long a fetched config stays fresh before the next remote round-trip.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Model parameters for one session. Opaque and immutable to the session
/// once loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    pub endpoint: String,
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub api_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            top_k: DEFAULT_TOP_K,
            top_p: DEFAULT_TOP_P,
            api_key: String::new(),
        }
    }
}

impl SessionConfig {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Source of session configuration.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn fetch(&self) -> Result<SessionConfig, ConfigFetchError>;
}

/// Remote parameter document. Field names match the published document keys;
/// absent fields fall back to the documented defaults.
#[derive(Deserialize)]
struct ParameterDocument {
    #[serde(default)]
    palm_api_key: String,
    #[serde(default = "default_endpoint")]
    api_endpoint: String,
    #[serde(default = "default_temperature")]
    temperature: f64,
    #[serde(default = "default_top_k")]
    top_k: u32,
    #[serde(default = "default_top_p")]
    top_p: f64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_top_k() -> u32 {
    DEFAULT_TOP_K
}

fn default_top_p() -> f64 {
    DEFAULT_TOP_P
}

impl ParameterDocument {
    fn into_config(self) -> Result<SessionConfig, ConfigFetchError> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ConfigFetchError::new(format!(
                "temperature {} out of range [0, 1]",
                self.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(ConfigFetchError::new(format!(
                "top_p {} out of range [0, 1]",
                self.top_p
            )));
        }
        Ok(SessionConfig {
            endpoint: self.api_endpoint,
            temperature: self.temperature,
            top_k: self.top_k,
            top_p: self.top_p,
            api_key: self.palm_api_key,
        })
    }
}

/// Fetches the parameter document over HTTP.
pub struct RemoteConfigSource {
    client: reqwest::Client,
    url: String,
}

impl RemoteConfigSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ConfigSource for RemoteConfigSource {
    async fn fetch(&self) -> Result<SessionConfig, ConfigFetchError> {
        let response = self
            .client
            .get(&self.url)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| ConfigFetchError::with_source("config request failed", e))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(ConfigFetchError::new(format!(
                "config request failed with status {status}"
            )));
        }

        let document = response
            .json::<ParameterDocument>()
            .await
            .map_err(|e| ConfigFetchError::with_source("invalid parameter document", e))?;

        debug!(url = %self.url, "fetched parameter document");
        document.into_config()
    }
}

struct CacheEntry {
    config: SessionConfig,
    fetched_at: Instant,
}

/// Caching decorator around any [`ConfigSource`]. Repeated fetches inside
/// the TTL window return the cached value with no remote round-trip.
pub struct CachedConfigSource<S> {
    inner: S,
    ttl: Duration,
    cached: Mutex<Option<CacheEntry>>,
}

impl<S: ConfigSource> CachedConfigSource<S> {
    pub fn new(inner: S) -> Self {
        Self::with_ttl(inner, DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cached: Mutex::new(None),
        }
    }
}

#[async_trait]
impl<S: ConfigSource> ConfigSource for CachedConfigSource<S> {
    async fn fetch(&self) -> Result<SessionConfig, ConfigFetchError> {
        let mut cached = self.cached.lock().await;
        if let Some(entry) = cached.as_ref() {
            if entry.fetched_at.elapsed() < self.ttl {
                debug!("returning cached session config");
                return Ok(entry.config.clone());
            }
        }

        // Holding the lock across the fetch keeps concurrent callers from
        // racing duplicate remote round-trips.
        let config = self.inner.fetch().await?;
        *cached = Some(CacheEntry {
            config: config.clone(),
            fetched_at: Instant::now(),
        });
        Ok(config)
    }
}
