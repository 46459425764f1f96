// src/upstream.rs
//! Upstream EmailBison client: bearer-authenticated GET/POST JSON with a
//! short in-process TTL cache on GETs. No retries: callers decide whether
//! a failure means "feature unavailable" or "report unavailable".

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::counter;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::config::{AppConfig, UPSTREAM_CACHE_TTL_SECS};

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("upstream returned HTTP {status}")]
    Status { status: StatusCode },
    #[error("upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream payload decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The transport seam the report composer talks through. Production uses
/// [`UpstreamClient`]; tests substitute canned fixtures.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn fetch_json(&self, path: &str) -> Result<Value, RequestError>;
    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, RequestError>;
}

struct CacheEntry {
    stored_at: Instant,
    value: Value,
}

pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    cache_ttl: Duration,
    cache: Mutex<HashMap<String, CacheEntry>>,
}

impl UpstreamClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_url.clone(),
            token: config.api_token.clone(),
            cache_ttl: Duration::from_secs(UPSTREAM_CACHE_TTL_SECS),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn cache_get(&self, path: &str) -> Option<Value> {
        let cache = self.cache.lock().expect("cache lock poisoned");
        cache
            .get(path)
            .filter(|e| e.stored_at.elapsed() <= self.cache_ttl)
            .map(|e| e.value.clone())
    }

    fn cache_put(&self, path: &str, value: &Value) {
        let mut cache = self.cache.lock().expect("cache lock poisoned");
        cache.insert(
            path.to_string(),
            CacheEntry {
                stored_at: Instant::now(),
                value: value.clone(),
            },
        );
    }

    async fn read_json(&self, resp: reqwest::Response) -> Result<Value, RequestError> {
        let status = resp.status();
        if !status.is_success() {
            counter!("upstream_errors_total").increment(1);
            return Err(RequestError::Status { status });
        }
        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl Upstream for UpstreamClient {
    async fn fetch_json(&self, path: &str) -> Result<Value, RequestError> {
        if let Some(hit) = self.cache_get(path) {
            counter!("upstream_cache_hits_total").increment(1);
            debug!(path, "upstream cache hit");
            return Ok(hit);
        }

        counter!("upstream_requests_total").increment(1);
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .send()
            .await?;
        let value = self.read_json(resp).await?;
        self.cache_put(path, &value);
        Ok(value)
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, RequestError> {
        counter!("upstream_requests_total").increment(1);
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;
        self.read_json(resp).await
    }
}
