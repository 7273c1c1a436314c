//! # ETN Provider
//!
//! HTTP and JSON-RPC transport for the ETN wallet dashboard. It handles
//! connection reuse, per-endpoint failure counting and failover to fallback
//! endpoints.
//!
//! ## Features
//!
//! - Pooled `reqwest` client with connect and request timeouts
//! - JSON-RPC 2.0 envelope with node error passthrough
//! - Multiple endpoint support with failover
//! - Optional request rate limiting
//!
//! ## Example
//!
//! ```ignore
//! use etn_provider::{HttpProvider, presets};
//!
//! let provider = HttpProvider::new(presets::electroneum_mainnet())?;
//! let height: String = provider.rpc_call("eth_blockNumber", ()).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use url::Url;

/// Provider-related errors
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timeout
    #[error("Request timeout after {0}s")]
    Timeout(u64),

    /// Non-success HTTP status
    #[error("HTTP status {status}: {body}")]
    HttpStatus {
        /// Status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// RPC error response
    #[error("RPC error: code={code}, message={message}")]
    RpcError {
        /// Error code
        code: i64,
        /// Error message
        message: String,
    },
}

impl ProviderError {
    /// True when the endpoint itself failed (unreachable, timed out, bad
    /// status or undecodable body) rather than answering with a JSON-RPC
    /// error.
    pub fn is_endpoint_failure(&self) -> bool {
        !matches!(self, ProviderError::RpcError { .. } | ProviderError::InvalidUrl(_))
    }

    /// The JSON-RPC error code, when the node answered with one
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            ProviderError::RpcError { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;

const ERROR_BODY_LIMIT: usize = 256;

/// Configuration for a provider endpoint
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Primary RPC URL
    pub url: String,
    /// Fallback URLs
    pub fallback_urls: Vec<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Rate limit applied to this provider's calls; `None` disables it
    pub rate_limit: Option<RateLimitConfig>,
}

impl ProviderConfig {
    /// Creates a new provider configuration with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            fallback_urls: Vec::new(),
            timeout_secs: 30,
            rate_limit: Some(RateLimitConfig::default()),
        }
    }

    /// Adds a fallback URL
    pub fn with_fallback(mut self, url: impl Into<String>) -> Self {
        self.fallback_urls.push(url.into());
        self
    }

    /// Sets the request timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Sets or clears the rate limit
    pub fn with_rate_limit(mut self, rate_limit: Option<RateLimitConfig>) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.url).map_err(|e| ProviderError::InvalidUrl(format!("{}: {e}", self.url)))?;
        for url in &self.fallback_urls {
            Url::parse(url).map_err(|e| ProviderError::InvalidUrl(format!("{url}: {e}")))?;
        }
        Ok(())
    }

    /// Returns all URLs (primary + fallbacks)
    pub fn all_urls(&self) -> Vec<&str> {
        let mut urls = vec![self.url.as_str()];
        urls.extend(self.fallback_urls.iter().map(|s| s.as_str()));
        urls
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new("http://localhost:8545")
    }
}

/// Request counters for one endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointStats {
    /// The endpoint URL
    pub url: String,
    /// Calls sent to this endpoint
    pub requests: u64,
    /// Calls that did not get a JSON-RPC answer
    pub failures: u64,
    /// Failures since the last answered call
    pub consecutive_failures: u32,
    /// Round trip of the last answered call
    pub last_latency_ms: Option<u64>,
}

impl EndpointStats {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            requests: 0,
            failures: 0,
            consecutive_failures: 0,
            last_latency_ms: None,
        }
    }
}

#[derive(Debug)]
struct EndpointState {
    endpoints: Vec<EndpointStats>,
    active: usize,
}

impl EndpointState {
    fn position(&self, url: &str) -> Option<usize> {
        self.endpoints.iter().position(|e| e.url == url)
    }
}

/// The primary and fallback endpoints of a provider and which one is in use.
///
/// Outcomes are recorded against the URL that was actually called, so a
/// call that started before a failover cannot move the active endpoint back.
#[derive(Debug)]
pub struct EndpointSet {
    state: RwLock<EndpointState>,
}

impl EndpointSet {
    /// Endpoints from `config`, starting on the primary
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;
        let endpoints = config.all_urls().into_iter().map(EndpointStats::new).collect();
        Ok(Self {
            state: RwLock::new(EndpointState { endpoints, active: 0 }),
        })
    }

    /// The endpoint calls should go to
    pub async fn active_url(&self) -> String {
        let state = self.state.read().await;
        state.endpoints[state.active].url.clone()
    }

    /// Records an answered call
    pub async fn mark_answered(&self, url: &str, latency: Duration) {
        let mut state = self.state.write().await;
        if let Some(idx) = state.position(url) {
            let endpoint = &mut state.endpoints[idx];
            endpoint.requests += 1;
            endpoint.consecutive_failures = 0;
            endpoint.last_latency_ms = Some(u64::try_from(latency.as_millis()).unwrap_or(u64::MAX));
        }
    }

    /// Records a failed call on `url`. When `url` is the active endpoint the
    /// set moves to the fallback with the fewest consecutive failures,
    /// scanning forward from the failed one. Returns the new active URL if
    /// it changed.
    pub async fn mark_failed(&self, url: &str) -> Option<String> {
        let mut state = self.state.write().await;
        let failed = state.position(url)?;
        {
            let endpoint = &mut state.endpoints[failed];
            endpoint.requests += 1;
            endpoint.failures += 1;
            endpoint.consecutive_failures += 1;
        }
        if failed != state.active {
            return None;
        }

        let count = state.endpoints.len();
        let next = (1..count)
            .map(|step| (failed + step) % count)
            .min_by_key(|&idx| state.endpoints[idx].consecutive_failures)?;
        state.active = next;
        tracing::info!(
            from = %state.endpoints[failed].url,
            to = %state.endpoints[next].url,
            "Switched RPC endpoint"
        );
        Some(state.endpoints[next].url.clone())
    }

    /// Copy of the per-endpoint counters
    pub async fn stats(&self) -> Vec<EndpointStats> {
        self.state.read().await.endpoints.clone()
    }
}

// ============================================================================
// HTTP Client with Connection Pooling
// ============================================================================

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,
    /// Idle connection timeout
    pub pool_idle_timeout_secs: u64,
    /// Connection timeout
    pub connect_timeout_secs: u64,
    /// Request timeout
    pub request_timeout_secs: u64,
    /// User agent string
    pub user_agent: String,
    /// Enable gzip compression
    pub gzip: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: 10,
            pool_idle_timeout_secs: 90,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            user_agent: format!("etn-dashboard/{}", env!("CARGO_PKG_VERSION")),
            gzip: true,
        }
    }
}

/// Rate limiter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests per second
    pub requests_per_second: u32,
    /// Burst size (max requests in a burst)
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10,
            burst_size: 20,
        }
    }
}

/// RPC request payload
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest<T: Serialize> {
    /// JSON-RPC version
    pub jsonrpc: &'static str,
    /// Method name
    pub method: String,
    /// Parameters
    pub params: T,
    /// Request ID
    pub id: u64,
}

impl<T: Serialize> JsonRpcRequest<T> {
    /// Creates a new JSON-RPC request
    pub fn new(method: impl Into<String>, params: T, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
            id,
        }
    }
}

/// RPC response payload
#[derive(Debug, Clone, serde::Deserialize)]
pub struct JsonRpcResponse<T> {
    /// JSON-RPC version
    #[serde(default)]
    pub jsonrpc: String,
    /// Response ID
    #[serde(default)]
    pub id: serde_json::Value,
    /// Result (if successful)
    pub result: Option<T>,
    /// Error (if failed)
    pub error: Option<JsonRpcError>,
}

/// RPC error
#[derive(Debug, Clone, serde::Deserialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i64,
    /// Error message
    pub message: String,
    /// Additional data
    pub data: Option<serde_json::Value>,
}

/// HTTP client with connection pooling and rate limiting
pub struct RpcClient {
    client: Client,
    rate_limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    request_id: AtomicU64,
    timeout_secs: u64,
}

impl RpcClient {
    /// Creates a new RPC client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default(), None)
    }

    /// Creates a new RPC client with custom configuration
    pub fn with_config(
        http_config: HttpClientConfig,
        rate_limit: Option<RateLimitConfig>,
    ) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(http_config.pool_max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(http_config.pool_idle_timeout_secs))
            .connect_timeout(Duration::from_secs(http_config.connect_timeout_secs))
            .timeout(Duration::from_secs(http_config.request_timeout_secs))
            .user_agent(&http_config.user_agent)
            .gzip(http_config.gzip)
            .build()
            .map_err(|e: reqwest::Error| ProviderError::ConnectionFailed(e.to_string()))?;

        let rate_limiter = rate_limit.map(|config| {
            let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
            let burst = NonZeroU32::new(config.burst_size).unwrap_or(per_second);
            RateLimiter::direct(Quota::per_second(per_second).allow_burst(burst))
        });

        Ok(Self {
            client,
            rate_limiter,
            request_id: AtomicU64::new(1),
            timeout_secs: http_config.request_timeout_secs,
        })
    }

    async fn throttle(&self) {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout_secs)
        } else if err.is_connect() {
            ProviderError::ConnectionFailed(err.to_string())
        } else {
            ProviderError::Http(err)
        }
    }

    async fn send_checked(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            truncate_on_char_boundary(&mut body, ERROR_BODY_LIMIT);
            return Err(ProviderError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Makes a JSON-RPC request whose result may legitimately be `null`
    /// (e.g. `eth_getBlockByNumber` for an unknown block).
    pub async fn rpc_call_optional<P, R>(&self, url: &str, method: &str, params: P) -> Result<Option<R>>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        self.throttle().await;

        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest::new(method, params, id);
        tracing::debug!(method, id, url, "json-rpc request");

        let response = self.send_checked(self.client.post(url).json(&request)).await?;
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        let rpc_response: JsonRpcResponse<R> = serde_json::from_slice(&bytes)?;

        if let Some(error) = rpc_response.error {
            return Err(ProviderError::RpcError {
                code: error.code,
                message: error.message,
            });
        }

        Ok(rpc_response.result)
    }

    /// Makes a JSON-RPC request
    pub async fn rpc_call<P, R>(&self, url: &str, method: &str, params: P) -> Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        self.rpc_call_optional(url, method, params)
            .await?
            .ok_or_else(|| ProviderError::RpcError {
                code: -1,
                message: "No result in response".to_string(),
            })
    }

    /// Makes a GET request and decodes the JSON body; non-2xx statuses are
    /// errors
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.throttle().await;
        tracing::debug!(url, "http get");

        let response = self.send_checked(self.client.get(url)).await?;
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

}

/// Cuts `text` to at most `limit` bytes without splitting a character.
fn truncate_on_char_boundary(text: &mut String, limit: usize) {
    if text.len() <= limit {
        return;
    }
    let cut = (0..=limit).rev().find(|&i| text.is_char_boundary(i)).unwrap_or(0);
    text.truncate(cut);
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("requests", &(self.request_id.load(Ordering::SeqCst) - 1))
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

// ============================================================================
// Provider with HTTP Client
// ============================================================================

/// A JSON-RPC provider with failover across its configured endpoints
#[derive(Debug)]
pub struct HttpProvider {
    endpoints: EndpointSet,
    client: RpcClient,
}

impl HttpProvider {
    /// Creates a new HTTP provider
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let endpoints = EndpointSet::new(&config)?;
        let http_config = HttpClientConfig {
            request_timeout_secs: config.timeout_secs,
            ..Default::default()
        };
        let client = RpcClient::with_config(http_config, config.rate_limit)?;
        Ok(Self { endpoints, client })
    }

    /// Makes an RPC call. A missing (`null`) result is an error.
    pub async fn rpc_call<P, R>(&self, method: &str, params: P) -> Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        self.rpc_call_optional(method, params)
            .await?
            .ok_or_else(|| ProviderError::RpcError {
                code: -1,
                message: format!("{method} returned null"),
            })
    }

    /// Makes an RPC call where `null` is a valid answer (`Ok(None)`).
    ///
    /// Calls are never repeated. When the active endpoint fails the error is
    /// returned and later calls go to the next endpoint. Node errors leave
    /// the active endpoint alone.
    pub async fn rpc_call_optional<P, R>(&self, method: &str, params: P) -> Result<Option<R>>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let url = self.endpoints.active_url().await;
        let started = Instant::now();
        let result = self.client.rpc_call_optional(&url, method, params).await;

        match &result {
            Err(e) if e.is_endpoint_failure() => {
                if let Some(next) = self.endpoints.mark_failed(&url).await {
                    tracing::warn!(method, failed = %url, error = %e, "Next calls go to {next}");
                }
            }
            _ => self.endpoints.mark_answered(&url, started.elapsed()).await,
        }
        result
    }

    /// Returns the endpoint currently in use
    pub async fn current_url(&self) -> String {
        self.endpoints.active_url().await
    }

    /// Returns per-endpoint counters
    pub async fn stats(&self) -> Vec<EndpointStats> {
        self.endpoints.stats().await
    }

    /// Returns the underlying RPC client
    pub fn client(&self) -> &RpcClient {
        &self.client
    }
}

/// Provider presets for Electroneum networks
pub mod presets {
    use super::ProviderConfig;

    /// Electroneum Smart Chain mainnet
    pub fn electroneum_mainnet() -> ProviderConfig {
        ProviderConfig::new("https://rpc.ankr.com/electroneum")
            .with_fallback("https://rpc.electroneum.com")
            .with_timeout(30)
    }

    /// Electroneum Smart Chain testnet
    pub fn electroneum_testnet() -> ProviderConfig {
        ProviderConfig::new("https://rpc.ankr.com/electroneum_testnet")
            .with_fallback("https://testnet-rpc.electroneum.com")
            .with_timeout(30)
    }

    /// A local development node
    pub fn local_node() -> ProviderConfig {
        ProviderConfig::new("http://localhost:8545")
            .with_timeout(10)
            .with_rate_limit(None)
    }
}
