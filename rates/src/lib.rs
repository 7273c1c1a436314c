//! # ETN Rates
//!
//! Loads the ETN price history series shown on the dashboard chart.
//!
//! The endpoint answers a plain `GET` with a JSON array of
//! `{"date": "...", "price": n}` objects. Each [`PriceHistoryFetcher::fetch`]
//! is a single request: nothing is cached, retried or rate limited.
#![forbid(unsafe_code)]

use async_trait::async_trait;
use etn_error::{DashboardError, Result};
use etn_provider::{HttpClientConfig, RpcClient};
use etn_traits::{PricePoint, PriceSource};
use url::Url;

/// Price history endpoint used when none is configured.
pub const DEFAULT_PRICE_HISTORY_URL: &str = "https://api.example.com/price-history";

/// Fetches the price history series from an HTTP endpoint.
#[derive(Debug)]
pub struct PriceHistoryFetcher {
    url: Url,
    client: RpcClient,
}

impl PriceHistoryFetcher {
    /// Fetcher for `url` with the default 30 second timeout
    pub fn new(url: &str) -> Result<Self> {
        Self::with_timeout(url, HttpClientConfig::default().request_timeout_secs)
    }

    /// Fetcher for `url` that gives up after `timeout_secs`
    pub fn with_timeout(url: &str, timeout_secs: u64) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| DashboardError::ConfigError(format!("invalid price history URL '{url}': {e}")))?;
        let http_config = HttpClientConfig {
            request_timeout_secs: timeout_secs,
            ..Default::default()
        };
        let client = RpcClient::with_config(http_config, None)
            .map_err(|e| DashboardError::ConfigError(e.to_string()))?;
        Ok(Self { url, client })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Loads the full series. Non-2xx statuses, transport failures and
    /// malformed bodies all fail with
    /// [`DashboardError::PriceHistoryUnavailable`].
    pub async fn fetch(&self) -> Result<Vec<PricePoint>> {
        let points: Vec<PricePoint> = self.client.get(self.url.as_str()).await.map_err(|e| {
            tracing::warn!(url = %self.url, error = %e, "Price history request failed");
            DashboardError::PriceHistoryUnavailable(e.to_string())
        })?;
        tracing::debug!(url = %self.url, points = points.len(), "Loaded price history");
        Ok(points)
    }
}

#[async_trait]
impl PriceSource for PriceHistoryFetcher {
    async fn price_history(&self) -> Result<Vec<PricePoint>> {
        self.fetch().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_url() {
        assert!(matches!(
            PriceHistoryFetcher::new("not a url"),
            Err(DashboardError::ConfigError(_))
        ));
    }

    #[test]
    fn test_default_url_parses() {
        let fetcher = PriceHistoryFetcher::new(DEFAULT_PRICE_HISTORY_URL).unwrap();
        assert_eq!(fetcher.url(), DEFAULT_PRICE_HISTORY_URL);
    }
}
