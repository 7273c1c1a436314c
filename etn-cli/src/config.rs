//! Configuration

use etn_electroneum::{NetworkConfig, DEFAULT_SCAN_LIMIT, MAX_SCAN_LIMIT};
use etn_error::{DashboardError, Result};
use etn_provider::ProviderConfig;
use etn_rates::DEFAULT_PRICE_HISTORY_URL;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE: &str = "etn_dashboard.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub network: NetworkSection,
    #[serde(default)]
    pub wallet: WalletSection,
    pub price: PriceSection,
    #[serde(default)]
    pub scan: ScanSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSection {
    pub chain_id: u64,
    pub rpc_url: String,
    #[serde(default)]
    pub fallback_rpc_urls: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletSection {
    /// JSON-RPC wallet endpoint (`eth_requestAccounts` / `eth_sendTransaction`)
    #[serde(default)]
    pub rpc_url: Option<String>,
    /// Only ever read from the environment; never written to disk
    #[serde(skip)]
    pub private_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSection {
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSection {
    #[serde(default = "default_scan_limit")]
    pub limit: usize,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_scan_limit() -> usize {
    DEFAULT_SCAN_LIMIT
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SCAN_LIMIT,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let network = NetworkConfig::mainnet();
        let mut endpoints = network.rpc_endpoints.into_iter();
        Self {
            network: NetworkSection {
                chain_id: network.chain_id,
                rpc_url: endpoints.next().unwrap_or_default(),
                fallback_rpc_urls: endpoints.collect(),
                timeout_secs: default_timeout_secs(),
            },
            wallet: WalletSection::default(),
            price: PriceSection {
                url: DEFAULT_PRICE_HISTORY_URL.to_string(),
                timeout_secs: default_timeout_secs(),
            },
            scan: ScanSection::default(),
        }
    }
}

impl DashboardConfig {
    /// Reads `path` if it exists, otherwise starts from defaults. Environment
    /// overrides are applied on top either way.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| DashboardError::ConfigError(format!("{}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| DashboardError::ConfigError(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Applies `ETN_*` overrides. `lookup` is `std::env::var` outside tests.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("ETN_RPC_URL") {
            self.network.rpc_url = url;
            self.network.fallback_rpc_urls.clear();
        }
        if let Some(chain_id) = lookup("ETN_CHAIN_ID") {
            self.network.chain_id = chain_id
                .trim()
                .parse()
                .map_err(|_| DashboardError::ConfigError(format!("ETN_CHAIN_ID: '{chain_id}' is not a number")))?;
        }
        if let Some(url) = lookup("ETN_WALLET_URL") {
            self.wallet.rpc_url = Some(url);
        }
        if let Some(key) = lookup("ETN_PRIVATE_KEY") {
            self.wallet.private_key = Some(key);
        }
        if let Some(url) = lookup("ETN_PRICE_URL") {
            self.price.url = url;
        }
        if let Some(limit) = lookup("ETN_SCAN_LIMIT") {
            self.scan.limit = limit
                .trim()
                .parse()
                .map_err(|_| DashboardError::ConfigError(format!("ETN_SCAN_LIMIT: '{limit}' is not a number")))?;
        }
        self.scan.limit = self.scan.limit.min(MAX_SCAN_LIMIT);
        Ok(())
    }

    /// Network preset for the configured chain with the configured endpoints
    pub fn network(&self) -> NetworkConfig {
        let mut network =
            NetworkConfig::for_chain_id(self.network.chain_id).with_rpc_url(self.network.rpc_url.clone());
        network
            .rpc_endpoints
            .extend(self.network.fallback_rpc_urls.iter().cloned());
        network
    }

    pub fn provider_config(&self) -> ProviderConfig {
        self.network()
            .provider_config()
            .with_timeout(self.network.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.network.chain_id, 52014);
        assert_eq!(config.network.rpc_url, "https://rpc.ankr.com/electroneum");
        assert_eq!(config.scan.limit, 10);
        assert_eq!(config.price.url, DEFAULT_PRICE_HISTORY_URL);
        assert!(config.wallet.private_key.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = DashboardConfig::default();
        config
            .apply_env(env(&[
                ("ETN_RPC_URL", "http://localhost:8545"),
                ("ETN_CHAIN_ID", "5201420"),
                ("ETN_WALLET_URL", "http://127.0.0.1:1248"),
                ("ETN_PRICE_URL", "http://localhost:9000/prices"),
                ("ETN_SCAN_LIMIT", "50"),
            ]))
            .unwrap();

        assert_eq!(config.network.rpc_url, "http://localhost:8545");
        assert!(config.network.fallback_rpc_urls.is_empty());
        assert_eq!(config.network.chain_id, 5201420);
        assert_eq!(config.wallet.rpc_url.as_deref(), Some("http://127.0.0.1:1248"));
        assert_eq!(config.price.url, "http://localhost:9000/prices");
        assert_eq!(config.scan.limit, 50);
        assert_eq!(config.network().name, "Electroneum Smart Chain Testnet");
    }

    #[test]
    fn test_scan_limit_is_capped() {
        let mut config = DashboardConfig::default();
        config.apply_env(env(&[("ETN_SCAN_LIMIT", "100000")])).unwrap();
        assert_eq!(config.scan.limit, MAX_SCAN_LIMIT);
    }

    #[test]
    fn test_bad_numbers_are_config_errors() {
        let mut config = DashboardConfig::default();
        assert!(matches!(
            config.apply_env(env(&[("ETN_CHAIN_ID", "mainnet")])),
            Err(DashboardError::ConfigError(_))
        ));
    }

    #[test]
    fn test_save_never_writes_private_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut config = DashboardConfig::default();
        config.wallet.private_key = Some("0xsecret".to_string());
        config.save(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("0xsecret"));

        let loaded = DashboardConfig::load_file(&path).unwrap();
        assert_eq!(loaded.network, config.network);
        assert!(loaded.wallet.private_key.is_none());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = DashboardConfig::load_file(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, DashboardConfig::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            DashboardConfig::load_file(&path),
            Err(DashboardError::ConfigError(_))
        ));
    }

    #[test]
    fn test_provider_config_carries_timeout() {
        let mut config = DashboardConfig::default();
        config.network.timeout_secs = 5;
        let provider = config.provider_config();
        assert_eq!(provider.timeout_secs, 5);
        assert_eq!(provider.fallback_urls, config.network.fallback_rpc_urls);
    }
}
