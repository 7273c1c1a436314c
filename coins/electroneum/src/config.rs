use etn_provider::ProviderConfig;
use etn_traits::{Network, ETN_DECIMALS, ETN_SYMBOL};
use serde::{Deserialize, Serialize};

/// Electroneum Smart Chain network configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub name: String,
    pub currency_symbol: String,
    pub decimals: u8,
    pub block_time_ms: u64,
    pub rpc_endpoints: Vec<String>,
    pub explorer: String,
}

// Chain IDs
pub const ELECTRONEUM_MAINNET_CHAIN_ID: u64 = 52014;
pub const ELECTRONEUM_TESTNET_CHAIN_ID: u64 = 5201420;

impl NetworkConfig {
    /// Electroneum Smart Chain mainnet configuration
    pub fn mainnet() -> Self {
        NetworkConfig {
            chain_id: ELECTRONEUM_MAINNET_CHAIN_ID,
            name: "Electroneum Smart Chain".to_string(),
            currency_symbol: ETN_SYMBOL.to_string(),
            decimals: ETN_DECIMALS,
            block_time_ms: 5000,
            rpc_endpoints: vec![
                "https://rpc.ankr.com/electroneum".to_string(),
                "https://rpc.electroneum.com".to_string(),
            ],
            explorer: "https://blockexplorer.electroneum.com".to_string(),
        }
    }

    /// Electroneum Smart Chain testnet configuration
    pub fn testnet() -> Self {
        NetworkConfig {
            chain_id: ELECTRONEUM_TESTNET_CHAIN_ID,
            name: "Electroneum Smart Chain Testnet".to_string(),
            currency_symbol: ETN_SYMBOL.to_string(),
            decimals: ETN_DECIMALS,
            block_time_ms: 5000,
            rpc_endpoints: vec![
                "https://rpc.ankr.com/electroneum_testnet".to_string(),
                "https://testnet-rpc.electroneum.com".to_string(),
            ],
            explorer: "https://testnet-blockexplorer.electroneum.com".to_string(),
        }
    }

    /// Preset for a known chain id; unknown ids get the mainnet preset with
    /// the id replaced
    pub fn for_chain_id(chain_id: u64) -> Self {
        match chain_id {
            ELECTRONEUM_TESTNET_CHAIN_ID => Self::testnet(),
            ELECTRONEUM_MAINNET_CHAIN_ID => Self::mainnet(),
            other => NetworkConfig {
                chain_id: other,
                name: format!("EVM chain {other}"),
                ..Self::mainnet()
            },
        }
    }

    /// Replaces the endpoint list with a single RPC URL
    pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_endpoints = vec![url.into()];
        self
    }

    /// Check if this is mainnet
    pub fn is_mainnet(&self) -> bool {
        self.chain_id == ELECTRONEUM_MAINNET_CHAIN_ID
    }

    /// Transport configuration: first endpoint is primary, the rest are
    /// fallbacks
    pub fn provider_config(&self) -> ProviderConfig {
        let mut endpoints = self.rpc_endpoints.iter();
        let primary = endpoints.next().cloned().unwrap_or_default();
        endpoints.fold(ProviderConfig::new(primary), |config, url| {
            config.with_fallback(url.clone())
        })
    }

    /// The generic network descriptor
    pub fn network(&self) -> Network {
        let network = if self.is_mainnet() {
            Network::mainnet(self.name.clone())
        } else {
            Network::testnet(self.name.clone())
        };
        network.with_chain_id(self.chain_id)
    }

    /// Explorer link for a transaction hash
    pub fn explorer_tx_url(&self, hash: &str) -> String {
        format!("{}/tx/{}", self.explorer.trim_end_matches('/'), hash)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}
