use crate::config::NetworkConfig;
use crate::rpc_types::{block_tag, CallRequest, RpcBlock};
use crate::transfer::send_native;

use alloy::primitives::{Address, U256, U64};
use async_trait::async_trait;
use etn_error::{DashboardError, Result};
use etn_provider::{HttpProvider, ProviderConfig, ProviderError};
use etn_traits::{Amount, ChainBlock, ChainReader, TransactionSigner, TransferRequest, TxHash};
use std::sync::Arc;

const NO_PARAMS: [(); 0] = [];

pub(crate) fn rpc_error(method: &str, err: ProviderError) -> DashboardError {
    DashboardError::RpcError {
        method: method.to_string(),
        reason: err.to_string(),
    }
}

/// JSON-RPC client for an Electroneum node.
///
/// Reads go straight to the node; sending goes through whichever
/// [`TransactionSigner`] is attached.
pub struct ChainClient {
    provider: HttpProvider,
    network: NetworkConfig,
    signer: Option<Arc<dyn TransactionSigner>>,
}

impl ChainClient {
    /// Client for `network`, using its endpoint list
    pub fn new(network: NetworkConfig) -> Result<Self> {
        let config = network.provider_config();
        Self::with_provider_config(network, config)
    }

    /// Client for `network` with explicit transport settings
    pub fn with_provider_config(network: NetworkConfig, config: ProviderConfig) -> Result<Self> {
        let provider = HttpProvider::new(config)
            .map_err(|e| DashboardError::ConfigError(format!("RPC provider: {e}")))?;
        Ok(Self {
            provider,
            network,
            signer: None,
        })
    }

    /// Attaches the signer used by [`ChainClient::send_transaction`]
    pub fn attach_signer(&mut self, signer: Arc<dyn TransactionSigner>) {
        self.signer = Some(signer);
    }

    /// The attached signer, if any
    pub fn signer(&self) -> Option<&Arc<dyn TransactionSigner>> {
        self.signer.as_ref()
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// The endpoint currently in use
    pub async fn current_url(&self) -> String {
        self.provider.current_url().await
    }

    /// Returns the balance of `address` at the latest block.
    pub async fn get_balance(&self, address: Address) -> Result<Amount> {
        let method = "eth_getBalance";
        let wei: U256 = self
            .provider
            .rpc_call(method, (address, "latest"))
            .await
            .map_err(|e| rpc_error(method, e))?;
        Ok(Amount::from_base_units(wei, self.network.decimals))
    }

    /// Returns the chain id reported by the node.
    pub async fn chain_id(&self) -> Result<u64> {
        let method = "eth_chainId";
        let id: U64 = self
            .provider
            .rpc_call(method, NO_PARAMS)
            .await
            .map_err(|e| rpc_error(method, e))?;
        Ok(id.to::<u64>())
    }

    /// Returns the current gas price in base units.
    pub async fn gas_price(&self) -> Result<Amount> {
        let method = "eth_gasPrice";
        let price: U256 = self
            .provider
            .rpc_call(method, NO_PARAMS)
            .await
            .map_err(|e| rpc_error(method, e))?;
        Ok(Amount::from_base_units(price, self.network.decimals))
    }

    /// Sends `amount` (display units, e.g. `"2.5"`) of the native asset to
    /// `to` through the attached signer and returns the transaction hash.
    pub async fn send_transaction(&self, to: &str, amount: &str) -> Result<TxHash> {
        send_native(self, self.signer.as_ref(), to, amount).await
    }
}

#[async_trait]
impl ChainReader for ChainClient {
    async fn balance(&self, address: Address) -> Result<Amount> {
        self.get_balance(address).await
    }

    async fn block_number(&self) -> Result<u64> {
        let method = "eth_blockNumber";
        let height: U64 = self
            .provider
            .rpc_call(method, NO_PARAMS)
            .await
            .map_err(|e| rpc_error(method, e))?;
        Ok(height.to::<u64>())
    }

    async fn block_with_transactions(&self, number: u64) -> Result<Option<ChainBlock>> {
        let method = "eth_getBlockByNumber";
        let block: Option<RpcBlock> = self
            .provider
            .rpc_call_optional(method, (block_tag(number), true))
            .await
            .map_err(|e| rpc_error(method, e))?;
        Ok(block.map(ChainBlock::from))
    }

    async fn estimate_gas(&self, from: Address, request: &TransferRequest) -> Result<u64> {
        let method = "eth_estimateGas";
        let call = CallRequest {
            from,
            to: request.to,
            value: request.value,
            gas: None,
            chain_id: None,
        };
        let gas: U64 = self
            .provider
            .rpc_call(method, [call])
            .await
            .map_err(|e| rpc_error(method, e))?;
        Ok(gas.to::<u64>())
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("network", &self.network.name)
            .field("chain_id", &self.network.chain_id)
            .field("has_signer", &self.signer.is_some())
            .finish()
    }
}
