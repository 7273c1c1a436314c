//! Wallet provider adapters.
//!
//! [`RpcWalletProvider`] talks to an EIP-1193 style wallet over JSON-RPC
//! (a desktop wallet or a dev node with unlocked accounts): the wallet owns
//! the keys and signs `eth_sendTransaction` itself.
//!
//! [`LocalKeyProvider`] holds a private key and signs locally with alloy,
//! broadcasting through the chain node.

use crate::client::rpc_error;
use crate::rpc_types::CallRequest;

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, U64};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use etn_error::{DashboardError, Result};
use etn_provider::{HttpProvider, ProviderConfig, ProviderError};
use etn_traits::{TransactionSigner, TransferRequest, TxHash, WalletProvider};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use url::Url;

/// EIP-1193 "user rejected request"
pub const USER_REJECTED_CODE: i64 = 4001;

/// Wallet prompts wait on a human.
const WALLET_TIMEOUT_SECS: u64 = 120;

// ============================================================================
// JSON-RPC wallet
// ============================================================================

/// A wallet reachable over JSON-RPC that grants accounts through
/// `eth_requestAccounts`.
pub struct RpcWalletProvider {
    wallet: Option<Arc<HttpProvider>>,
    chain_id: u64,
    account: Mutex<Option<Address>>,
}

impl RpcWalletProvider {
    /// Wallet at `url` for `chain_id`
    pub fn new(url: &str, chain_id: u64) -> Result<Self> {
        let config = ProviderConfig::new(url)
            .with_timeout(WALLET_TIMEOUT_SECS)
            .with_rate_limit(None);
        let wallet = HttpProvider::new(config)
            .map_err(|e| DashboardError::ConfigError(format!("wallet provider: {e}")))?;
        Ok(Self {
            wallet: Some(Arc::new(wallet)),
            chain_id,
            account: Mutex::new(None),
        })
    }

    /// A provider with no wallet behind it; every connect attempt fails
    /// with [`DashboardError::ProviderUnavailable`]
    pub fn unconfigured(chain_id: u64) -> Self {
        Self {
            wallet: None,
            chain_id,
            account: Mutex::new(None),
        }
    }

    /// The account granted by the last successful connect
    pub fn account(&self) -> Option<Address> {
        *self.account.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn map_connect_error(err: ProviderError) -> DashboardError {
        match err.rpc_code() {
            Some(USER_REJECTED_CODE) => DashboardError::UserRejected(err.to_string()),
            _ => DashboardError::ProviderUnavailable(err.to_string()),
        }
    }
}

#[async_trait]
impl WalletProvider for RpcWalletProvider {
    fn name(&self) -> &str {
        "json-rpc wallet"
    }

    async fn request_accounts(&self) -> Result<Vec<Address>> {
        let wallet = self.wallet.as_ref().ok_or_else(|| {
            DashboardError::ProviderUnavailable("no wallet provider configured".to_string())
        })?;

        let accounts: Vec<Address> = wallet
            .rpc_call("eth_requestAccounts", [(); 0])
            .await
            .map_err(Self::map_connect_error)?;

        let first = accounts.first().copied();
        *self.account.lock().unwrap_or_else(|e| e.into_inner()) = first;
        if let Some(address) = first {
            tracing::info!(%address, accounts = accounts.len(), "Wallet granted account access");
        }
        Ok(accounts)
    }

    fn signer(&self) -> Option<Arc<dyn TransactionSigner>> {
        let wallet = self.wallet.clone()?;
        let from = self.account()?;
        Some(Arc::new(RemoteSigner {
            wallet,
            from,
            chain_id: self.chain_id,
        }))
    }
}

impl std::fmt::Debug for RpcWalletProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcWalletProvider")
            .field("configured", &self.wallet.is_some())
            .field("chain_id", &self.chain_id)
            .field("account", &self.account())
            .finish()
    }
}

/// Signer that asks the wallet to sign and submit (`eth_sendTransaction`).
#[derive(Debug)]
pub struct RemoteSigner {
    wallet: Arc<HttpProvider>,
    from: Address,
    chain_id: u64,
}

#[async_trait]
impl TransactionSigner for RemoteSigner {
    fn address(&self) -> Address {
        self.from
    }

    async fn send_transaction(&self, request: TransferRequest) -> Result<TxHash> {
        let method = "eth_sendTransaction";
        let call = CallRequest {
            from: self.from,
            to: request.to,
            value: request.value,
            gas: request.gas_limit.map(U64::from),
            chain_id: Some(U64::from(self.chain_id)),
        };
        let hash: String = self
            .wallet
            .rpc_call(method, [call])
            .await
            .map_err(|e| match e.rpc_code() {
                Some(USER_REJECTED_CODE) => {
                    DashboardError::TransactionFailed("rejected in wallet".to_string())
                }
                _ => rpc_error(method, e),
            })?;
        Ok(TxHash::new(hash))
    }
}

// ============================================================================
// Local key
// ============================================================================

/// A wallet backed by a private key from configuration. Account access is
/// granted immediately.
#[derive(Debug)]
pub struct LocalKeyProvider {
    signer: Arc<LocalSigner>,
}

impl LocalKeyProvider {
    /// Loads a hex private key (with or without `0x`); transactions are
    /// broadcast through `rpc_url`
    pub fn from_private_key(private_key: &str, rpc_url: &str, chain_id: u64) -> Result<Self> {
        let key = PrivateKeySigner::from_str(private_key.trim())
            .map_err(|_| DashboardError::ConfigError("invalid private key".to_string()))?;
        let rpc_url = Url::parse(rpc_url)
            .map_err(|e| DashboardError::ConfigError(format!("invalid RPC URL '{rpc_url}': {e}")))?;
        Ok(Self {
            signer: Arc::new(LocalSigner {
                key,
                rpc_url,
                chain_id,
            }),
        })
    }

    /// The key's address
    pub fn address(&self) -> Address {
        self.signer.address()
    }
}

#[async_trait]
impl WalletProvider for LocalKeyProvider {
    fn name(&self) -> &str {
        "local key"
    }

    async fn request_accounts(&self) -> Result<Vec<Address>> {
        Ok(vec![self.signer.address()])
    }

    fn signer(&self) -> Option<Arc<dyn TransactionSigner>> {
        let signer: Arc<dyn TransactionSigner> = self.signer.clone();
        Some(signer)
    }
}

/// Signs locally and broadcasts with `eth_sendRawTransaction`.
pub struct LocalSigner {
    key: PrivateKeySigner,
    rpc_url: Url,
    chain_id: u64,
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.key.address())
            .field("rpc_url", &self.rpc_url.as_str())
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

#[async_trait]
impl TransactionSigner for LocalSigner {
    fn address(&self) -> Address {
        self.key.address()
    }

    async fn send_transaction(&self, request: TransferRequest) -> Result<TxHash> {
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(self.key.clone()))
            .connect_http(self.rpc_url.clone());

        let mut tx = TransactionRequest::default()
            .with_from(self.key.address())
            .with_to(request.to)
            .with_value(request.value)
            .with_chain_id(self.chain_id);
        if let Some(gas_limit) = request.gas_limit {
            tx = tx.with_gas_limit(gas_limit);
        }

        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(|e| DashboardError::TransactionFailed(e.to_string()))?;

        Ok(TxHash::new(pending.tx_hash().to_string()))
    }
}
