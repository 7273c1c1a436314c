//! # ETN Electroneum Library
//!
//! Chain access for Electroneum Smart Chain (EVM-compatible, native asset
//! ETN with 18 decimals).
//!
//! This library uses the [alloy](https://github.com/alloy-rs/alloy) framework
//! for local signing and broadcast. Reads go through the pooled JSON-RPC
//! transport in `etn-provider`.
//!
//! ## Quickstart Guide
//!
//! ### Reading balances and recent transactions
//!
//! ```no_run
//! # use etn_electroneum::prelude::*;
//! # use std::sync::Arc;
//! # async fn electroneum() -> std::result::Result<(), DashboardError> {
//! let client = Arc::new(ChainClient::new(NetworkConfig::mainnet())?);
//! let address = parse_address("0xFf7FD50BF684eb853787179cc9c784b55Ac68699")?;
//!
//! let balance = client.get_balance(address).await?;
//! println!("balance: {balance} ETN");
//!
//! let scanner = TransactionScanner::new(client.clone());
//! let records = scanner.scan(address, DEFAULT_SCAN_LIMIT, &CancellationToken::new()).await?;
//! println!("{} recent transactions", records.len());
//! # Ok(())
//! # }
//! ```
//!
//! ### Sending ETN
//!
//! A [`ChainClient`] sends through an attached signer, taken from a
//! [`WalletProvider`](etn_traits::WalletProvider) after it connects:
//!
//! ```no_run
//! # use etn_electroneum::prelude::*;
//! # async fn electroneum() -> std::result::Result<(), DashboardError> {
//! let network = NetworkConfig::testnet();
//! let wallet = LocalKeyProvider::from_private_key("0x...", &network.rpc_endpoints[0], network.chain_id)?;
//! wallet.connect().await?;
//!
//! let mut client = ChainClient::new(network)?;
//! if let Some(signer) = wallet.signer() {
//!     client.attach_signer(signer);
//! }
//! let hash = client.send_transaction("0x3cDB3d9e1B74692Bb1E3bb5fc81938151cA64b02", "2.5").await?;
//! println!("submitted {hash}");
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

mod client;
pub use client::ChainClient;
pub mod config;
pub use config::{NetworkConfig, ELECTRONEUM_MAINNET_CHAIN_ID, ELECTRONEUM_TESTNET_CHAIN_ID};
pub mod provider;
pub use provider::{LocalKeyProvider, RpcWalletProvider};
mod rpc_types;
pub mod scanner;
pub use scanner::{TransactionScanner, DEFAULT_SCAN_LIMIT, MAX_SCAN_LIMIT};
mod transfer;
pub use transfer::send_native;

pub use alloy;
pub mod prelude;

/// Re-export etn-traits for convenience
pub use etn_traits;
