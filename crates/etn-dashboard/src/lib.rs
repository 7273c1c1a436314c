//! # ETN Dashboard
//!
//! View layer of the Electroneum wallet dashboard: connect a wallet, show
//! its balance, the recent transactions touching it with sent/received
//! totals, and a price history chart.
//!
//! The [`Dashboard`] is built from its collaborators rather than reaching
//! for shared globals:
//!
//! ```ignore
//! use etn_dashboard::Dashboard;
//! use etn_electroneum::prelude::*;
//! use etn_rates::PriceHistoryFetcher;
//! use std::sync::Arc;
//!
//! let network = NetworkConfig::mainnet();
//! let chain = Arc::new(ChainClient::new(network.clone())?);
//! let prices = Arc::new(PriceHistoryFetcher::new(etn_rates::DEFAULT_PRICE_HISTORY_URL)?);
//! let wallet = Arc::new(RpcWalletProvider::new("http://127.0.0.1:1248", network.chain_id)?);
//!
//! let dashboard = Dashboard::new(chain, prices, wallet);
//! let report = dashboard.connect().await?;
//! println!("{}", dashboard.render().await);
//! ```
//!
//! ## Refresh cycles
//!
//! A refresh fetches the three sections concurrently and applies each one
//! on its own: a failed section keeps its previous value. Every cycle takes
//! a sequence number and only the newest issued cycle may write. Switching
//! address or disconnecting cancels the running transaction scan.
#![forbid(unsafe_code)]

mod dashboard;
pub use dashboard::{Dashboard, RefreshReport, SectionOutcome};
pub mod render;
pub mod snapshot;
pub use snapshot::{total_received, total_sent, ViewState, WalletSnapshot};
