//! This prelude module simplifies importing many useful items from the etn_electroneum crate using a glob import.
//!
//! To use this prelude, add the following to your code:
//! ```
//! use etn_electroneum::prelude::*;
//! ```

pub use crate::{
    send_native, ChainClient, LocalKeyProvider, NetworkConfig, RpcWalletProvider, TransactionScanner,
    DEFAULT_SCAN_LIMIT, MAX_SCAN_LIMIT,
};

pub use etn_traits::prelude::*;
pub use tokio_util::sync::CancellationToken;
