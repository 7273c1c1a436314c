//! Wire shapes of the node responses this crate reads.
//!
//! Only the fields the dashboard needs are declared; everything else in the
//! node's JSON is ignored.

use alloy::primitives::{Address, U256, U64};
use etn_traits::{ChainBlock, ChainTransaction, TxHash};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RpcBlock {
    pub number: U64,
    pub timestamp: U64,
    #[serde(default)]
    pub transactions: Vec<RpcTransaction>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RpcTransaction {
    pub hash: String,
    pub from: Address,
    #[serde(default)]
    pub to: Option<Address>,
    pub value: U256,
}

impl From<RpcBlock> for ChainBlock {
    fn from(block: RpcBlock) -> Self {
        ChainBlock {
            number: block.number.to::<u64>(),
            timestamp: block.timestamp.to::<u64>(),
            transactions: block
                .transactions
                .into_iter()
                .map(|tx| ChainTransaction {
                    hash: TxHash::new(tx.hash),
                    from: tx.from,
                    to: tx.to,
                    value: tx.value,
                })
                .collect(),
        }
    }
}

/// `eth_estimateGas` / `eth_sendTransaction` call object.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CallRequest {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<U64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<U64>,
}

/// Block tag for a height, as the node expects it (`0x`-prefixed hex).
pub(crate) fn block_tag(number: u64) -> String {
    format!("{number:#x}")
}
