use alloy::primitives::Address;
use chrono::DateTime;
use etn_error::{DashboardError, Result};
use etn_traits::{ChainReader, TransactionRecord};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Number of recent blocks scanned when nothing else is configured.
pub const DEFAULT_SCAN_LIMIT: usize = 10;

/// Upper bound on the number of blocks a single scan may fetch.
pub const MAX_SCAN_LIMIT: usize = 1000;

/// Finds transactions touching an address in the most recent blocks.
///
/// Blocks are fetched one at a time, newest first. The scan is bounded by
/// [`MAX_SCAN_LIMIT`] and can be cancelled between and during block fetches.
#[derive(Clone)]
pub struct TransactionScanner {
    reader: Arc<dyn ChainReader>,
}

impl TransactionScanner {
    pub fn new(reader: Arc<dyn ChainReader>) -> Self {
        Self { reader }
    }

    /// Scans blocks `h, h-1, ..., h-limit+1` (where `h` is the current height)
    /// and returns every transaction whose sender or recipient is `address`,
    /// in fetch order.
    ///
    /// Stops early at genesis. Any failed or missing block aborts the whole
    /// scan with [`DashboardError::ScanFailed`]; cancellation yields
    /// [`DashboardError::Cancelled`].
    pub async fn scan(
        &self,
        address: Address,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<TransactionRecord>> {
        let limit = limit.min(MAX_SCAN_LIMIT);

        let height = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(DashboardError::Cancelled),
            height = self.reader.block_number() => height?,
        };

        let mut records = Vec::new();
        for offset in 0..limit as u64 {
            let Some(number) = height.checked_sub(offset) else {
                break;
            };

            let block = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(%address, block = number, "Scan cancelled");
                    return Err(DashboardError::Cancelled);
                }
                block = self.reader.block_with_transactions(number) => block,
            };

            let block = match block {
                Ok(Some(block)) => block,
                Ok(None) => {
                    return Err(DashboardError::ScanFailed {
                        block: number,
                        reason: "block not found".to_string(),
                    })
                }
                Err(e) => {
                    return Err(DashboardError::ScanFailed {
                        block: number,
                        reason: e.to_string(),
                    })
                }
            };

            let date = format_block_time(block.timestamp);
            let before = records.len();
            records.extend(
                block
                    .transactions
                    .iter()
                    .filter(|tx| tx.from == address || tx.to == Some(address))
                    .map(|tx| TransactionRecord::from_chain(tx, block.number, date.clone())),
            );
            tracing::debug!(block = number, matched = records.len() - before, "Scanned block");
        }

        tracing::info!(%address, height, limit, found = records.len(), "Transaction scan complete");
        Ok(records)
    }
}

impl std::fmt::Debug for TransactionScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionScanner")
            .field("max_limit", &MAX_SCAN_LIMIT)
            .finish_non_exhaustive()
    }
}

/// Block timestamp as `YYYY-MM-DD HH:MM` (UTC).
pub fn format_block_time(timestamp: u64) -> Option<String> {
    let secs = i64::try_from(timestamp).ok()?;
    DateTime::from_timestamp(secs, 0).map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
}
