use etn_error::{DashboardError, Result};
use etn_traits::{parse_address, Amount, ChainReader, TransactionSigner, TransferRequest, TxHash, ETN_DECIMALS};
use std::sync::Arc;

/// Sends a native-currency transfer.
///
/// `to` and `amount` are validated before any network call. The gas estimate
/// is informational only: it is logged and a failed estimate does not stop
/// the submission. Submission errors come back as
/// [`DashboardError::TransactionFailed`].
pub async fn send_native(
    reader: &dyn ChainReader,
    signer: Option<&Arc<dyn TransactionSigner>>,
    to: &str,
    amount: &str,
) -> Result<TxHash> {
    let to = parse_address(to)?;
    let value = Amount::parse(amount, ETN_DECIMALS)?;
    let signer = signer.ok_or(DashboardError::NoSigner)?;
    let from = signer.address();

    let request = TransferRequest {
        to,
        value: value.base_units(),
        gas_limit: None,
    };

    match reader.estimate_gas(from, &request).await {
        Ok(gas) => tracing::info!(%from, %to, gas, "Estimated gas for transfer"),
        Err(e) => tracing::warn!(%from, %to, error = %e, "Gas estimation failed, submitting anyway"),
    }

    let hash = signer.send_transaction(request).await.map_err(|e| match e {
        DashboardError::TransactionFailed(_) => e,
        other => DashboardError::TransactionFailed(other.to_string()),
    })?;

    tracing::info!(%from, %to, amount = %value.to_decimal_string(), %hash, "Transaction submitted");
    Ok(hash)
}
