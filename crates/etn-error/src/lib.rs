//! # ETN Error
//!
//! Unified error type for the ETN wallet dashboard. Every library crate in the
//! workspace returns [`DashboardError`], so the view layer can decide per
//! section what to do with a failure without matching on transport details.
//!
//! ## Error Categories
//!
//! - wallet provider: [`DashboardError::ProviderUnavailable`], [`DashboardError::UserRejected`]
//! - chain reads: [`DashboardError::RpcError`], [`DashboardError::ScanFailed`]
//! - price data: [`DashboardError::PriceHistoryUnavailable`]
//! - submission: [`DashboardError::TransactionFailed`], [`DashboardError::NoSigner`]
//!
//! ## Example
//!
//! ```
//! use etn_error::{DashboardError, Result};
//!
//! fn validate_address(addr: &str) -> Result<()> {
//!     if addr.len() != 42 {
//!         return Err(DashboardError::InvalidAddress {
//!             address: addr.to_string(),
//!             reason: "expected 20 hex-encoded bytes".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use thiserror::Error;

/// The main error type for dashboard operations.
#[derive(Error, Debug)]
pub enum DashboardError {
    // ============ Wallet Provider Errors ============
    /// No wallet provider is configured or it could not be reached
    #[error("No wallet provider available: {0}")]
    ProviderUnavailable(String),

    /// The user (or the wallet on their behalf) refused account access
    #[error("Wallet connection rejected: {0}")]
    UserRejected(String),

    /// An operation needs a connected wallet
    #[error("Wallet not connected")]
    NotConnected,

    // ============ Chain Errors ============
    /// JSON-RPC call failed (transport or node error)
    #[error("RPC request failed: {method} - {reason}")]
    RpcError {
        /// RPC method name
        method: String,
        /// Error reason
        reason: String,
    },

    /// A block fetch failed during a transaction scan
    #[error("Transaction scan failed at block {block}: {reason}")]
    ScanFailed {
        /// Block number being fetched when the scan aborted
        block: u64,
        /// Error reason
        reason: String,
    },

    /// The operation was cancelled before it completed
    #[error("Operation cancelled")]
    Cancelled,

    // ============ Price Errors ============
    /// The price history endpoint failed or returned an unusable payload
    #[error("Unable to load price history: {0}")]
    PriceHistoryUnavailable(String),

    // ============ Transaction Errors ============
    /// Transaction submission failed (rejected, insufficient funds, ...)
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Sending requires a signer and none is attached
    #[error("No signer available")]
    NoSigner,

    // ============ Validation Errors ============
    /// Invalid address format or checksum
    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress {
        /// The invalid address
        address: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid amount format
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Amount overflow during calculation
    #[error("Amount overflow: {0}")]
    AmountOverflow(String),

    // ============ IO / Config Errors ============
    /// File IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // ============ Generic ============
    /// Unknown/other error
    #[error("{0}")]
    Other(String),
}

/// Convenient Result type using DashboardError
pub type Result<T> = std::result::Result<T, DashboardError>;

// ============ From implementations for common error types ============

impl From<std::io::Error> for DashboardError {
    fn from(err: std::io::Error) -> Self {
        DashboardError::IoError(err.to_string())
    }
}

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum ErrorCode {
    /// Unknown error
    Unknown = 0,
    /// Wallet provider missing or unreachable
    ProviderUnavailable = 1001,
    /// User rejected the connection request
    UserRejected = 1002,
    /// Wallet not connected
    NotConnected = 1003,
    /// Invalid address
    InvalidAddress = 2001,
    /// Invalid amount
    InvalidAmount = 2002,
    /// Amount overflow
    AmountOverflow = 2003,
    /// Transaction failed
    TransactionFailed = 3001,
    /// No signer attached
    NoSigner = 3002,
    /// RPC error
    RpcError = 4001,
    /// Scan failed
    ScanFailed = 4002,
    /// Price history unavailable
    PriceHistoryUnavailable = 4003,
    /// Cancelled
    Cancelled = 5001,
    /// Configuration error
    ConfigError = 9001,
}

impl DashboardError {
    /// Returns the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            DashboardError::ProviderUnavailable(_) => ErrorCode::ProviderUnavailable,
            DashboardError::UserRejected(_) => ErrorCode::UserRejected,
            DashboardError::NotConnected => ErrorCode::NotConnected,
            DashboardError::RpcError { .. } => ErrorCode::RpcError,
            DashboardError::ScanFailed { .. } => ErrorCode::ScanFailed,
            DashboardError::Cancelled => ErrorCode::Cancelled,
            DashboardError::PriceHistoryUnavailable(_) => ErrorCode::PriceHistoryUnavailable,
            DashboardError::TransactionFailed(_) => ErrorCode::TransactionFailed,
            DashboardError::NoSigner => ErrorCode::NoSigner,
            DashboardError::InvalidAddress { .. } => ErrorCode::InvalidAddress,
            DashboardError::InvalidAmount(_) => ErrorCode::InvalidAmount,
            DashboardError::AmountOverflow(_) => ErrorCode::AmountOverflow,
            DashboardError::ConfigError(_) => ErrorCode::ConfigError,
            _ => ErrorCode::Unknown,
        }
    }

    /// Returns true if trying again later could succeed.
    ///
    /// Nothing in the workspace retries on its own; this is for callers that
    /// want to offer a "try again" action.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DashboardError::RpcError { .. }
                | DashboardError::ScanFailed { .. }
                | DashboardError::PriceHistoryUnavailable(_)
                | DashboardError::ProviderUnavailable(_)
        )
    }

    /// Short message suitable for showing to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            DashboardError::ProviderUnavailable(_) => "No wallet provider found. Configure a wallet and try again.",
            DashboardError::UserRejected(_) => "Failed to connect wallet. Please try again.",
            DashboardError::NotConnected => "Connect your wallet first.",
            DashboardError::ScanFailed { .. } => "Failed to fetch transactions. Please try again.",
            DashboardError::PriceHistoryUnavailable(_) => "Unable to load price history. Please try again.",
            DashboardError::TransactionFailed(_) | DashboardError::NoSigner => {
                "Transaction failed. Please check your balance and try again."
            }
            DashboardError::InvalidAddress { .. } => "That address is not valid.",
            DashboardError::InvalidAmount(_) | DashboardError::AmountOverflow(_) => "That amount is not valid.",
            _ => "Something went wrong. Please try again.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DashboardError::InvalidAddress {
            address: "0x123".to_string(),
            reason: "Too short".to_string(),
        };
        assert!(err.to_string().contains("0x123"));
        assert!(err.to_string().contains("Too short"));
    }

    #[test]
    fn test_error_code() {
        let err = DashboardError::ScanFailed { block: 7, reason: "timeout".into() };
        assert_eq!(err.code(), ErrorCode::ScanFailed);
        assert_eq!(DashboardError::NoSigner.code(), ErrorCode::NoSigner);
        assert_eq!(DashboardError::Other("x".into()).code(), ErrorCode::Unknown);
    }

    #[test]
    fn test_retryable() {
        let rpc = DashboardError::RpcError {
            method: "eth_getBalance".into(),
            reason: "connection refused".into(),
        };
        assert!(rpc.is_retryable());

        let rejected = DashboardError::UserRejected("4001".into());
        assert!(!rejected.is_retryable());
        assert!(!DashboardError::Cancelled.is_retryable());
    }

    #[test]
    fn test_user_message() {
        let err = DashboardError::TransactionFailed("insufficient funds for gas".into());
        assert_eq!(
            err.user_message(),
            "Transaction failed. Please check your balance and try again."
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let err: DashboardError = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing").into();
        assert!(matches!(err, DashboardError::IoError(_)));
        assert_eq!(err.code(), ErrorCode::Unknown);
    }
}
