//! # ETN Traits
//!
//! Shared value types and the trait seams of the ETN wallet dashboard.
//!
//! ## Core Traits
//!
//! - [`WalletProvider`] - Obtain account access from a wallet and expose its signer
//! - [`TransactionSigner`] - Submit signed native-currency transfers
//! - [`ChainReader`] - Read balances and blocks from a node
//! - [`PriceSource`] - Load a price history series
//!
//! The dashboard is constructed from `Arc<dyn ...>` handles of these traits, so
//! every component can be swapped for an in-memory double in tests.
//!
//! ## Example
//!
//! ```ignore
//! use etn_traits::prelude::*;
//!
//! async fn show_balance<R: ChainReader>(reader: &R, address: Address) -> Result<String> {
//!     Ok(reader.balance(address).await?.to_string())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use alloy_primitives::{Address, U256};
pub use etn_error::{DashboardError, Result};

/// Decimals of the ETN native asset.
pub const ETN_DECIMALS: u8 = 18;

/// Currency symbol of the ETN native asset.
pub const ETN_SYMBOL: &str = "ETN";

// ============================================================================
// Amount
// ============================================================================

fn ten_pow(exp: u8) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}

/// An exact amount of a chain asset.
///
/// The value is held in base units (e.g. the 10^-18 unit of ETN). All
/// conversions to and from display units are exact decimal arithmetic on
/// [`U256`]; no floating point is involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount {
    /// The value in base units
    pub value: U256,
    /// Number of decimal places of the display unit
    pub decimals: u8,
}

impl Amount {
    /// Creates an amount from a base-unit value
    pub fn from_base_units(value: U256, decimals: u8) -> Self {
        Self { value, decimals }
    }

    /// Creates an ETN amount from a base-unit value
    pub fn etn(value: U256) -> Self {
        Self::from_base_units(value, ETN_DECIMALS)
    }

    /// Returns zero amount with the specified decimals
    pub fn zero(decimals: u8) -> Self {
        Self { value: U256::ZERO, decimals }
    }

    /// Checks if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Returns the value in base units
    pub fn base_units(&self) -> U256 {
        self.value
    }

    /// Parses a display-unit decimal string such as `"2.5"` into base units.
    ///
    /// Rejects signs, exponents, empty input and more fractional digits than
    /// the asset has decimals.
    pub fn parse(input: &str, decimals: u8) -> Result<Self> {
        let trimmed = input.trim();
        let invalid = |reason: &str| DashboardError::InvalidAmount(format!("'{input}': {reason}"));

        let (int_part, frac_part) = match trimmed.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (trimmed, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid("no digits"));
        }
        if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid("only decimal digits and one '.' are allowed"));
        }
        if frac_part.len() > decimals as usize {
            return Err(invalid(&format!("more than {decimals} decimal places")));
        }

        let overflow = || DashboardError::AmountOverflow(format!("'{input}' does not fit in 256 bits"));
        let parse_digits = |digits: &str| -> Result<U256> {
            if digits.is_empty() {
                return Ok(U256::ZERO);
            }
            U256::from_str_radix(digits, 10).map_err(|_| overflow())
        };

        let int_value = parse_digits(int_part)?
            .checked_mul(ten_pow(decimals))
            .ok_or_else(overflow)?;
        let frac_value = parse_digits(frac_part)?
            .checked_mul(ten_pow(decimals - frac_part.len() as u8))
            .ok_or_else(overflow)?;
        let value = int_value.checked_add(frac_value).ok_or_else(overflow)?;

        Ok(Self { value, decimals })
    }

    /// Adds two amounts of the same asset
    pub fn checked_add(&self, rhs: &Amount) -> Result<Amount> {
        if self.decimals != rhs.decimals {
            return Err(DashboardError::InvalidAmount(format!(
                "cannot add amounts with {} and {} decimals",
                self.decimals, rhs.decimals
            )));
        }
        let value = self.value.checked_add(rhs.value).ok_or_else(|| {
            DashboardError::AmountOverflow(format!(
                "Overflow in U256 when adding {} to {}",
                rhs.value, self.value
            ))
        })?;
        Ok(Amount { value, decimals: self.decimals })
    }

    /// Formats the amount in display units, rounded half-up to `places`
    /// fractional digits (`10^18` base units at 18 decimals → `"1.00"`).
    pub fn to_fixed(&self, places: u8) -> String {
        let (int_part, frac_part) = if places >= self.decimals {
            let unit = ten_pow(self.decimals);
            let frac = self.value % unit;
            let mut frac_digits = if self.decimals == 0 {
                String::new()
            } else {
                format!("{:0>width$}", frac.to_string(), width = self.decimals as usize)
            };
            frac_digits.extend(std::iter::repeat('0').take((places - self.decimals) as usize));
            (self.value / unit, frac_digits)
        } else {
            let scale = ten_pow(self.decimals - places);
            let half = scale / U256::from(2u64);
            let rounded = self.value.saturating_add(half) / scale;
            let unit = ten_pow(places);
            let frac_digits = if places == 0 {
                String::new()
            } else {
                format!("{:0>width$}", (rounded % unit).to_string(), width = places as usize)
            };
            (rounded / unit, frac_digits)
        };

        if frac_part.is_empty() {
            int_part.to_string()
        } else {
            format!("{int_part}.{frac_part}")
        }
    }

    /// Formats the exact display value with trailing zeros removed
    /// (`2.5`, `1`, `0.000000000000000001`).
    pub fn to_decimal_string(&self) -> String {
        let full = self.to_fixed(self.decimals);
        match full.split_once('.') {
            Some((int_part, frac_part)) => {
                let frac_part = frac_part.trim_end_matches('0');
                if frac_part.is_empty() {
                    int_part.to_string()
                } else {
                    format!("{int_part}.{frac_part}")
                }
            }
            None => full,
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fixed(2))
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::zero(ETN_DECIMALS)
    }
}

// ============================================================================
// Hashes, addresses, networks
// ============================================================================

/// Represents a transaction hash
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(pub String);

impl TxHash {
    /// Creates a new TxHash from a string
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Returns the hash as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TxHash {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TxHash {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Parses a `0x`-prefixed hex address.
pub fn parse_address(input: &str) -> Result<Address> {
    let trimmed = input.trim();
    if !trimmed.starts_with("0x") && !trimmed.starts_with("0X") {
        return Err(DashboardError::InvalidAddress {
            address: input.to_string(),
            reason: "missing 0x prefix".to_string(),
        });
    }
    Address::from_str(trimmed).map_err(|e| DashboardError::InvalidAddress {
        address: input.to_string(),
        reason: e.to_string(),
    })
}

/// Represents a blockchain network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// Network name (e.g. "Electroneum Mainnet")
    pub name: String,
    /// EVM chain ID
    pub chain_id: Option<u64>,
    /// Whether this is a testnet
    pub is_testnet: bool,
}

impl Network {
    /// Creates a mainnet network
    pub fn mainnet(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chain_id: None,
            is_testnet: false,
        }
    }

    /// Creates a testnet network
    pub fn testnet(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chain_id: None,
            is_testnet: true,
        }
    }

    /// Sets the chain ID
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }
}

// ============================================================================
// Chain data
// ============================================================================

/// A transaction body as returned inside a full block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainTransaction {
    /// Transaction hash
    pub hash: TxHash,
    /// Sender
    pub from: Address,
    /// Recipient; `None` for contract creation
    pub to: Option<Address>,
    /// Transferred value in base units
    pub value: U256,
}

/// A block with its transaction bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainBlock {
    /// Block height
    pub number: u64,
    /// Unix timestamp (seconds)
    pub timestamp: u64,
    /// Transactions in block order
    pub transactions: Vec<ChainTransaction>,
}

/// Direction of a transaction relative to a tracked address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// The tracked address is the sender
    Sent,
    /// The tracked address is the recipient
    Received,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Sent => f.write_str("sent"),
            Direction::Received => f.write_str("received"),
        }
    }
}

/// A transaction touching a tracked address, as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Sender
    pub from: Address,
    /// Recipient; `None` for contract creation
    pub to: Option<Address>,
    /// Transferred value
    pub value: Amount,
    /// Transaction hash
    pub hash: TxHash,
    /// Block the transaction was found in
    pub block_number: u64,
    /// Human-readable date, when known
    pub date: Option<String>,
}

impl TransactionRecord {
    /// Builds a record from a chain transaction.
    pub fn from_chain(tx: &ChainTransaction, block_number: u64, date: Option<String>) -> Self {
        Self {
            from: tx.from,
            to: tx.to,
            value: Amount::etn(tx.value),
            hash: tx.hash.clone(),
            block_number,
            date,
        }
    }

    /// True when `address` is the sender or the recipient
    pub fn touches(&self, address: &Address) -> bool {
        self.from == *address || self.to.as_ref() == Some(address)
    }

    /// True when `address` is the sender
    pub fn is_sent_by(&self, address: &Address) -> bool {
        self.from == *address
    }

    /// True when `address` is the recipient
    pub fn is_received_by(&self, address: &Address) -> bool {
        self.to.as_ref() == Some(address)
    }

    /// Direction as shown in the transaction table: `Sent` when the tracked
    /// address is the sender, `Received` otherwise.
    pub fn direction_for(&self, address: &Address) -> Direction {
        if self.is_sent_by(address) {
            Direction::Sent
        } else {
            Direction::Received
        }
    }
}

/// A single point of the price history series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Date label as delivered by the price endpoint
    pub date: String,
    /// Price in the quote currency
    pub price: f64,
}

/// A native-currency transfer to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Recipient
    pub to: Address,
    /// Value in base units
    pub value: U256,
    /// Gas limit; `None` leaves it to the signer
    pub gas_limit: Option<u64>,
}

// ============================================================================
// Traits
// ============================================================================

/// Something that can sign and submit transfers for one address.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// The address transactions are sent from
    fn address(&self) -> Address;

    /// Signs and submits the transfer, returning its hash
    async fn send_transaction(&self, request: TransferRequest) -> Result<TxHash>;
}

/// A wallet that can grant account access.
///
/// Stands in for the wallet object a browser extension injects into a page.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Human-readable provider name for logs and UI
    fn name(&self) -> &str;

    /// Asks the wallet for account access (`eth_requestAccounts`).
    ///
    /// May prompt the user in the wallet's own UI.
    async fn request_accounts(&self) -> Result<Vec<Address>>;

    /// Requests account access and returns the first authorized address.
    async fn connect(&self) -> Result<Address> {
        let accounts = self.request_accounts().await?;
        accounts
            .into_iter()
            .next()
            .ok_or_else(|| DashboardError::UserRejected("wallet returned no accounts".to_string()))
    }

    /// The signer for the connected account, if this provider can sign
    fn signer(&self) -> Option<Arc<dyn TransactionSigner>>;
}

/// Read access to a chain node.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Balance of `address` at the latest block
    async fn balance(&self, address: Address) -> Result<Amount>;

    /// Current block height
    async fn block_number(&self) -> Result<u64>;

    /// Block `number` with full transaction bodies; `None` if the node does
    /// not know it
    async fn block_with_transactions(&self, number: u64) -> Result<Option<ChainBlock>>;

    /// Gas estimate for a plain transfer
    async fn estimate_gas(&self, from: Address, request: &TransferRequest) -> Result<u64>;
}

/// A source of historical prices.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Loads the full price history series
    async fn price_history(&self) -> Result<Vec<PricePoint>>;
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        parse_address, Address, Amount, ChainBlock, ChainReader, ChainTransaction, DashboardError,
        Direction, Network, PricePoint, PriceSource, Result, TransactionRecord, TransactionSigner,
        TransferRequest, TxHash, WalletProvider, ETN_DECIMALS, ETN_SYMBOL, U256,
    };
}
