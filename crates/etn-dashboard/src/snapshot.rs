use chrono::{DateTime, Utc};
use etn_traits::{Address, Amount, PricePoint, TransactionRecord, U256};
use serde::Serialize;

/// What the dashboard shows for one tracked address.
///
/// Each section holds the result of its most recent successful fetch; a
/// failed fetch never clears it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletSnapshot {
    pub address: Address,
    pub balance: Amount,
    /// When the balance was last fetched successfully
    pub last_updated: Option<DateTime<Utc>>,
    /// Newest block first, in scan order
    pub transactions: Vec<TransactionRecord>,
    pub price_history: Vec<PricePoint>,
}

impl WalletSnapshot {
    /// Empty snapshot for a freshly tracked address
    pub fn empty(address: Address) -> Self {
        Self {
            address,
            balance: Amount::default(),
            last_updated: None,
            transactions: Vec::new(),
            price_history: Vec::new(),
        }
    }

    /// Sum of values of transactions sent by the tracked address
    pub fn total_sent(&self) -> Amount {
        total_sent(&self.transactions, &self.address)
    }

    /// Sum of values of transactions received by the tracked address
    pub fn total_received(&self) -> Amount {
        total_received(&self.transactions, &self.address)
    }
}

/// Sum of values of `records` whose sender is `address`.
pub fn total_sent(records: &[TransactionRecord], address: &Address) -> Amount {
    sum(records.iter().filter(|r| r.is_sent_by(address)))
}

/// Sum of values of `records` whose recipient is `address`.
///
/// A self-transfer counts here and in [`total_sent`].
pub fn total_received(records: &[TransactionRecord], address: &Address) -> Amount {
    sum(records.iter().filter(|r| r.is_received_by(address)))
}

fn sum<'a>(records: impl Iterator<Item = &'a TransactionRecord>) -> Amount {
    let value = records.fold(U256::ZERO, |acc, r| acc.saturating_add(r.value.base_units()));
    Amount::etn(value)
}

/// The two states of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "snapshot", rename_all = "snake_case")]
pub enum ViewState {
    /// No wallet connected; the connect action is offered
    Disconnected,
    /// A wallet address is tracked
    Connected(WalletSnapshot),
}

impl ViewState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ViewState::Connected(_))
    }

    pub fn snapshot(&self) -> Option<&WalletSnapshot> {
        match self {
            ViewState::Connected(snapshot) => Some(snapshot),
            ViewState::Disconnected => None,
        }
    }
}
