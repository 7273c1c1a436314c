use crate::render::render_view;
use crate::snapshot::{ViewState, WalletSnapshot};

use chrono::Utc;
use etn_electroneum::{send_native, TransactionScanner, DEFAULT_SCAN_LIMIT, MAX_SCAN_LIMIT};
use etn_error::{DashboardError, Result};
use etn_traits::{
    Address, Amount, ChainReader, PricePoint, PriceSource, TransactionRecord, TransactionSigner,
    TxHash, WalletProvider,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Outcome of one section of a refresh cycle.
#[derive(Debug)]
pub enum SectionOutcome {
    /// The section was replaced with fresh data
    Updated,
    /// The fetch failed; the previous value was kept
    Failed(DashboardError),
    /// A newer cycle was issued (or the address changed) before this one
    /// finished; nothing was applied
    Discarded,
}

impl SectionOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, SectionOutcome::Updated)
    }

    pub fn error(&self) -> Option<&DashboardError> {
        match self {
            SectionOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// What a refresh cycle did to each section.
#[derive(Debug)]
pub struct RefreshReport {
    /// Sequence number of the cycle
    pub sequence: u64,
    pub address: Address,
    pub balance: SectionOutcome,
    pub transactions: SectionOutcome,
    pub price_history: SectionOutcome,
}

impl RefreshReport {
    /// True when the results were thrown away as stale
    pub fn is_stale(&self) -> bool {
        matches!(self.balance, SectionOutcome::Discarded)
    }

    /// True when every section was updated
    pub fn is_complete(&self) -> bool {
        self.balance.is_updated() && self.transactions.is_updated() && self.price_history.is_updated()
    }

    /// Failed sections by name
    pub fn failures(&self) -> Vec<(&'static str, &DashboardError)> {
        [
            ("balance", &self.balance),
            ("transactions", &self.transactions),
            ("price history", &self.price_history),
        ]
        .into_iter()
        .filter_map(|(name, outcome)| outcome.error().map(|e| (name, e)))
        .collect()
    }
}

struct Inner {
    view: ViewState,
    /// Cancelled when the tracked address changes or the wallet disconnects
    session: CancellationToken,
    signer: Option<Arc<dyn TransactionSigner>>,
}

/// The wallet dashboard.
///
/// Owns the view state and runs refresh cycles against the injected chain
/// reader, price source and wallet provider. All methods take `&self`; the
/// state sits behind an async `RwLock` so a refresh can run while the front
/// end renders.
pub struct Dashboard {
    chain: Arc<dyn ChainReader>,
    prices: Arc<dyn PriceSource>,
    wallet: Arc<dyn WalletProvider>,
    scanner: TransactionScanner,
    scan_limit: usize,
    sequence: AtomicU64,
    inner: RwLock<Inner>,
}

impl Dashboard {
    pub fn new(
        chain: Arc<dyn ChainReader>,
        prices: Arc<dyn PriceSource>,
        wallet: Arc<dyn WalletProvider>,
    ) -> Self {
        Self {
            scanner: TransactionScanner::new(chain.clone()),
            chain,
            prices,
            wallet,
            scan_limit: DEFAULT_SCAN_LIMIT,
            sequence: AtomicU64::new(0),
            inner: RwLock::new(Inner {
                view: ViewState::Disconnected,
                session: CancellationToken::new(),
                signer: None,
            }),
        }
    }

    /// Number of recent blocks each refresh scans (capped by the scanner)
    pub fn with_scan_limit(mut self, limit: usize) -> Self {
        self.scan_limit = limit.min(MAX_SCAN_LIMIT);
        self
    }

    pub fn scan_limit(&self) -> usize {
        self.scan_limit
    }

    /// Asks the wallet for account access. On success the dashboard tracks
    /// the granted address and runs a refresh; on failure it stays as it was.
    pub async fn connect(&self) -> Result<RefreshReport> {
        let address = match self.wallet.connect().await {
            Ok(address) => address,
            Err(e) => {
                tracing::warn!(provider = self.wallet.name(), code = ?e.code(), error = %e, "Failed to connect wallet");
                return Err(e);
            }
        };
        tracing::info!(provider = self.wallet.name(), %address, "Wallet connected");
        self.begin_session(address, self.wallet.signer()).await;
        self.refresh().await
    }

    /// Tracks `address` read-only (no signer) and runs a refresh.
    pub async fn track(&self, address: Address) -> Result<RefreshReport> {
        self.begin_session(address, None).await;
        self.refresh().await
    }

    /// Drops the session. In-flight cycles are cancelled and their results
    /// discarded.
    pub async fn disconnect(&self) {
        let mut inner = self.inner.write().await;
        self.sequence.fetch_add(1, Ordering::SeqCst);
        inner.session.cancel();
        inner.session = CancellationToken::new();
        inner.signer = None;
        inner.view = ViewState::Disconnected;
        tracing::info!("Wallet disconnected");
    }

    async fn begin_session(&self, address: Address, signer: Option<Arc<dyn TransactionSigner>>) {
        let mut inner = self.inner.write().await;
        let same_address = inner.view.snapshot().map(|s| s.address) == Some(address);
        if !same_address {
            self.sequence.fetch_add(1, Ordering::SeqCst);
            inner.session.cancel();
            inner.session = CancellationToken::new();
            inner.view = ViewState::Connected(WalletSnapshot::empty(address));
        }
        inner.signer = signer;
    }

    /// Fetches balance, recent transactions and price history concurrently
    /// and applies each section independently.
    ///
    /// Fails only with [`DashboardError::NotConnected`]; section failures are
    /// logged and reported in the [`RefreshReport`].
    pub async fn refresh(&self) -> Result<RefreshReport> {
        let (address, cancel) = {
            let inner = self.inner.read().await;
            let snapshot = inner.view.snapshot().ok_or(DashboardError::NotConnected)?;
            (snapshot.address, inner.session.child_token())
        };
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(%address, sequence, "Refresh started");

        let (balance, transactions, price_history) = tokio::join!(
            self.chain.balance(address),
            self.scanner.scan(address, self.scan_limit, &cancel),
            self.prices.price_history(),
        );

        Ok(self
            .apply(sequence, address, balance, transactions, price_history)
            .await)
    }

    async fn apply(
        &self,
        sequence: u64,
        address: Address,
        balance: Result<Amount>,
        transactions: Result<Vec<TransactionRecord>>,
        price_history: Result<Vec<PricePoint>>,
    ) -> RefreshReport {
        let mut inner = self.inner.write().await;

        let latest = self.sequence.load(Ordering::SeqCst);
        let snapshot = match &mut inner.view {
            ViewState::Connected(snapshot) if sequence == latest && snapshot.address == address => snapshot,
            _ => {
                tracing::warn!(%address, sequence, latest, "Discarding stale refresh result");
                return RefreshReport {
                    sequence,
                    address,
                    balance: SectionOutcome::Discarded,
                    transactions: SectionOutcome::Discarded,
                    price_history: SectionOutcome::Discarded,
                };
            }
        };

        let balance = match balance {
            Ok(balance) => {
                snapshot.balance = balance;
                snapshot.last_updated = Some(Utc::now());
                SectionOutcome::Updated
            }
            Err(e) => {
                tracing::warn!(%address, code = ?e.code(), error = %e, "Balance fetch failed");
                SectionOutcome::Failed(e)
            }
        };
        let transactions = match transactions {
            Ok(records) => {
                snapshot.transactions = records;
                SectionOutcome::Updated
            }
            Err(e) => {
                tracing::warn!(%address, code = ?e.code(), error = %e, "Transaction scan failed");
                SectionOutcome::Failed(e)
            }
        };
        let price_history = match price_history {
            Ok(points) => {
                snapshot.price_history = points;
                SectionOutcome::Updated
            }
            Err(e) => {
                tracing::warn!(code = ?e.code(), error = %e, "Price history fetch failed");
                SectionOutcome::Failed(e)
            }
        };

        RefreshReport {
            sequence,
            address,
            balance,
            transactions,
            price_history,
        }
    }

    /// Sends `amount` ETN to `to` with the connected wallet's signer.
    pub async fn send(&self, to: &str, amount: &str) -> Result<TxHash> {
        let signer = {
            let inner = self.inner.read().await;
            if !inner.view.is_connected() {
                return Err(DashboardError::NotConnected);
            }
            inner.signer.clone()
        };
        send_native(self.chain.as_ref(), signer.as_ref(), to, amount).await
    }

    pub async fn state(&self) -> ViewState {
        self.inner.read().await.view.clone()
    }

    pub async fn snapshot(&self) -> Option<WalletSnapshot> {
        self.inner.read().await.view.snapshot().cloned()
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.read().await.view.is_connected()
    }

    /// Total sent by the tracked address, recomputed from the current list
    pub async fn total_sent(&self) -> Option<Amount> {
        self.inner.read().await.view.snapshot().map(WalletSnapshot::total_sent)
    }

    /// Total received by the tracked address, recomputed from the current list
    pub async fn total_received(&self) -> Option<Amount> {
        self.inner.read().await.view.snapshot().map(WalletSnapshot::total_received)
    }

    /// Renders the current view as text
    pub async fn render(&self) -> String {
        render_view(&self.inner.read().await.view)
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("wallet", &self.wallet.name())
            .field("scan_limit", &self.scan_limit)
            .field("sequence", &self.sequence.load(Ordering::SeqCst))
            .finish()
    }
}
