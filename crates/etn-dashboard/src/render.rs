//! Plain-text rendering of the dashboard.

use crate::snapshot::{ViewState, WalletSnapshot};
use etn_traits::{PricePoint, ETN_SYMBOL};
use std::fmt::Write;
use tabled::settings::Style;
use tabled::{Table, Tabled};

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

#[derive(Tabled)]
struct TxRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Type")]
    direction: String,
    #[tabled(rename = "Amount (ETN)")]
    amount: String,
}

/// Renders the whole view.
pub fn render_view(state: &ViewState) -> String {
    match state {
        ViewState::Disconnected => render_disconnected(),
        ViewState::Connected(snapshot) => render_snapshot(snapshot),
    }
}

fn render_disconnected() -> String {
    "ETN Wallet Dashboard\n\nNo wallet connected.\n[ Connect Wallet ]\n".to_string()
}

/// Renders the cards, price chart and transaction table for a snapshot.
pub fn render_snapshot(snapshot: &WalletSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ETN Wallet Dashboard");
    let _ = writeln!(out, "Address: {}", snapshot.address);
    let _ = writeln!(out);

    let updated = snapshot
        .last_updated
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string());
    let _ = writeln!(out, "Balance:  {} {ETN_SYMBOL}  (last updated {updated})", snapshot.balance);
    let _ = writeln!(out, "Sent:     {} {ETN_SYMBOL}", snapshot.total_sent());
    let _ = writeln!(out, "Received: {} {ETN_SYMBOL}", snapshot.total_received());
    let _ = writeln!(out);

    let _ = writeln!(out, "Price history");
    let _ = writeln!(out, "{}", price_chart(&snapshot.price_history));
    let _ = writeln!(out);

    let _ = writeln!(out, "Recent transactions");
    out.push_str(&transaction_table(snapshot));
    out
}

/// One-line sparkline of the series with its range, or a placeholder.
pub fn price_chart(points: &[PricePoint]) -> String {
    let prices: Vec<f64> = points.iter().map(|p| p.price).filter(|p| p.is_finite()).collect();
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return "  (no price data)".to_string();
    };
    if prices.is_empty() {
        return "  (no price data)".to_string();
    }

    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    let top = (SPARK_LEVELS.len() - 1) as f64;

    let line: String = prices
        .iter()
        .map(|p| {
            let level = if span > 0.0 {
                ((p - min) / span * top).round() as usize
            } else {
                SPARK_LEVELS.len() / 2
            };
            SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
        })
        .collect();

    format!(
        "  {line}\n  {} .. {}  min {min}  max {max}",
        first.date, last.date
    )
}

fn transaction_table(snapshot: &WalletSnapshot) -> String {
    let rows: Vec<TxRow> = snapshot
        .transactions
        .iter()
        .map(|record| TxRow {
            date: record.date.clone().unwrap_or_else(|| "N/A".to_string()),
            direction: record.direction_for(&snapshot.address).to_string(),
            amount: record.value.to_string(),
        })
        .collect();

    let mut out = Table::new(&rows).with(Style::blank()).to_string();
    out.push('\n');
    if rows.is_empty() {
        out.push_str("  (no transactions in recent blocks)\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use etn_traits::{Address, Amount, TransactionRecord, TxHash, ETN_DECIMALS};

    fn snapshot() -> WalletSnapshot {
        let me = Address::with_last_byte(0xa1);
        let other = Address::with_last_byte(0xb2);
        let mut snapshot = WalletSnapshot::empty(me);
        snapshot.balance = Amount::parse("12.345", ETN_DECIMALS).unwrap();
        snapshot.transactions = vec![
            TransactionRecord {
                from: me,
                to: Some(other),
                value: Amount::parse("2.5", ETN_DECIMALS).unwrap(),
                hash: TxHash::new("0x01"),
                block_number: 2,
                date: Some("2024-01-01 00:01".to_string()),
            },
            TransactionRecord {
                from: other,
                to: Some(me),
                value: Amount::parse("1", ETN_DECIMALS).unwrap(),
                hash: TxHash::new("0x02"),
                block_number: 1,
                date: None,
            },
        ];
        snapshot
    }

    #[test]
    fn test_disconnected_offers_connect() {
        assert!(render_view(&ViewState::Disconnected).contains("Connect Wallet"));
    }

    #[test]
    fn test_cards() {
        let text = render_snapshot(&snapshot());
        assert!(text.contains("Balance:  12.35 ETN"));
        assert!(text.contains("Sent:     2.50 ETN"));
        assert!(text.contains("Received: 1.00 ETN"));
        assert!(text.contains("last updated never"));
    }

    #[test]
    fn test_table_rows() {
        let text = render_snapshot(&snapshot());
        let rows: Vec<&str> = text
            .lines()
            .skip_while(|l| !l.contains("Amount (ETN)"))
            .skip(1)
            .collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("2024-01-01 00:01") && rows[0].contains("sent") && rows[0].trim_end().ends_with("2.50"));
        assert!(rows[1].contains("N/A") && rows[1].contains("received") && rows[1].trim_end().ends_with("1.00"));
    }

    #[test]
    fn test_empty_table_keeps_header() {
        let me = Address::with_last_byte(0xa1);
        let text = render_snapshot(&WalletSnapshot::empty(me));
        let tail: Vec<&str> = text
            .lines()
            .skip_while(|l| !l.contains("Amount (ETN)"))
            .collect();
        assert!(tail[0].contains("Date") && tail[0].contains("Type"));
        assert_eq!(tail[1], "  (no transactions in recent blocks)");
    }

    #[test]
    fn test_price_chart() {
        let points = vec![
            PricePoint { date: "2024-01-01".into(), price: 1.0 },
            PricePoint { date: "2024-01-02".into(), price: 2.0 },
            PricePoint { date: "2024-01-03".into(), price: 3.0 },
        ];
        let chart = price_chart(&points);
        assert!(chart.contains("▁▅█"));
        assert!(chart.contains("2024-01-01 .. 2024-01-03"));
        assert!(chart.contains("min 1"));
        assert!(chart.contains("max 3"));
    }

    #[test]
    fn test_flat_and_empty_chart() {
        assert_eq!(price_chart(&[]), "  (no price data)");
        let flat = vec![
            PricePoint { date: "d1".into(), price: 5.0 },
            PricePoint { date: "d2".into(), price: 5.0 },
        ];
        assert!(price_chart(&flat).contains("▅▅"));
    }
}
