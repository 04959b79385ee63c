//! Position replay over a trade ledger.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::trades::{Trade, TradeSide};

/// Position state immediately after one trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingSnapshot {
    pub timestamp: DateTime<Utc>,
    /// Units held, rounded up to the next whole unit.
    pub units: Decimal,
    /// Running cost basis: buys add `qty * price`, sells subtract it.
    pub position_value: Decimal,
    /// Signed value of the triggering trade: positive for buys.
    pub cash_flow: Decimal,
}

/// Walks `trades` in order and emits one snapshot per trade.
///
/// Sells beyond the held quantity are not rejected; units may go negative.
pub fn replay(trades: &[Trade]) -> Vec<HoldingSnapshot> {
    let mut units = Decimal::ZERO;
    let mut value = Decimal::ZERO;
    trades
        .iter()
        .map(|trade| {
            let gross = trade.gross_value();
            let cash_flow = match trade.side {
                TradeSide::Buy => {
                    units += trade.quantity;
                    value += gross;
                    gross
                }
                TradeSide::Sell => {
                    units -= trade.quantity;
                    value -= gross;
                    -gross
                }
            };
            HoldingSnapshot {
                timestamp: trade.timestamp(),
                units: units.ceil(),
                position_value: value,
                cash_flow,
            }
        })
        .collect()
}

/// Replays the full ledger and keeps snapshots with `from <= timestamp < to`.
///
/// Running totals include trades before `from`.
pub fn replay_in_range(
    trades: &[Trade],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Vec<HoldingSnapshot> {
    replay(trades)
        .into_iter()
        .filter(|s| s.timestamp >= from && s.timestamp < to)
        .collect()
}
