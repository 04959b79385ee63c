//! Per-instrument holding-period summaries.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::performance::{cagr, money_weighted_return};
use crate::constants::{OPEN_POSITION_UNIT_THRESHOLD, PERCENT_PRECISION};
use crate::instruments::InstrumentId;
use crate::quotes::PriceHistoryStore;
use crate::trades::{Trade, TradeLedger, TradeSide};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub name: String,
    pub instrument: InstrumentId,
    /// Days since the holding-since anchor; 0 when the position is closed.
    pub holding_days: i64,
    /// Days between the first trade and the last investment.
    pub investment_span_days: i64,
    pub days_since_last_investment: i64,
    /// Units held, rounded up.
    pub units: Decimal,
    pub current_price: Decimal,
    pub current_value: Decimal,
    /// Net capital invested since the holding-since anchor.
    pub invested_value: Decimal,
    pub absolute_return: Decimal,
    pub percentage_return: Decimal,
    /// Lifetime gross buys.
    pub total_invested: Decimal,
    /// Lifetime gross sells.
    pub total_harvested: Decimal,
    pub cagr: Decimal,
    pub xirr: Decimal,
}

/// Running position state while walking a ledger.
#[derive(Debug, Default)]
struct PositionTracker {
    units: Decimal,
    invested: Decimal,
    total_invested: Decimal,
    total_harvested: Decimal,
    anchor: Option<DateTime<Utc>>,
    last_investment: Option<DateTime<Utc>>,
}

impl PositionTracker {
    fn apply(&mut self, trade: &Trade) {
        let threshold = Decimal::from(OPEN_POSITION_UNIT_THRESHOLD);
        let gross = trade.gross_value();
        match trade.side {
            TradeSide::Buy => {
                if self.units < threshold {
                    self.anchor = Some(trade.timestamp());
                    self.invested = Decimal::ZERO;
                }
                self.units += trade.quantity;
                self.invested += gross;
                self.total_invested += gross;
                self.last_investment = Some(trade.timestamp());
            }
            TradeSide::Sell => {
                self.units -= trade.quantity;
                self.invested -= gross;
                self.total_harvested += gross;
                if self.units < threshold {
                    self.anchor = None;
                    self.invested = Decimal::ZERO;
                }
            }
        }
    }
}

/// Summarises every instrument in the ledger as of `min(to, as_of)`.
///
/// Only trades dated on or before the evaluation instant count. The current
/// price is the last price point at or before that instant; instruments
/// without one are skipped. CAGR starts at the later of the holding-since
/// anchor and `from`. Output is sorted by name.
pub fn summarize(
    ledger: &TradeLedger,
    store: &PriceHistoryStore,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    as_of: DateTime<Utc>,
) -> Vec<PortfolioSummary> {
    let evaluated_at = to.min(as_of);
    let mut summaries: Vec<PortfolioSummary> = ledger
        .iter()
        .filter_map(|(instrument, trades)| {
            summarize_instrument(ledger, store, instrument, trades, from, evaluated_at)
        })
        .collect();
    summaries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.instrument.cmp(&b.instrument)));
    summaries
}

fn summarize_instrument(
    ledger: &TradeLedger,
    store: &PriceHistoryStore,
    instrument: &InstrumentId,
    trades: &[Trade],
    from: DateTime<Utc>,
    evaluated_at: DateTime<Utc>,
) -> Option<PortfolioSummary> {
    let end = trades.partition_point(|t| t.timestamp() <= evaluated_at);
    let trades = &trades[..end];
    let first_trade = trades.first()?;

    let mut tracker = PositionTracker::default();
    for trade in trades {
        tracker.apply(trade);
    }

    let Some(price) = store.price_at(instrument, evaluated_at) else {
        warn!(
            "Unable to compute summary for {}: no price history at or before {}",
            instrument,
            evaluated_at.format("%Y-%m-%d")
        );
        return None;
    };

    let units = tracker.units.ceil();
    let current_value = units * price.close;
    let absolute_return = current_value - tracker.invested;

    let (holding_days, cagr_pct, xirr_pct) = match tracker.anchor {
        Some(anchor) => {
            let series = store.series(instrument).unwrap_or_else(|| Vec::new().into());
            let visible = series.partition_point(|p| p.timestamp <= evaluated_at);
            let growth = cagr(&series[..visible], anchor.max(from), evaluated_at);
            let mwr = money_weighted_return(trades, anchor, evaluated_at, current_value);
            ((evaluated_at - anchor).num_days(), growth, mwr)
        }
        None => (0, Decimal::ZERO, Decimal::ZERO),
    };

    let last_investment = tracker.last_investment.unwrap_or_else(|| first_trade.timestamp());
    let percentage_return = if !tracker.invested.is_zero() && !absolute_return.is_zero() {
        (absolute_return / tracker.invested * Decimal::ONE_HUNDRED).round_dp(PERCENT_PRECISION)
    } else {
        Decimal::ZERO
    };

    let name = ledger.label_for(instrument);
    debug!("Summary for {}: cagr {} xirr {}", name, cagr_pct, xirr_pct);

    Some(PortfolioSummary {
        name,
        instrument: instrument.clone(),
        holding_days,
        investment_span_days: (last_investment - first_trade.timestamp()).num_days(),
        days_since_last_investment: (evaluated_at - last_investment).num_days(),
        units,
        current_price: price.close,
        current_value,
        invested_value: tracker.invested,
        absolute_return,
        percentage_return,
        total_invested: tracker.total_invested,
        total_harvested: tracker.total_harvested,
        cagr: cagr_pct,
        xirr: xirr_pct,
    })
}
