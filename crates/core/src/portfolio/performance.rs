//! Return metrics: CAGR over a price series and money-weighted return over
//! trade cash flows.

use chrono::{DateTime, Utc};
use log::debug;
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DAYS_PER_YEAR, HOURS_PER_YEAR, PERCENT_PRECISION, XIRR_INITIAL_GUESS, XIRR_MAX_ITERATIONS,
    XIRR_TOLERANCE,
};
use crate::quotes::series::lower_bound;
use crate::quotes::PricePoint;
use crate::trades::{Trade, TradeSide};

/// A dated cash flow from the investor's point of view: negative when money
/// goes in, positive when it comes out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlow {
    pub date: DateTime<Utc>,
    pub amount: Decimal,
}

impl CashFlow {
    pub fn new(date: DateTime<Utc>, amount: Decimal) -> Self {
        Self { date, amount }
    }
}

/// Compound annual growth rate of a price series, as a percentage.
///
/// The start price is the first point at or after `start` (clamped to the
/// last point), the end price is the last point of the series, and the
/// holding period runs from the start point to `end`. Returns zero when the
/// period cannot be measured.
pub fn cagr(series: &[PricePoint], start: DateTime<Utc>, end: DateTime<Utc>) -> Decimal {
    let Some(last) = series.last() else {
        return Decimal::ZERO;
    };
    let last_index = series.len() - 1;
    let start_index = lower_bound(series, start).min(last_index);
    if start_index == last_index {
        return Decimal::ZERO;
    }

    let start_point = &series[start_index];
    let hours = (end - start_point.timestamp).num_seconds() as f64 / 3600.0;
    let periods = hours / HOURS_PER_YEAR;
    if periods <= 0.0 {
        return Decimal::ZERO;
    }

    let (Some(start_price), Some(end_price)) = (start_point.close.to_f64(), last.close.to_f64())
    else {
        return Decimal::ZERO;
    };
    if start_price <= 0.0 {
        return Decimal::ZERO;
    }

    let rate = ((end_price / start_price).powf(1.0 / periods) - 1.0) * 100.0;
    to_percent(rate)
}

/// Investor cash flows for trades in `[since, as_of]` plus a terminal
/// redemption of `current_value` at `as_of`.
pub fn cash_flows(
    trades: &[Trade],
    since: DateTime<Utc>,
    as_of: DateTime<Utc>,
    current_value: Decimal,
) -> Vec<CashFlow> {
    let mut flows: Vec<CashFlow> = trades
        .iter()
        .filter(|t| {
            let ts = t.timestamp();
            ts >= since && ts <= as_of
        })
        .map(|t| {
            let gross = t.gross_value();
            let amount = match t.side {
                TradeSide::Buy => -gross,
                TradeSide::Sell => gross,
            };
            CashFlow::new(t.timestamp(), amount)
        })
        .collect();
    flows.push(CashFlow::new(as_of, current_value));
    flows
}

/// Money-weighted (XIRR-style) annual return as a percentage. Zero when the
/// solver cannot find a rate.
pub fn money_weighted_return(
    trades: &[Trade],
    since: DateTime<Utc>,
    as_of: DateTime<Utc>,
    current_value: Decimal,
) -> Decimal {
    let flows = cash_flows(trades, since, as_of, current_value);
    match xirr(&flows) {
        Some(rate) => to_percent(rate * 100.0),
        None => Decimal::ZERO,
    }
}

/// Solves `sum(CF_i / (1 + r)^(d_i / 365)) = 0` with Newton-Raphson, where
/// `d_i` is days since the earliest flow. Returns the rate as a fraction.
pub fn xirr(flows: &[CashFlow]) -> Option<f64> {
    if flows.len() < 2 {
        return None;
    }
    let has_inflow = flows.iter().any(|f| f.amount.is_sign_positive() && !f.amount.is_zero());
    let has_outflow = flows.iter().any(|f| f.amount.is_sign_negative() && !f.amount.is_zero());
    if !has_inflow || !has_outflow {
        return None;
    }

    let origin = flows.iter().map(|f| f.date).min()?;
    let terms: Vec<(f64, f64)> = flows
        .iter()
        .map(|f| {
            let years = (f.date - origin).num_seconds() as f64 / 86_400.0 / DAYS_PER_YEAR;
            (f.amount.to_f64().unwrap_or(0.0), years)
        })
        .collect();

    let mut rate = XIRR_INITIAL_GUESS;
    for iteration in 0..XIRR_MAX_ITERATIONS {
        let base = 1.0 + rate;
        if base <= 0.0 {
            return None;
        }

        let mut value = 0.0;
        let mut derivative = 0.0;
        for &(amount, years) in &terms {
            let discount = base.powf(years);
            value += amount / discount;
            derivative -= years * amount / (discount * base);
        }

        if derivative.abs() < f64::EPSILON {
            return None;
        }

        let next = rate - value / derivative;
        if !next.is_finite() {
            return None;
        }
        if (next - rate).abs() < XIRR_TOLERANCE {
            debug!("XIRR converged to {} after {} iterations", next, iteration + 1);
            return Some(next);
        }
        rate = next;
    }

    debug!("XIRR did not converge after {} iterations", XIRR_MAX_ITERATIONS);
    None
}

fn to_percent(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_f64(value)
        .unwrap_or(Decimal::ZERO)
        .round_dp(PERCENT_PRECISION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruments::InstrumentId;
    use crate::trades::TradeId;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn trade(date: DateTime<Utc>, side: TradeSide, quantity: Decimal, price: Decimal) -> Trade {
        Trade {
            id: TradeId::new(date.to_rfc3339()),
            instrument: InstrumentId::new("FUND"),
            trade_date: date.date_naive(),
            side,
            quantity,
            price,
            exchange: None,
            segment: None,
            order_id: None,
            order_execution_time: None,
        }
    }

    // =========================================================================
    // CAGR
    // =========================================================================

    #[test]
    fn test_cagr_doubling_over_one_year() {
        let start = day(2020, 1, 1);
        let end = start + Duration::hours(8766);
        let series = vec![
            PricePoint::new(start, dec!(100)),
            PricePoint::new(end, dec!(200)),
        ];
        assert_eq!(cagr(&series, start, end).round_dp(2), dec!(100));
    }

    #[test]
    fn test_cagr_uses_first_point_at_or_after_start() {
        let series = vec![
            PricePoint::new(day(2020, 1, 1), dec!(50)),
            PricePoint::new(day(2021, 1, 1), dec!(100)),
            PricePoint::new(day(2021, 1, 1) + Duration::hours(8766), dec!(121)),
        ];
        let end = series[2].timestamp;
        let rate = cagr(&series, day(2020, 6, 1), end);
        assert_eq!(rate.round_dp(2), dec!(21));
    }

    #[test]
    fn test_cagr_zero_when_start_is_last_point() {
        let series = vec![
            PricePoint::new(day(2020, 1, 1), dec!(100)),
            PricePoint::new(day(2021, 1, 1), dec!(150)),
        ];
        assert_eq!(cagr(&series, day(2022, 1, 1), day(2023, 1, 1)), Decimal::ZERO);
        assert_eq!(cagr(&[], day(2020, 1, 1), day(2023, 1, 1)), Decimal::ZERO);
    }

    #[test]
    fn test_cagr_zero_for_degenerate_inputs() {
        let series = vec![
            PricePoint::new(day(2020, 1, 1), Decimal::ZERO),
            PricePoint::new(day(2021, 1, 1), dec!(150)),
        ];
        assert_eq!(cagr(&series, day(2019, 1, 1), day(2021, 1, 1)), Decimal::ZERO);

        let series = vec![
            PricePoint::new(day(2020, 1, 1), dec!(10)),
            PricePoint::new(day(2021, 1, 1), dec!(15)),
        ];
        // end before the start point
        assert_eq!(cagr(&series, day(2020, 1, 1), day(2019, 1, 1)), Decimal::ZERO);
    }

    // =========================================================================
    // Money-weighted return
    // =========================================================================

    #[test]
    fn test_xirr_two_flow_schedule() {
        let flows = vec![
            CashFlow::new(day(2020, 1, 1), dec!(-1000)),
            CashFlow::new(day(2020, 1, 1) + Duration::days(365), dec!(1100)),
        ];
        let rate = xirr(&flows).unwrap();
        assert!((rate - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_xirr_requires_both_signs() {
        let flows = vec![
            CashFlow::new(day(2020, 1, 1), dec!(-1000)),
            CashFlow::new(day(2021, 1, 1), dec!(-100)),
        ];
        assert!(xirr(&flows).is_none());
        assert!(xirr(&flows[..1]).is_none());
    }

    #[test]
    fn test_money_weighted_return_from_trades() {
        let start = day(2020, 1, 1);
        let as_of = start + Duration::days(365);
        let trades = vec![trade(start, TradeSide::Buy, dec!(10), dec!(100))];

        let rate = money_weighted_return(&trades, start, as_of, dec!(1100));
        assert_eq!(rate.round_dp(2), dec!(10));
    }

    #[test]
    fn test_cash_flows_sign_convention_and_window() {
        let trades = vec![
            trade(day(2019, 6, 1), TradeSide::Buy, dec!(1), dec!(10)),
            trade(day(2020, 2, 1), TradeSide::Buy, dec!(2), dec!(50)),
            trade(day(2020, 3, 1), TradeSide::Sell, dec!(1), dec!(60)),
        ];
        let flows = cash_flows(&trades, day(2020, 1, 1), day(2020, 6, 1), dec!(70));
        let amounts: Vec<Decimal> = flows.iter().map(|f| f.amount).collect();
        assert_eq!(amounts, vec![dec!(-100), dec!(60), dec!(70)]);
        assert_eq!(flows[2].date, day(2020, 6, 1));
    }

    #[test]
    fn test_money_weighted_return_degrades_to_zero() {
        let start = day(2020, 1, 1);
        let trades = vec![trade(start, TradeSide::Buy, dec!(10), dec!(100))];
        // no redemption value: every flow is an outflow
        assert_eq!(
            money_weighted_return(&trades, start, day(2021, 1, 1), Decimal::ZERO),
            Decimal::ZERO
        );
    }
}
