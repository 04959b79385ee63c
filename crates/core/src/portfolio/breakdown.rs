//! Aggregate trade statistics for a single instrument.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::instruments::InstrumentId;
use crate::trades::{Trade, TradeSide};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub price: Decimal,
    pub quantity: Decimal,
    #[serde(rename = "type")]
    pub side: TradeSide,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeBreakdown {
    pub symbol: InstrumentId,
    pub total_buy_qty: Decimal,
    pub total_buy_value: Decimal,
    pub total_sell_qty: Decimal,
    pub total_sell_value: Decimal,
    pub net_quantity: Decimal,
    /// Net quantity valued at the average buy price; zero unless net long.
    pub total_investment: Decimal,
    pub trade_history: Vec<TradeRecord>,
}

impl TradeBreakdown {
    pub fn from_trades(symbol: InstrumentId, trades: &[Trade]) -> Self {
        let mut buy_qty = Decimal::ZERO;
        let mut buy_value = Decimal::ZERO;
        let mut sell_qty = Decimal::ZERO;
        let mut sell_value = Decimal::ZERO;
        let mut history = Vec::with_capacity(trades.len());

        for trade in trades {
            match trade.side {
                TradeSide::Buy => {
                    buy_qty += trade.quantity;
                    buy_value += trade.gross_value();
                }
                TradeSide::Sell => {
                    sell_qty += trade.quantity;
                    sell_value += trade.gross_value();
                }
            }
            history.push(TradeRecord {
                date: trade.trade_date,
                price: trade.price,
                quantity: trade.quantity,
                side: trade.side,
            });
        }

        let net_quantity = buy_qty - sell_qty;
        let total_investment = if net_quantity > Decimal::ZERO && !buy_qty.is_zero() {
            net_quantity * (buy_value / buy_qty)
        } else {
            Decimal::ZERO
        };

        Self {
            symbol,
            total_buy_qty: buy_qty,
            total_buy_value: buy_value,
            total_sell_qty: sell_qty,
            total_sell_value: sell_value,
            net_quantity,
            total_investment,
            trade_history: history,
        }
    }
}
