//! Trade domain models.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::instruments::InstrumentId;

/// Broker-assigned trade identifier. Unique within an instrument's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct TradeId(pub String);

impl TradeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "buy",
            TradeSide::Sell => "sell",
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(TradeSide::Buy),
            "sell" => Ok(TradeSide::Sell),
            other => Err(format!("unknown trade type '{}'", other)),
        }
    }
}

/// A single executed trade, as held by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: TradeId,
    pub instrument: InstrumentId,
    pub trade_date: NaiveDate,
    pub side: TradeSide,
    pub quantity: Decimal,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_execution_time: Option<String>,
}

impl Trade {
    /// Gross value of the trade (quantity * price), always non-negative.
    pub fn gross_value(&self) -> Decimal {
        self.quantity * self.price
    }

    /// Trade date as an instant at midnight UTC.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.trade_date.and_time(NaiveTime::MIN).and_utc()
    }

    pub fn is_buy(&self) -> bool {
        self.side == TradeSide::Buy
    }
}

/// A tradebook row exactly as delivered by a trade source.
///
/// Every field is kept as text; the ledger builder parses and validates them
/// so that malformed rows surface as construction errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTradeRow {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub isin: String,
    #[serde(default)]
    pub trade_date: String,
    #[serde(default)]
    pub exchange: String,
    #[serde(default)]
    pub segment: String,
    #[serde(default)]
    pub series: String,
    #[serde(default)]
    pub trade_type: String,
    #[serde(default)]
    pub auction: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub trade_id: String,
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub order_execution_time: String,
}

impl RawTradeRow {
    /// True for a repeated column-header line, which concatenated tradebook
    /// exports contain once per file.
    pub fn is_header(&self) -> bool {
        self.symbol.eq_ignore_ascii_case("symbol") || self.trade_id.eq_ignore_ascii_case("trade_id")
    }
}
