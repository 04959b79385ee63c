//! Trade ledger construction and lookup.
//!
//! A ledger maps each instrument to its trades in chronological order. It is
//! built once from one or more batches of raw rows and never mutated
//! afterwards; a rebuild produces a new ledger that replaces the old one.

use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use super::trades_errors::LedgerError;
use super::trades_model::{RawTradeRow, Trade, TradeId, TradeSide};
use crate::constants::DATE_FORMAT;
use crate::instruments::{AssetClass, InstrumentId};

/// Deduplicated, date-ordered trades per instrument.
#[derive(Debug, Clone)]
pub struct TradeLedger {
    asset_class: AssetClass,
    trades: HashMap<InstrumentId, Vec<Trade>>,
    labels: HashMap<InstrumentId, String>,
}

impl TradeLedger {
    /// Creates an empty ledger.
    pub fn empty(asset_class: AssetClass) -> Self {
        Self {
            asset_class,
            trades: HashMap::new(),
            labels: HashMap::new(),
        }
    }

    /// Builds a ledger from batches of raw rows.
    ///
    /// Fails on the first malformed row.
    pub fn build<I>(asset_class: AssetClass, batches: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = Vec<RawTradeRow>>,
    {
        let mut builder = LedgerBuilder::new(asset_class);
        for batch in batches {
            builder.push_batch(batch)?;
        }
        Ok(builder.build())
    }

    pub fn asset_class(&self) -> AssetClass {
        self.asset_class
    }

    /// Trades for an instrument in chronological order. Empty for unknown
    /// instruments.
    pub fn ledger_for(&self, instrument: &InstrumentId) -> &[Trade] {
        self.trades
            .get(instrument)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resolves user input to a ledger key: exact match first, then a
    /// case-insensitive match.
    pub fn resolve(&self, raw: &str) -> Option<InstrumentId> {
        let raw = raw.trim();
        let exact = InstrumentId::new(raw);
        if self.trades.contains_key(&exact) {
            return Some(exact);
        }
        self.trades
            .keys()
            .find(|id| id.as_str().eq_ignore_ascii_case(raw))
            .cloned()
    }

    /// All instruments with at least one trade, sorted.
    pub fn instruments(&self) -> Vec<InstrumentId> {
        let mut ids: Vec<InstrumentId> = self.trades.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Display label for an instrument: the fund name for mutual funds, the
    /// symbol for equities. Falls back to the identifier itself.
    pub fn label_for(&self, instrument: &InstrumentId) -> String {
        self.labels
            .get(instrument)
            .cloned()
            .unwrap_or_else(|| instrument.to_string())
    }

    /// `(label, instrument)` pairs sorted by label.
    pub fn labels(&self) -> Vec<(String, InstrumentId)> {
        let mut pairs: Vec<(String, InstrumentId)> = self
            .trades
            .keys()
            .map(|id| (self.label_for(id), id.clone()))
            .collect();
        pairs.sort();
        pairs
    }

    /// Iterates instruments in sorted order with their trades.
    pub fn iter(&self) -> impl Iterator<Item = (&InstrumentId, &[Trade])> {
        let mut keys: Vec<&InstrumentId> = self.trades.keys().collect();
        keys.sort();
        keys.into_iter().map(move |id| (id, self.ledger_for(id)))
    }

    /// Number of instruments.
    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Total number of trades across all instruments.
    pub fn trade_count(&self) -> usize {
        self.trades.values().map(Vec::len).sum()
    }
}

/// Incremental ledger builder.
///
/// Keeps the set of trade ids already seen per instrument so later batches
/// cannot reintroduce a trade.
#[derive(Debug)]
pub struct LedgerBuilder {
    asset_class: AssetClass,
    trades: HashMap<InstrumentId, Vec<Trade>>,
    labels: HashMap<InstrumentId, String>,
    seen: HashSet<(InstrumentId, TradeId)>,
    rows_read: usize,
}

impl LedgerBuilder {
    pub fn new(asset_class: AssetClass) -> Self {
        Self {
            asset_class,
            trades: HashMap::new(),
            labels: HashMap::new(),
            seen: HashSet::new(),
            rows_read: 0,
        }
    }

    /// Adds one batch of rows. Duplicated trade ids are skipped; the first
    /// occurrence wins.
    pub fn push_batch(&mut self, rows: Vec<RawTradeRow>) -> Result<&mut Self, LedgerError> {
        let mut skipped = 0usize;
        for row in rows {
            self.rows_read += 1;
            if row.is_header() {
                continue;
            }

            let (instrument, label) = self.instrument_key(&row)?;
            let trade_id = required(&row.trade_id, "trade_id", self.rows_read)?;
            let key = (instrument.clone(), TradeId::new(trade_id));
            if self.seen.contains(&key) {
                skipped += 1;
                continue;
            }

            let trade = parse_trade(&row, instrument.clone(), key.1.clone())?;
            self.seen.insert(key);
            self.labels.entry(instrument.clone()).or_insert(label);
            self.trades.entry(instrument).or_default().push(trade);
        }
        if skipped > 0 {
            debug!("Skipped {} duplicate {} trade rows", skipped, self.asset_class);
        }
        Ok(self)
    }

    /// Finishes the ledger, sorting each instrument's trades by date.
    ///
    /// The sort is stable, so trades on the same day keep their source order.
    pub fn build(mut self) -> TradeLedger {
        for trades in self.trades.values_mut() {
            trades.sort_by_key(|t| t.trade_date);
        }
        TradeLedger {
            asset_class: self.asset_class,
            trades: self.trades,
            labels: self.labels,
        }
    }

    fn instrument_key(&self, row: &RawTradeRow) -> Result<(InstrumentId, String), LedgerError> {
        match self.asset_class {
            AssetClass::Equity => {
                let symbol = required(&row.symbol, "symbol", self.rows_read)?;
                Ok((InstrumentId::new(symbol), symbol.to_string()))
            }
            AssetClass::MutualFund => {
                let isin = required(&row.isin, "isin", self.rows_read)?;
                let name = row.symbol.trim();
                let label = if name.is_empty() { isin } else { name };
                Ok((InstrumentId::new(isin), label.to_string()))
            }
        }
    }
}

fn required<'a>(value: &'a str, field: &'static str, row: usize) -> Result<&'a str, LedgerError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(LedgerError::MissingField { row, field })
    } else {
        Ok(trimmed)
    }
}

fn parse_trade(
    row: &RawTradeRow,
    instrument: InstrumentId,
    id: TradeId,
) -> Result<Trade, LedgerError> {
    let trade_date = NaiveDate::parse_from_str(row.trade_date.trim(), DATE_FORMAT).map_err(|_| {
        LedgerError::InvalidDate {
            trade_id: id.to_string(),
            value: row.trade_date.clone(),
        }
    })?;

    let side = TradeSide::from_str(&row.trade_type).map_err(|_| LedgerError::InvalidSide {
        trade_id: id.to_string(),
        value: row.trade_type.clone(),
    })?;

    let quantity = parse_amount(&row.quantity, "quantity", &id)?;
    let price = parse_amount(&row.price, "price", &id)?;

    Ok(Trade {
        id,
        instrument,
        trade_date,
        side,
        quantity,
        price,
        exchange: optional(&row.exchange),
        segment: optional(&row.segment),
        order_id: optional(&row.order_id),
        order_execution_time: optional(&row.order_execution_time),
    })
}

/// Parses a non-negative decimal, accepting scientific notation.
fn parse_amount(value: &str, field: &'static str, id: &TradeId) -> Result<Decimal, LedgerError> {
    let trimmed = value.trim();
    let parsed = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| LedgerError::InvalidNumber {
            trade_id: id.to_string(),
            field,
            value: value.to_string(),
        })?;
    if parsed.is_sign_negative() && !parsed.is_zero() {
        return Err(LedgerError::NegativeValue {
            trade_id: id.to_string(),
            field,
            value: value.to_string(),
        });
    }
    Ok(parsed)
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
