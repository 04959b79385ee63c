use thiserror::Error;

/// Errors raised while building a trade ledger.
///
/// Any of these aborts the whole build for the trade source. There is no
/// partial-ledger mode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Row {row}: required field '{field}' is empty")]
    MissingField { row: usize, field: &'static str },

    #[error("Trade {trade_id}: invalid trade date '{value}'")]
    InvalidDate { trade_id: String, value: String },

    #[error("Trade {trade_id}: invalid {field} '{value}'")]
    InvalidNumber {
        trade_id: String,
        field: &'static str,
        value: String,
    },

    #[error("Trade {trade_id}: {field} must not be negative (got {value})")]
    NegativeValue {
        trade_id: String,
        field: &'static str,
        value: String,
    },

    #[error("Trade {trade_id}: unknown trade type '{value}'")]
    InvalidSide { trade_id: String, value: String },

    #[error("Failed to read trades from {location}: {message}")]
    Source { location: String, message: String },
}
