//! Core error types for Tradelens.
//!
//! This module defines storage-agnostic error types. Filesystem and network
//! specific errors are converted to these types by the storage and provider
//! layers before they reach callers.

use thiserror::Error;

use crate::quotes::MarketDataError;
use crate::trades::LedgerError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the analytics engine.
///
/// Query operations never surface "nothing to show" conditions through this
/// type; unknown instruments and empty ranges are represented as empty
/// results. What remains are construction failures, collaborator failures
/// and the aggregated outcome of a price refresh.
#[derive(Error, Debug)]
pub enum Error {
    /// A trade ledger could not be built. Fatal at startup.
    #[error("Ledger construction failed: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Storage operation failed: {0}")]
    Storage(String),

    /// One or more instruments failed to refresh. The message lists every
    /// failing instrument, one per line.
    #[error("Price history refresh failed:\n{0}")]
    Refresh(String),
}
