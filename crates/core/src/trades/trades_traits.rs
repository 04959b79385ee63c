use std::path::Path;

use super::trades_model::RawTradeRow;
use crate::errors::Result;

/// Source of raw tradebook rows.
///
/// Implementations handle the actual file format (see the `storage-fs`
/// crate for the CSV reader). The ledger builder consumes the rows.
pub trait TradeSource: Send + Sync {
    /// Reads every trade row available at `location`.
    ///
    /// Rows are returned in source order; deduplication and sorting are the
    /// ledger's job.
    fn fetch_trade_records(&self, location: &Path) -> Result<Vec<RawTradeRow>>;
}
