use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::instruments::{AssetClass, InstrumentId};
use crate::portfolio::{GrowthRow, HoldingSnapshot, PortfolioSummary, TradeBreakdown};
use crate::quotes::{PricePoint, RefreshReport};
use crate::trades::TradeLedger;

/// Query surface of one book (ledger + price history for one asset class).
///
/// Instrument arguments are raw user input; they are resolved against the
/// ledger case-insensitively. Unknown instruments produce empty results.
#[async_trait]
pub trait AnalyticsServiceTrait: Send + Sync {
    fn asset_class(&self) -> AssetClass;

    /// Instruments with at least one trade, sorted.
    fn instruments(&self) -> Vec<InstrumentId>;

    /// `(label, instrument)` pairs sorted by label.
    fn instrument_labels(&self) -> Vec<(String, InstrumentId)>;

    /// Normalized price trend over `[from, to)`.
    fn trend(&self, instrument: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<PricePoint>;

    /// Growth comparison across instruments, keyed by display label.
    fn compare(&self, instruments: &[String], from: DateTime<Utc>, to: DateTime<Utc>)
        -> Vec<GrowthRow>;

    /// Position snapshots for trades in `[from, to)`.
    fn holdings(
        &self,
        instrument: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<HoldingSnapshot>;

    /// Summaries evaluated at the current time.
    fn summary(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<PortfolioSummary>;

    fn summary_at(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        as_of: DateTime<Utc>,
    ) -> Vec<PortfolioSummary>;

    fn breakdown(&self, instrument: &str) -> Option<TradeBreakdown>;

    /// Refreshes price history for every ledger instrument.
    async fn refresh(&self) -> Result<RefreshReport>;

    /// Refreshes price history for the given instruments only.
    async fn refresh_instruments(&self, instruments: &[InstrumentId]) -> Result<RefreshReport>;

    /// Loads cached price history for every ledger instrument.
    fn warm_cache(&self) -> usize;

    /// Replaces the ledger wholesale.
    fn rebuild_ledger(&self, ledger: TradeLedger);
}
