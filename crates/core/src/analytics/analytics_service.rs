use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use super::analytics_traits::AnalyticsServiceTrait;
use crate::errors::Result;
use crate::instruments::{AssetClass, InstrumentId};
use crate::portfolio::{
    compare, replay_in_range, summarize, GrowthRow, HoldingSnapshot, PortfolioSummary,
    TradeBreakdown,
};
use crate::quotes::{
    PriceHistoryStore, PricePoint, PriceSeriesProvider, RefreshReport, SeriesCache,
};
use crate::trades::{LedgerError, TradeLedger, TradeSource};

/// Reads every location from `source` and builds one ledger from the batches.
///
/// A location that cannot be read is a construction error, like a malformed row.
pub fn load_ledger(
    asset_class: AssetClass,
    source: &dyn TradeSource,
    locations: &[PathBuf],
) -> Result<TradeLedger> {
    let batches = locations
        .iter()
        .map(|location| {
            debug!("Reading {} tradebook at {}", asset_class, location.display());
            source
                .fetch_trade_records(location)
                .map_err(|e| LedgerError::Source {
                    location: location.display().to_string(),
                    message: e.to_string(),
                })
        })
        .collect::<std::result::Result<Vec<_>, LedgerError>>()?;
    let ledger = TradeLedger::build(asset_class, batches)?;
    info!(
        "Built {} ledger: {} instruments, {} trades",
        asset_class,
        ledger.len(),
        ledger.trade_count()
    );
    Ok(ledger)
}

/// Owns the ledger and price history for one asset class.
pub struct AnalyticsService {
    asset_class: AssetClass,
    ledger: RwLock<Arc<TradeLedger>>,
    prices: PriceHistoryStore,
}

impl AnalyticsService {
    pub fn new(
        ledger: TradeLedger,
        provider: Arc<dyn PriceSeriesProvider>,
        cache: Arc<dyn SeriesCache>,
        fetch_timeout: Duration,
    ) -> Self {
        let asset_class = ledger.asset_class();
        Self {
            asset_class,
            ledger: RwLock::new(Arc::new(ledger)),
            prices: PriceHistoryStore::new(asset_class, provider, cache)
                .with_fetch_timeout(fetch_timeout),
        }
    }

    /// Builds the ledger from a trade source. Fails on the first malformed
    /// row.
    pub fn from_source(
        asset_class: AssetClass,
        source: &dyn TradeSource,
        locations: &[PathBuf],
        provider: Arc<dyn PriceSeriesProvider>,
        cache: Arc<dyn SeriesCache>,
        fetch_timeout: Duration,
    ) -> Result<Self> {
        let ledger = load_ledger(asset_class, source, locations)?;
        Ok(Self::new(ledger, provider, cache, fetch_timeout))
    }

    /// Current ledger snapshot.
    pub fn ledger(&self) -> Arc<TradeLedger> {
        let guard = self.ledger.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    pub fn prices(&self) -> &PriceHistoryStore {
        &self.prices
    }

    /// Ledger key for user input; falls back to the raw identifier so that
    /// instruments with prices but no trades can still be queried.
    fn resolve(&self, ledger: &TradeLedger, raw: &str) -> InstrumentId {
        ledger
            .resolve(raw)
            .unwrap_or_else(|| InstrumentId::new(raw.trim()))
    }
}

#[async_trait]
impl AnalyticsServiceTrait for AnalyticsService {
    fn asset_class(&self) -> AssetClass {
        self.asset_class
    }

    fn instruments(&self) -> Vec<InstrumentId> {
        self.ledger().instruments()
    }

    fn instrument_labels(&self) -> Vec<(String, InstrumentId)> {
        self.ledger().labels()
    }

    fn trend(&self, instrument: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<PricePoint> {
        let ledger = self.ledger();
        let id = self.resolve(&ledger, instrument);
        self.prices.range_query(&id, from, to)
    }

    fn compare(
        &self,
        instruments: &[String],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<GrowthRow> {
        let ledger = self.ledger();
        let ids: Vec<InstrumentId> = instruments
            .iter()
            .map(|raw| self.resolve(&ledger, raw))
            .collect();
        compare(&self.prices, &ids, from, to, |id| ledger.label_for(id))
    }

    fn holdings(
        &self,
        instrument: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<HoldingSnapshot> {
        let ledger = self.ledger();
        let id = self.resolve(&ledger, instrument);
        replay_in_range(ledger.ledger_for(&id), from, to)
    }

    fn summary(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<PortfolioSummary> {
        self.summary_at(from, to, Utc::now())
    }

    fn summary_at(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        as_of: DateTime<Utc>,
    ) -> Vec<PortfolioSummary> {
        summarize(&self.ledger(), &self.prices, from, to, as_of)
    }

    fn breakdown(&self, instrument: &str) -> Option<TradeBreakdown> {
        let ledger = self.ledger();
        let id = ledger.resolve(instrument)?;
        Some(TradeBreakdown::from_trades(id.clone(), ledger.ledger_for(&id)))
    }

    async fn refresh(&self) -> Result<RefreshReport> {
        let instruments = self.instruments();
        self.refresh_instruments(&instruments).await
    }

    async fn refresh_instruments(&self, instruments: &[InstrumentId]) -> Result<RefreshReport> {
        self.prices.refresh(instruments).await.into_result()
    }

    fn warm_cache(&self) -> usize {
        self.prices.load_cached(&self.instruments())
    }

    fn rebuild_ledger(&self, ledger: TradeLedger) {
        info!(
            "Replacing {} ledger: {} instruments, {} trades",
            self.asset_class,
            ledger.len(),
            ledger.trade_count()
        );
        let mut guard = self.ledger.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(ledger);
    }
}
