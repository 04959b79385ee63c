//! Collaborator traits for price history.
//!
//! The store itself lives in memory; these traits abstract where fresh
//! series come from and where fetched series are persisted, so the storage
//! and network layers can be swapped without touching the engine.

use async_trait::async_trait;

use super::model::PricePoint;
use crate::errors::Result;
use crate::instruments::{AssetClass, InstrumentId};

/// Remote market-data source for full price histories.
#[async_trait]
pub trait PriceSeriesProvider: Send + Sync {
    /// Fetches the complete available history for an instrument.
    ///
    /// Points need not be sorted; the store sorts them before committing.
    async fn fetch_series(
        &self,
        instrument: &InstrumentId,
        asset_class: AssetClass,
    ) -> Result<Vec<PricePoint>>;
}

/// Durable local cache of price series.
pub trait SeriesCache: Send + Sync {
    /// Loads a previously saved series. `Ok(None)` when nothing is cached.
    fn load_series(&self, instrument: &InstrumentId) -> Result<Option<Vec<PricePoint>>>;

    /// Persists a series, replacing any previous copy.
    fn save_series(&self, instrument: &InstrumentId, series: &[PricePoint]) -> Result<()>;
}

/// Cache that stores nothing. Useful for tests and ephemeral deployments.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpSeriesCache;

impl SeriesCache for NoOpSeriesCache {
    fn load_series(&self, _instrument: &InstrumentId) -> Result<Option<Vec<PricePoint>>> {
        Ok(None)
    }

    fn save_series(&self, _instrument: &InstrumentId, _series: &[PricePoint]) -> Result<()> {
        Ok(())
    }
}
