//! In-memory price history store.
//!
//! Each instrument's series is held as an `Arc<[PricePoint]>` so readers can
//! take a snapshot and release the map shard before doing any work. A refresh
//! replaces the whole `Arc`; readers observe either the previous series or the
//! new one, never a mix.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::future::join_all;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;

use super::errors::MarketDataError;
use super::model::PricePoint;
use super::refresh::{RefreshOutcome, RefreshReport};
use super::series::{canonicalize, normalize, window};
use super::store::{PriceSeriesProvider, SeriesCache};
use crate::errors::{Error, Result};
use crate::instruments::{AssetClass, InstrumentId};

/// Default upper bound for a single provider fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

pub struct PriceHistoryStore {
    asset_class: AssetClass,
    series: DashMap<InstrumentId, Arc<[PricePoint]>>,
    provider: Arc<dyn PriceSeriesProvider>,
    cache: Arc<dyn SeriesCache>,
    fetch_timeout: Duration,
}

impl PriceHistoryStore {
    pub fn new(
        asset_class: AssetClass,
        provider: Arc<dyn PriceSeriesProvider>,
        cache: Arc<dyn SeriesCache>,
    ) -> Self {
        Self {
            asset_class,
            series: DashMap::new(),
            provider,
            cache,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn asset_class(&self) -> AssetClass {
        self.asset_class
    }

    /// Populates the store from the cache. Missing or unreadable entries are
    /// skipped. Returns the number of instruments loaded.
    pub fn load_cached(&self, instruments: &[InstrumentId]) -> usize {
        let mut loaded = 0;
        for instrument in instruments {
            match self.cache.load_series(instrument) {
                Ok(Some(points)) if !points.is_empty() => {
                    self.insert_series(instrument.clone(), points);
                    loaded += 1;
                }
                Ok(_) => debug!("No cached price history for {}", instrument),
                Err(e) => warn!("Failed to load cached price history for {}: {}", instrument, e),
            }
        }
        info!(
            "Loaded cached price history for {}/{} {} instruments",
            loaded,
            instruments.len(),
            self.asset_class
        );
        loaded
    }

    /// Replaces an instrument's series. Points are sorted by timestamp first.
    pub fn insert_series(&self, instrument: InstrumentId, points: Vec<PricePoint>) -> usize {
        let sorted: Arc<[PricePoint]> = canonicalize(points).into();
        let len = sorted.len();
        self.series.insert(instrument, sorted);
        len
    }

    /// Shared snapshot of an instrument's full series.
    pub fn series(&self, instrument: &InstrumentId) -> Option<Arc<[PricePoint]>> {
        self.series.get(instrument).map(|entry| Arc::clone(entry.value()))
    }

    pub fn latest(&self, instrument: &InstrumentId) -> Option<PricePoint> {
        self.series(instrument).and_then(|s| s.last().cloned())
    }

    /// Last point with `timestamp <= instant`.
    pub fn price_at(
        &self,
        instrument: &InstrumentId,
        instant: DateTime<Utc>,
    ) -> Option<PricePoint> {
        let series = self.series(instrument)?;
        let idx = series.partition_point(|p| p.timestamp <= instant);
        idx.checked_sub(1).map(|i| series[i].clone())
    }

    /// Instruments with a series in memory, sorted.
    pub fn instruments(&self) -> Vec<InstrumentId> {
        let mut ids: Vec<InstrumentId> = self.series.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Points with `from <= timestamp < to`, with percent changes relative to
    /// the first returned point.
    pub fn range_query(
        &self,
        instrument: &InstrumentId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<PricePoint> {
        match self.series(instrument) {
            Some(series) => normalize(window(&series, from, to)),
            None => Vec::new(),
        }
    }

    /// Fetches fresh series for every instrument concurrently, commits each
    /// success and persists it. A failing instrument never affects the others.
    pub async fn refresh(&self, instruments: &[InstrumentId]) -> RefreshReport {
        debug!(
            "Refreshing price history for {} {} instruments",
            instruments.len(),
            self.asset_class
        );
        let outcomes = join_all(instruments.iter().map(|id| self.refresh_one(id))).await;

        let mut report = RefreshReport::default();
        for outcome in outcomes {
            report.push(outcome);
        }

        let failed = report.failures().len();
        if failed > 0 {
            warn!(
                "{} price refresh finished with {} failures out of {}",
                self.asset_class,
                failed,
                instruments.len()
            );
        } else {
            info!(
                "{} price refresh finished for {} instruments",
                self.asset_class,
                instruments.len()
            );
        }
        report
    }

    async fn refresh_one(&self, instrument: &InstrumentId) -> RefreshOutcome {
        match self.fetch(instrument).await {
            Ok(points) => self.commit(instrument, points).await,
            Err(e) => {
                warn!("Failed to fetch price history for {}: {}", instrument, e);
                RefreshOutcome::fetch_failed(instrument.clone(), e.to_string())
            }
        }
    }

    async fn fetch(&self, instrument: &InstrumentId) -> Result<Vec<PricePoint>> {
        let fetch = self.provider.fetch_series(instrument, self.asset_class);
        let points = match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(MarketDataError::Timeout(format!(
                    "no response within {}s",
                    self.fetch_timeout.as_secs()
                ))
                .into())
            }
        };
        if points.is_empty() {
            return Err(MarketDataError::NoData.into());
        }
        Ok(points)
    }

    /// Swaps the new series in, then persists it off the async workers.
    async fn commit(&self, instrument: &InstrumentId, points: Vec<PricePoint>) -> RefreshOutcome {
        let sorted: Arc<[PricePoint]> = canonicalize(points).into();
        let len = sorted.len();
        self.series.insert(instrument.clone(), Arc::clone(&sorted));

        let cache = Arc::clone(&self.cache);
        let id = instrument.clone();
        let saved = task::spawn_blocking(move || cache.save_series(&id, &sorted))
            .await
            .unwrap_or_else(|e| Err(Error::Storage(format!("Cache write task failed: {}", e))));

        match saved {
            Ok(()) => {
                debug!("Refreshed {} with {} points", instrument, len);
                RefreshOutcome::refreshed(instrument.clone(), len)
            }
            Err(e) => {
                warn!("Failed to persist price history for {}: {}", instrument, e);
                RefreshOutcome::persist_failed(instrument.clone(), len, e.to_string())
            }
        }
    }
}
