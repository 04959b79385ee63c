//! Tests for PriceHistoryStore range queries and refresh semantics.

#[cfg(test)]
mod tests {
    use crate::errors::{Error, Result};
    use crate::instruments::{AssetClass, InstrumentId};
    use crate::quotes::{
        MarketDataError, NoOpSeriesCache, PriceHistoryStore, PricePoint, PriceSeriesProvider,
        RefreshStatus, SeriesCache,
    };
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap()
    }

    fn points(closes: &[(u32, Decimal)]) -> Vec<PricePoint> {
        closes
            .iter()
            .map(|(day, close)| PricePoint::new(at(*day), *close))
            .collect()
    }

    // =========================================================================
    // Mock PriceSeriesProvider
    // =========================================================================

    #[derive(Default)]
    struct MockProvider {
        series: HashMap<String, Vec<PricePoint>>,
        failing: Vec<String>,
        slow: Vec<String>,
        calls: Mutex<Vec<String>>,
    }

    impl MockProvider {
        fn with_series(mut self, id: &str, series: Vec<PricePoint>) -> Self {
            self.series.insert(id.to_string(), series);
            self
        }

        fn failing(mut self, id: &str) -> Self {
            self.failing.push(id.to_string());
            self
        }

        fn slow(mut self, id: &str) -> Self {
            self.slow.push(id.to_string());
            self
        }
    }

    #[async_trait]
    impl PriceSeriesProvider for MockProvider {
        async fn fetch_series(
            &self,
            instrument: &InstrumentId,
            _asset_class: AssetClass,
        ) -> Result<Vec<PricePoint>> {
            self.calls.lock().unwrap().push(instrument.to_string());
            if self.slow.iter().any(|s| s == instrument.as_str()) {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if self.failing.iter().any(|s| s == instrument.as_str()) {
                return Err(MarketDataError::ProviderError("upstream 500".to_string()).into());
            }
            Ok(self.series.get(instrument.as_str()).cloned().unwrap_or_default())
        }
    }

    // =========================================================================
    // Mock SeriesCache
    // =========================================================================

    #[derive(Default)]
    struct MockCache {
        saved: Mutex<HashMap<InstrumentId, Vec<PricePoint>>>,
        fail_on_save: bool,
        fail_on_load: bool,
    }

    impl SeriesCache for MockCache {
        fn load_series(&self, instrument: &InstrumentId) -> Result<Option<Vec<PricePoint>>> {
            if self.fail_on_load {
                return Err(Error::Storage("corrupt cache file".to_string()));
            }
            Ok(self.saved.lock().unwrap().get(instrument).cloned())
        }

        fn save_series(&self, instrument: &InstrumentId, series: &[PricePoint]) -> Result<()> {
            if self.fail_on_save {
                return Err(Error::Storage("read-only filesystem".to_string()));
            }
            self.saved
                .lock()
                .unwrap()
                .insert(instrument.clone(), series.to_vec());
            Ok(())
        }
    }

    fn store_with(provider: MockProvider, cache: Arc<dyn SeriesCache>) -> PriceHistoryStore {
        PriceHistoryStore::new(AssetClass::Equity, Arc::new(provider), cache)
    }

    fn empty_store() -> PriceHistoryStore {
        store_with(MockProvider::default(), Arc::new(NoOpSeriesCache))
    }

    // =========================================================================
    // Range queries
    // =========================================================================

    #[test]
    fn test_range_query_is_half_open_and_normalized() {
        let store = empty_store();
        let id = InstrumentId::new("INFY");
        store.insert_series(
            id.clone(),
            points(&[(1, dec!(100)), (2, dec!(110)), (3, dec!(120)), (4, dec!(130))]),
        );

        let range = store.range_query(&id, at(2), at(4));
        assert_eq!(range.len(), 2);
        assert_eq!(range[0].timestamp, at(2));
        assert_eq!(range[1].timestamp, at(3));
        assert_eq!(range[0].percent_change, Decimal::ZERO);
        assert_eq!(range[1].percent_change.round_dp(4), dec!(9.0909));
    }

    #[test]
    fn test_range_query_does_not_mutate_stored_series() {
        let store = empty_store();
        let id = InstrumentId::new("INFY");
        store.insert_series(id.clone(), points(&[(1, dec!(50)), (2, dec!(100))]));

        let first = store.range_query(&id, at(1), at(30));
        let narrower = store.range_query(&id, at(2), at(30));
        let again = store.range_query(&id, at(1), at(30));

        assert_eq!(first, again);
        assert_eq!(first[1].percent_change, dec!(100));
        assert_eq!(narrower[0].percent_change, Decimal::ZERO);
        assert!(store
            .series(&id)
            .unwrap()
            .iter()
            .all(|p| p.percent_change.is_zero()));
    }

    #[test]
    fn test_range_query_empty_cases() {
        let store = empty_store();
        let id = InstrumentId::new("INFY");
        store.insert_series(id.clone(), points(&[(5, dec!(1))]));

        assert!(store.range_query(&InstrumentId::new("NOPE"), at(1), at(30)).is_empty());
        assert!(store.range_query(&id, at(6), at(30)).is_empty());
        assert!(store.range_query(&id, at(10), at(1)).is_empty());
        assert!(store.range_query(&id, at(5), at(5)).is_empty());
    }

    #[test]
    fn test_insert_series_sorts_points() {
        let store = empty_store();
        let id = InstrumentId::new("TCS");
        store.insert_series(id.clone(), points(&[(3, dec!(3)), (1, dec!(1)), (2, dec!(2))]));

        let series = store.series(&id).unwrap();
        assert!(series.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(store.latest(&id).unwrap().close, dec!(3));
    }

    #[test]
    fn test_price_at_returns_last_point_not_after_instant() {
        let store = empty_store();
        let id = InstrumentId::new("TCS");
        store.insert_series(id.clone(), points(&[(2, dec!(20)), (4, dec!(40))]));

        assert!(store.price_at(&id, at(1)).is_none());
        assert_eq!(store.price_at(&id, at(2)).unwrap().close, dec!(20));
        assert_eq!(store.price_at(&id, at(3)).unwrap().close, dec!(20));
        assert_eq!(store.price_at(&id, at(9)).unwrap().close, dec!(40));
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    #[tokio::test]
    async fn test_refresh_partial_failure_updates_the_others() {
        let provider = MockProvider::default()
            .with_series("A", points(&[(2, dec!(2)), (1, dec!(1))]))
            .with_series("B", points(&[(1, dec!(9))]))
            .with_series("C", points(&[(1, dec!(3))]))
            .failing("B");
        let cache = Arc::new(MockCache::default());
        let store = store_with(provider, cache.clone());
        let ids = vec![
            InstrumentId::new("A"),
            InstrumentId::new("B"),
            InstrumentId::new("C"),
        ];

        let report = store.refresh(&ids).await;

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.failures().len(), 1);
        assert_eq!(report.failures()[0].instrument, InstrumentId::new("B"));
        assert_eq!(report.failures()[0].status, RefreshStatus::FetchFailed);
        assert_eq!(store.series(&ids[0]).unwrap().len(), 2);
        assert!(store.series(&ids[1]).is_none());
        assert_eq!(store.latest(&ids[2]).unwrap().close, dec!(3));
        assert_eq!(cache.saved.lock().unwrap().len(), 2);

        match report.into_result().unwrap_err() {
            Error::Refresh(msg) => {
                assert_eq!(msg.lines().count(), 1);
                assert!(msg.starts_with("B: "));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_series() {
        let provider = MockProvider::default().failing("A");
        let store = store_with(provider, Arc::new(NoOpSeriesCache));
        let id = InstrumentId::new("A");
        store.insert_series(id.clone(), points(&[(1, dec!(7))]));

        let report = store.refresh(&[id.clone()]).await;

        assert!(!report.is_success());
        assert_eq!(store.latest(&id).unwrap().close, dec!(7));
    }

    #[tokio::test]
    async fn test_empty_fetch_counts_as_failure() {
        let store = store_with(MockProvider::default(), Arc::new(NoOpSeriesCache));
        let report = store.refresh(&[InstrumentId::new("EMPTY")]).await;
        assert_eq!(report.failures()[0].status, RefreshStatus::FetchFailed);
    }

    #[tokio::test]
    async fn test_persist_failure_keeps_series_committed() {
        let provider = MockProvider::default().with_series("A", points(&[(1, dec!(5))]));
        let cache = Arc::new(MockCache {
            fail_on_save: true,
            ..Default::default()
        });
        let store = store_with(provider, cache);
        let id = InstrumentId::new("A");

        let report = store.refresh(&[id.clone()]).await;

        assert_eq!(report.outcomes[0].status, RefreshStatus::PersistFailed);
        assert_eq!(report.outcomes[0].points, 1);
        assert_eq!(store.latest(&id).unwrap().close, dec!(5));
        assert!(report.into_result().is_err());
    }

    #[derive(Default)]
    struct ThreadRecordingCache {
        save_threads: Mutex<Vec<std::thread::ThreadId>>,
    }

    impl SeriesCache for ThreadRecordingCache {
        fn load_series(&self, _instrument: &InstrumentId) -> Result<Option<Vec<PricePoint>>> {
            Ok(None)
        }

        fn save_series(&self, _instrument: &InstrumentId, _series: &[PricePoint]) -> Result<()> {
            self.save_threads
                .lock()
                .unwrap()
                .push(std::thread::current().id());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_cache_writes_run_off_the_runtime_thread() {
        let provider = MockProvider::default()
            .with_series("A", points(&[(1, dec!(1))]))
            .with_series("B", points(&[(2, dec!(2))]));
        let cache = Arc::new(ThreadRecordingCache::default());
        let store = store_with(provider, cache.clone());

        let report = store
            .refresh(&[InstrumentId::new("A"), InstrumentId::new("B")])
            .await;

        assert!(report.is_success());
        let threads = cache.save_threads.lock().unwrap();
        assert_eq!(threads.len(), 2);
        let runtime_thread = std::thread::current().id();
        assert!(threads.iter().all(|t| *t != runtime_thread));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fetch_times_out_without_blocking_others() {
        let provider = MockProvider::default()
            .with_series("FAST", points(&[(1, dec!(1))]))
            .with_series("SLOW", points(&[(1, dec!(1))]))
            .slow("SLOW");
        let store = store_with(provider, Arc::new(NoOpSeriesCache))
            .with_fetch_timeout(Duration::from_secs(5));

        let report = store
            .refresh(&[InstrumentId::new("SLOW"), InstrumentId::new("FAST")])
            .await;

        assert_eq!(report.outcomes[0].status, RefreshStatus::FetchFailed);
        assert!(report.outcomes[0]
            .error
            .as_deref()
            .unwrap()
            .contains("Timeout"));
        assert!(report.outcomes[1].is_success());
    }

    #[test]
    fn test_load_cached_skips_missing_and_unreadable_entries() {
        let cache = Arc::new(MockCache::default());
        cache
            .save_series(&InstrumentId::new("A"), &points(&[(1, dec!(1))]))
            .unwrap();
        let store = store_with(MockProvider::default(), cache);

        let loaded = store.load_cached(&[InstrumentId::new("A"), InstrumentId::new("B")]);
        assert_eq!(loaded, 1);
        assert_eq!(store.instruments(), vec![InstrumentId::new("A")]);

        let broken = store_with(
            MockProvider::default(),
            Arc::new(MockCache {
                fail_on_load: true,
                ..Default::default()
            }),
        );
        assert_eq!(broken.load_cached(&[InstrumentId::new("A")]), 0);
    }
}
