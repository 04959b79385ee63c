//! End-to-end: CSV tradebooks on disk feed a book whose refreshed series are
//! persisted as JSON and reloaded by a fresh service.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use tradelens_core::quotes::{PricePoint, PriceSeriesProvider};
use tradelens_core::trades::LedgerError;
use tradelens_core::{AnalyticsService, AnalyticsServiceTrait, AssetClass, Error, InstrumentId};
use tradelens_storage_fs::{CsvTradeSource, JsonSeriesCache};

struct FixedProvider;

#[async_trait]
impl PriceSeriesProvider for FixedProvider {
    async fn fetch_series(
        &self,
        _instrument: &InstrumentId,
        _asset_class: AssetClass,
    ) -> tradelens_core::Result<Vec<PricePoint>> {
        Ok(vec![
            PricePoint::new(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(), dec!(100)),
            PricePoint::new(Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap(), dec!(110)),
        ])
    }
}

const TRADEBOOK: &str = "\
symbol,isin,trade_date,exchange,segment,series,trade_type,auction,quantity,price,trade_id,order_id,order_execution_time
INFY,INE009A01021,2024-01-02,NSE,EQ,EQ,buy,false,10,100,T1,O1,2024-01-02T09:30:00
INFY,INE009A01021,2024-01-02,NSE,EQ,EQ,buy,false,10,100,T1,O1,2024-01-02T09:30:00
symbol,isin,trade_date,exchange,segment,series,trade_type,auction,quantity,price,trade_id,order_id,order_execution_time
TCS,INE467B01029,2024-01-03,NSE,EQ,EQ,BUY,false,1,3500,T2,O2,2024-01-03T09:30:00
";

#[tokio::test]
async fn test_tradebook_to_cached_series_and_back() {
    let dir = tempdir().unwrap();
    let tradebook = dir.path().join("tradebook");
    fs::create_dir_all(&tradebook).unwrap();
    fs::write(tradebook.join("2024.csv"), TRADEBOOK).unwrap();
    let cache_root = dir.path().join("trends").join("EQ");

    let service = AnalyticsService::from_source(
        AssetClass::Equity,
        &CsvTradeSource::new(),
        &[tradebook.clone()],
        Arc::new(FixedProvider),
        Arc::new(JsonSeriesCache::new(&cache_root)),
        Duration::from_secs(5),
    )
    .unwrap();

    assert_eq!(
        service.instruments(),
        vec![InstrumentId::new("INFY"), InstrumentId::new("TCS")]
    );
    assert_eq!(service.breakdown("INFY").unwrap().total_buy_qty, dec!(10));

    let report = service.refresh().await.unwrap();
    assert_eq!(report.succeeded().len(), 2);
    assert!(cache_root.join("INFY.json").exists());
    assert!(cache_root.join("TCS.json").exists());

    let reloaded = AnalyticsService::from_source(
        AssetClass::Equity,
        &CsvTradeSource::new(),
        &[tradebook],
        Arc::new(FixedProvider),
        Arc::new(JsonSeriesCache::new(&cache_root)),
        Duration::from_secs(5),
    )
    .unwrap();
    assert_eq!(reloaded.warm_cache(), 2);

    let trend = reloaded.trend(
        "INFY",
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
    );
    assert_eq!(trend.len(), 2);
    assert_eq!(trend[1].percent_change, dec!(10));
}

#[test]
fn test_undecodable_tradebook_is_a_ledger_error() {
    let dir = tempdir().unwrap();
    let mut content = TRADEBOOK
        .lines()
        .take(2)
        .collect::<Vec<_>>()
        .join("\n")
        .into_bytes();
    content.extend_from_slice(
        b"\nTCS,INE467B01029,2024-01-03,NSE,EQ,EQ,buy,false,1,\xff\xfe,T2,O2,\n",
    );
    let path = dir.path().join("a.csv");
    fs::write(&path, content).unwrap();

    let err = AnalyticsService::from_source(
        AssetClass::Equity,
        &CsvTradeSource::new(),
        &[path],
        Arc::new(FixedProvider),
        Arc::new(JsonSeriesCache::new(dir.path().join("trends"))),
        Duration::from_secs(5),
    )
    .err()
    .unwrap();
    match err {
        Error::Ledger(LedgerError::Source { location, .. }) => {
            assert!(location.ends_with("a.csv"))
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
