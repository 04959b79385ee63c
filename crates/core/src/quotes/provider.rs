//! Yahoo Finance backed price history provider.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use log::{debug, warn};
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

use super::errors::MarketDataError;
use super::model::PricePoint;
use super::store::PriceSeriesProvider;
use crate::errors::Result;
use crate::instruments::{AssetClass, InstrumentId};

/// Default lookback for a full history fetch.
pub const DEFAULT_HISTORY_DAYS: i64 = 3650;

/// Fetches daily closes from Yahoo Finance.
///
/// Equity tickers are suffixed with the exchange code (`.NS` for NSE by
/// default). Mutual fund identifiers are passed through unchanged, so the
/// trade source must key funds by a symbol Yahoo understands.
pub struct YahooSeriesProvider {
    connector: yahoo::YahooConnector,
    history_days: i64,
    equity_suffix: String,
}

impl YahooSeriesProvider {
    pub fn new(history_days: i64, equity_suffix: impl Into<String>) -> Result<Self> {
        let connector = yahoo::YahooConnector::new().map_err(|e| {
            MarketDataError::ProviderError(format!("Failed to initialize Yahoo connector: {}", e))
        })?;
        Ok(Self {
            connector,
            history_days,
            equity_suffix: equity_suffix.into(),
        })
    }

    /// Provider symbol for an instrument of the given class.
    pub fn provider_symbol(&self, instrument: &InstrumentId, asset_class: AssetClass) -> String {
        let id = instrument.as_str();
        match asset_class {
            AssetClass::Equity if !self.equity_suffix.is_empty() && !id.contains('.') => {
                format!("{}{}", id, self.equity_suffix)
            }
            _ => id.to_string(),
        }
    }

    fn chrono_to_offset_datetime(dt: DateTime<Utc>) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(dt.timestamp())
            .unwrap_or_else(|_| OffsetDateTime::now_utc())
    }

    fn to_price_point(quote: yahoo::Quote) -> Option<PricePoint> {
        let timestamp = Utc.timestamp_opt(quote.timestamp as i64, 0).single()?;
        let close = Decimal::from_f64_retain(quote.close)?;
        Some(PricePoint {
            timestamp,
            close,
            percent_change: Decimal::ZERO,
            open: Decimal::from_f64_retain(quote.open),
            high: Decimal::from_f64_retain(quote.high),
            low: Decimal::from_f64_retain(quote.low),
            volume: Decimal::from_u64(quote.volume),
        })
    }
}

#[async_trait]
impl PriceSeriesProvider for YahooSeriesProvider {
    async fn fetch_series(
        &self,
        instrument: &InstrumentId,
        asset_class: AssetClass,
    ) -> Result<Vec<PricePoint>> {
        let symbol = self.provider_symbol(instrument, asset_class);
        let end = Utc::now();
        let start = end - Duration::days(self.history_days);
        debug!(
            "Fetching price history for {} from {} to {} from Yahoo",
            symbol,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        );

        let response = self
            .connector
            .get_quote_history(
                &symbol,
                Self::chrono_to_offset_datetime(start),
                Self::chrono_to_offset_datetime(end),
            )
            .await
            .map_err(MarketDataError::from)?;

        let quotes = response.quotes().map_err(MarketDataError::from)?;
        let total = quotes.len();
        let points: Vec<PricePoint> = quotes.into_iter().filter_map(Self::to_price_point).collect();
        if points.len() < total {
            warn!(
                "Skipped {} unconvertible quotes for {}",
                total - points.len(),
                symbol
            );
        }
        if points.is_empty() {
            return Err(MarketDataError::NoData.into());
        }
        Ok(points)
    }
}
