use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tradelens_core::{
    constants::DATE_FORMAT,
    portfolio::{GrowthRow, HoldingSnapshot, PortfolioSummary},
    quotes::{PricePoint, RefreshReport},
    AnalyticsServiceTrait,
};

use crate::error::{ApiError, ApiResult};

/// Query string parameters, parsed leniently so that repeated keys and the
/// `symbol={A,B}` list form both work.
#[derive(Debug, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn parse(raw: Option<&str>) -> ApiResult<Self> {
        let pairs = match raw {
            Some(qs) => serde_urlencoded::from_str::<Vec<(String, String)>>(qs)
                .map_err(|e| ApiError::BadRequest(format!("Invalid query string: {}", e)))?,
            None => Vec::new(),
        };
        Ok(Self { pairs })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, v)| k == key && !v.trim().is_empty())
            .map(|(_, v)| v.trim())
    }

    pub fn require(&self, key: &str) -> ApiResult<&str> {
        self.get(key)
            .ok_or_else(|| ApiError::BadRequest(format!("Missing '{}' query parameter", key)))
    }

    /// Every value given for `symbol`, split on commas with surrounding
    /// braces removed.
    pub fn symbols(&self) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == "symbol" || k == "symbol[]")
            .flat_map(|(_, v)| {
                v.trim()
                    .trim_start_matches('{')
                    .trim_end_matches('}')
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// `from`/`to` as `YYYY-MM-DD`; defaults are the Unix epoch and now.
    pub fn window(&self) -> ApiResult<(DateTime<Utc>, DateTime<Utc>)> {
        let from = match self.get("from") {
            Some(v) => parse_date(v, "from")?,
            None => DateTime::<Utc>::UNIX_EPOCH,
        };
        let to = match self.get("to") {
            Some(v) => parse_date(v, "to")?,
            None => Utc::now(),
        };
        Ok((from, to))
    }
}

fn parse_date(value: &str, field: &str) -> ApiResult<DateTime<Utc>> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| {
            ApiError::BadRequest(format!(
                "Invalid '{}' date '{}', expected YYYY-MM-DD",
                field, value
            ))
        })
}

pub fn trend(
    service: &dyn AnalyticsServiceTrait,
    query: &QueryParams,
) -> ApiResult<Vec<PricePoint>> {
    let symbol = query.require("symbol")?;
    let (from, to) = query.window()?;
    Ok(service.trend(symbol, from, to))
}

/// Growth comparison over every requested symbol. At least one is required.
pub fn compare(
    service: &dyn AnalyticsServiceTrait,
    query: &QueryParams,
) -> ApiResult<Vec<GrowthRow>> {
    let symbols = query.symbols();
    if symbols.is_empty() {
        return Err(ApiError::BadRequest(
            "Missing 'symbol' query parameter".to_string(),
        ));
    }
    let (from, to) = query.window()?;
    Ok(service.compare(&symbols, from, to))
}

pub fn positions(
    service: &dyn AnalyticsServiceTrait,
    query: &QueryParams,
) -> ApiResult<Vec<HoldingSnapshot>> {
    let symbol = query.require("symbol")?;
    let (from, to) = query.window()?;
    Ok(service.holdings(symbol, from, to))
}

pub fn summary(
    service: &dyn AnalyticsServiceTrait,
    query: &QueryParams,
) -> ApiResult<Vec<PortfolioSummary>> {
    let (from, to) = query.window()?;
    Ok(service.summary(from, to))
}

pub async fn refresh(service: &dyn AnalyticsServiceTrait) -> ApiResult<RefreshReport> {
    let report = service.refresh().await?;
    tracing::info!(
        "Refreshed {} price history for {} instruments",
        service.asset_class(),
        report.succeeded().len()
    );
    Ok(report)
}
