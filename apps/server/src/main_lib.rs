use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use tradelens_core::{
    analytics::{load_ledger, AnalyticsService, AnalyticsServiceTrait},
    quotes::{PriceSeriesProvider, YahooSeriesProvider},
    trades::TradeLedger,
    AssetClass,
};
use tradelens_storage_fs::{CsvTradeSource, JsonSeriesCache};

use crate::config::Config;

pub struct AppState {
    pub equity_service: Arc<dyn AnalyticsServiceTrait>,
    pub mutual_fund_service: Arc<dyn AnalyticsServiceTrait>,
}

pub fn init_tracing() {
    let log_format = std::env::var("TL_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let provider = YahooSeriesProvider::new(config.history_days, &config.equity_symbol_suffix)
        .context("Failed to create Yahoo price provider")?;
    build_state_with_provider(config, Arc::new(provider))
}

/// Builds both books against the given price provider.
pub fn build_state_with_provider(
    config: &Config,
    provider: Arc<dyn PriceSeriesProvider>,
) -> anyhow::Result<Arc<AppState>> {
    let equity_service = build_book(
        AssetClass::Equity,
        config.equity_tradebook_dir.as_deref(),
        config,
        provider.clone(),
    )?;
    let mutual_fund_service = build_book(
        AssetClass::MutualFund,
        config.mutual_funds_tradebook_dir.as_deref(),
        config,
        provider,
    )?;

    Ok(Arc::new(AppState {
        equity_service,
        mutual_fund_service,
    }))
}

fn build_book(
    asset_class: AssetClass,
    tradebook_dir: Option<&Path>,
    config: &Config,
    provider: Arc<dyn PriceSeriesProvider>,
) -> anyhow::Result<Arc<dyn AnalyticsServiceTrait>> {
    let ledger = match tradebook_dir {
        Some(dir) => load_ledger(asset_class, &CsvTradeSource::new(), &[dir.to_path_buf()])
            .with_context(|| {
                format!("Failed to build {} ledger from {}", asset_class, dir.display())
            })?,
        None => {
            tracing::warn!("No tradebook configured for {}; book is empty", asset_class);
            TradeLedger::empty(asset_class)
        }
    };

    let cache_dir = config.data_dir.join(asset_class.short_code());
    let service = AnalyticsService::new(
        ledger,
        provider,
        Arc::new(JsonSeriesCache::new(&cache_dir)),
        config.fetch_timeout,
    );
    let warmed = service.warm_cache();
    tracing::info!(
        "{} book ready: {} instruments, {} cached series from {}",
        asset_class,
        service.instruments().len(),
        warmed,
        cache_dir.display()
    );
    Ok(Arc::new(service))
}
