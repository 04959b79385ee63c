use std::sync::Arc;

use axum::{
    extract::{RawQuery, State},
    routing::get,
    Json, Router,
};
use tradelens_core::{
    portfolio::{GrowthRow, HoldingSnapshot, PortfolioSummary},
    quotes::{PricePoint, RefreshReport},
};

use super::shared::{self, QueryParams};
use crate::{error::ApiResult, main_lib::AppState};

/// Funds as `"<fund name>:<isin>"`, sorted by name.
async fn list_funds(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<String>>> {
    let funds = state
        .mutual_fund_service
        .instrument_labels()
        .into_iter()
        .map(|(name, isin)| format!("{}:{}", name, isin))
        .collect();
    Ok(Json(funds))
}

async fn get_positions(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<Vec<HoldingSnapshot>>> {
    let query = QueryParams::parse(raw.as_deref())?;
    Ok(Json(shared::positions(state.mutual_fund_service.as_ref(), &query)?))
}

async fn get_trend(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<Vec<PricePoint>>> {
    let query = QueryParams::parse(raw.as_deref())?;
    Ok(Json(shared::trend(state.mutual_fund_service.as_ref(), &query)?))
}

async fn get_summary(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<Vec<PortfolioSummary>>> {
    let query = QueryParams::parse(raw.as_deref())?;
    Ok(Json(shared::summary(state.mutual_fund_service.as_ref(), &query)?))
}

async fn compare_trends(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<Vec<GrowthRow>>> {
    let query = QueryParams::parse(raw.as_deref())?;
    Ok(Json(shared::compare(state.mutual_fund_service.as_ref(), &query)?))
}

async fn refresh_history(State(state): State<Arc<AppState>>) -> ApiResult<Json<RefreshReport>> {
    Ok(Json(shared::refresh(state.mutual_fund_service.as_ref()).await?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/mutual_funds/list", get(list_funds))
        .route("/mutual_funds/positions", get(get_positions))
        .route("/mutual_funds/trend", get(get_trend))
        .route("/mutual_funds/summary", get(get_summary))
        .route("/mutual_funds/trend/compare", get(compare_trends))
        .route("/mutual_funds/history/refresh", get(refresh_history))
}
