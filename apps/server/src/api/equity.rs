use std::sync::Arc;

use axum::{
    extract::{RawQuery, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tradelens_core::{
    portfolio::{HoldingSnapshot, PortfolioSummary, TradeBreakdown},
    quotes::{PricePoint, RefreshReport},
};

use super::shared::{self, QueryParams};
use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

async fn list_equities(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<String>>> {
    let symbols = state
        .equity_service
        .instruments()
        .into_iter()
        .map(|id| id.to_string())
        .collect();
    Ok(Json(symbols))
}

async fn get_trend(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<Vec<PricePoint>>> {
    let query = QueryParams::parse(raw.as_deref())?;
    Ok(Json(shared::trend(state.equity_service.as_ref(), &query)?))
}

/// Growth comparison; fewer than two symbols yields an empty object.
async fn compare_trends(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<Value>> {
    let query = QueryParams::parse(raw.as_deref())?;
    if query.symbols().len() < 2 {
        return Ok(Json(json!({})));
    }
    let rows = shared::compare(state.equity_service.as_ref(), &query)?;
    Ok(Json(serde_json::to_value(rows).map_err(anyhow::Error::from)?))
}

async fn refresh_history(State(state): State<Arc<AppState>>) -> ApiResult<Json<RefreshReport>> {
    Ok(Json(shared::refresh(state.equity_service.as_ref()).await?))
}

async fn get_breakdown(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<TradeBreakdown>> {
    let query = QueryParams::parse(raw.as_deref())?;
    let symbol = query.require("symbol")?;
    state
        .equity_service
        .breakdown(symbol)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No trades for symbol: {}", symbol)))
}

async fn get_positions(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<Vec<HoldingSnapshot>>> {
    let query = QueryParams::parse(raw.as_deref())?;
    Ok(Json(shared::positions(state.equity_service.as_ref(), &query)?))
}

async fn get_summary(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<Vec<PortfolioSummary>>> {
    let query = QueryParams::parse(raw.as_deref())?;
    Ok(Json(shared::summary(state.equity_service.as_ref(), &query)?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/equity/list", get(list_equities))
        .route("/equity/trend", get(get_trend))
        .route("/equity/trend/compare", get(compare_trends))
        .route("/equity/history/refresh", get(refresh_history))
        .route("/equity/breakdown", get(get_breakdown))
        .route("/equity/positions", get(get_positions))
        .route("/equity/summary", get(get_summary))
}
