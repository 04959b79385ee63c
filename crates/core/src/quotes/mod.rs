//! Price history module.
//!
//! - [`model`] - `PricePoint`
//! - [`store`] - Provider and cache traits implemented outside the engine
//! - [`history`] - In-memory `PriceHistoryStore` with range queries and refresh
//! - [`refresh`] - Per-instrument refresh outcomes
//! - [`series`] - Pure helpers over sorted series
//! - [`provider`] - Yahoo Finance implementation of `PriceSeriesProvider`
//!
//! ```text
//! PriceHistoryStore ──fetch──▶ PriceSeriesProvider (Yahoo)
//!        │
//!        └──persist──▶ SeriesCache (JSON files)
//! ```

pub mod errors;
pub mod history;
pub mod model;
pub mod provider;
pub mod refresh;
pub mod series;
pub mod store;

#[cfg(test)]
mod history_tests;

pub use errors::MarketDataError;
pub use history::{PriceHistoryStore, DEFAULT_FETCH_TIMEOUT};
pub use model::PricePoint;
pub use provider::{YahooSeriesProvider, DEFAULT_HISTORY_DAYS};
pub use refresh::{RefreshOutcome, RefreshReport, RefreshStatus};
pub use store::{NoOpSeriesCache, PriceSeriesProvider, SeriesCache};
