//! Tradelens Core - trade ledgers, price history and portfolio analytics.
//!
//! This crate contains the analytics engine. It is storage-agnostic and
//! defines the `TradeSource` and `SeriesCache` traits that are implemented
//! by the `storage-fs` crate.

pub mod analytics;
pub mod constants;
pub mod errors;
pub mod instruments;
pub mod portfolio;
pub mod quotes;
pub mod trades;

pub use analytics::{AnalyticsService, AnalyticsServiceTrait};
pub use instruments::{AssetClass, InstrumentId};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
