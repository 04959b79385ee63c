//! Analytics module - the per-book service facade over ledger, price history
//! and portfolio metrics.

mod analytics_service;
mod analytics_traits;


pub use analytics_service::{load_ledger, AnalyticsService};
pub use analytics_traits::AnalyticsServiceTrait;
