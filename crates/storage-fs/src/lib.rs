//! Filesystem storage implementation for Tradelens.
//!
//! Implements the collaborator traits defined in `tradelens-core`:
//! - [`CsvTradeSource`] - `TradeSource` over broker tradebook CSV exports
//! - [`JsonSeriesCache`] - `SeriesCache` persisting one JSON file per instrument
//!
//! ```text
//!        core (domain)
//!             │
//!             ▼
//!   storage-fs (this crate)
//!      │            │
//!      ▼            ▼
//!  tradebook/   data/trends/
//!   *.csv        <id>.json
//! ```

pub mod csv_trade_source;
pub mod errors;
pub mod json_series_cache;

pub use csv_trade_source::CsvTradeSource;
pub use errors::StorageError;
pub use json_series_cache::JsonSeriesCache;
