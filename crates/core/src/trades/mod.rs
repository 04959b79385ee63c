//! Trades module - tradebook rows, the trade ledger and its source trait.

mod ledger;
mod trades_errors;
mod trades_model;
mod trades_traits;


pub use ledger::{LedgerBuilder, TradeLedger};
pub use trades_errors::LedgerError;
pub use trades_model::{RawTradeRow, Trade, TradeId, TradeSide};
pub use trades_traits::TradeSource;
