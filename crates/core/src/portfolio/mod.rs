//! Portfolio analytics over trade ledgers and price history.

pub mod breakdown;
pub mod comparison;
pub mod performance;
pub mod replay;
pub mod summary;


pub use breakdown::{TradeBreakdown, TradeRecord};
pub use comparison::{compare, GrowthRow};
pub use performance::{cagr, cash_flows, money_weighted_return, xirr, CashFlow};
pub use replay::{replay, replay_in_range, HoldingSnapshot};
pub use summary::{summarize, PortfolioSummary};
