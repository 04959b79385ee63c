//! Price provider error types.

use thiserror::Error;
use yahoo_finance_api::YahooError;

/// Errors that can occur while fetching price history from a provider.
#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No data found")]
    NoData,

    #[error("Timeout: {0}")]
    Timeout(String),
}

impl From<YahooError> for MarketDataError {
    fn from(error: YahooError) -> Self {
        match error {
            YahooError::FetchFailed(e) => MarketDataError::ProviderError(e),
            YahooError::NoQuotes => MarketDataError::NotFound("No quotes found".to_string()),
            YahooError::NoResult => MarketDataError::NotFound("No data found".to_string()),
            _ => MarketDataError::ProviderError(error.to_string()),
        }
    }
}
