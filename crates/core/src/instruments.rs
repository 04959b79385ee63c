//! Strong types for instrument identity.
//!
//! - `InstrumentId` - ledger key: an equity ticker or a mutual fund ISIN
//! - `AssetClass` - which book an instrument belongs to

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// InstrumentId
// =============================================================================

/// Identifier of a tradable instrument.
///
/// Examples: "INFY", "RELIANCE", "INF846K01EW2"
///
/// Equities are keyed by their exchange symbol and mutual funds by ISIN.
/// Display names (fund names) are kept separately by the ledger so the two
/// are never mixed up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct InstrumentId(pub String);

impl InstrumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for InstrumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for InstrumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for InstrumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// AssetClass
// =============================================================================

/// The book an instrument is tracked in.
///
/// Determines which raw trade column keys the ledger and how instruments are
/// labelled in listings and comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetClass {
    /// Listed shares, keyed by symbol.
    Equity,
    /// Mutual fund units, keyed by ISIN and labelled by fund name.
    MutualFund,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Equity => "EQUITY",
            AssetClass::MutualFund => "MUTUAL_FUND",
        }
    }

    /// Short code used for cache directories ("EQ", "MF").
    pub fn short_code(&self) -> &'static str {
        match self {
            AssetClass::Equity => "EQ",
            AssetClass::MutualFund => "MF",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
