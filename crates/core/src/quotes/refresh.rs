//! Outcome reporting for price history refreshes.

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::instruments::InstrumentId;

/// What happened to one instrument during a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefreshStatus {
    /// New series fetched, committed and persisted.
    Refreshed,
    /// Fetch failed or timed out; the previous series (if any) is untouched.
    FetchFailed,
    /// New series committed in memory but could not be written to the cache.
    PersistFailed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshOutcome {
    pub instrument: InstrumentId,
    pub status: RefreshStatus,
    /// Points in the committed series. Zero on fetch failure.
    pub points: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RefreshOutcome {
    pub fn refreshed(instrument: InstrumentId, points: usize) -> Self {
        Self {
            instrument,
            status: RefreshStatus::Refreshed,
            points,
            error: None,
        }
    }

    pub fn fetch_failed(instrument: InstrumentId, error: impl Into<String>) -> Self {
        Self {
            instrument,
            status: RefreshStatus::FetchFailed,
            points: 0,
            error: Some(error.into()),
        }
    }

    pub fn persist_failed(
        instrument: InstrumentId,
        points: usize,
        error: impl Into<String>,
    ) -> Self {
        Self {
            instrument,
            status: RefreshStatus::PersistFailed,
            points,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RefreshStatus::Refreshed
    }
}

/// Per-instrument results of one refresh call, in request order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    pub outcomes: Vec<RefreshOutcome>,
}

impl RefreshReport {
    pub fn push(&mut self, outcome: RefreshOutcome) {
        self.outcomes.push(outcome);
    }

    /// Instruments that were fully refreshed.
    pub fn succeeded(&self) -> Vec<&InstrumentId> {
        self.outcomes
            .iter()
            .filter(|o| o.is_success())
            .map(|o| &o.instrument)
            .collect()
    }

    pub fn failures(&self) -> Vec<&RefreshOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success()).collect()
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(RefreshOutcome::is_success)
    }

    /// Collapses the report into a single result. Every failing instrument
    /// contributes one line to the error message.
    pub fn into_result(self) -> Result<RefreshReport> {
        if self.is_success() {
            return Ok(self);
        }
        let message = self
            .failures()
            .iter()
            .map(|o| {
                format!(
                    "{}: {}",
                    o.instrument,
                    o.error.as_deref().unwrap_or("unknown error")
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        Err(Error::Refresh(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_result_lists_each_failure_on_its_own_line() {
        let mut report = RefreshReport::default();
        report.push(RefreshOutcome::refreshed(InstrumentId::new("A"), 3));
        report.push(RefreshOutcome::fetch_failed(InstrumentId::new("B"), "timed out"));
        report.push(RefreshOutcome::persist_failed(InstrumentId::new("C"), 2, "disk full"));

        assert_eq!(report.succeeded(), vec![&InstrumentId::new("A")]);
        let err = report.into_result().unwrap_err();
        match err {
            Error::Refresh(msg) => assert_eq!(msg, "B: timed out\nC: disk full"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_report_is_success() {
        assert!(RefreshReport::default().into_result().is_ok());
    }
}
