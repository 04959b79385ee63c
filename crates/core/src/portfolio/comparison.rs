//! Aligns several instruments' normalized trends on one time axis.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::instruments::InstrumentId;
use crate::quotes::PriceHistoryStore;

/// One timestamp of a growth comparison.
///
/// Serialises flat: `{"time": "...", "<label>": <percent>, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthRow {
    pub time: DateTime<Utc>,
    #[serde(flatten)]
    pub values: BTreeMap<String, Decimal>,
}

/// Builds one row per distinct timestamp across the instruments' range
/// queries. Every row carries a cell for every requested instrument; an
/// instrument without a point at that timestamp reads 0.
///
/// Cells are keyed by `label(instrument)`. Rows are sorted by time.
pub fn compare<F>(
    store: &PriceHistoryStore,
    instruments: &[InstrumentId],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    label: F,
) -> Vec<GrowthRow>
where
    F: Fn(&InstrumentId) -> String,
{
    let mut seen = HashSet::new();
    let requested: Vec<(&InstrumentId, String)> = instruments
        .iter()
        .filter(|id| seen.insert(*id))
        .map(|id| (id, label(id)))
        .collect();

    let mut rows: BTreeMap<DateTime<Utc>, BTreeMap<String, Decimal>> = BTreeMap::new();
    for (instrument, cell) in &requested {
        for point in store.range_query(instrument, from, to) {
            let row = rows.entry(point.timestamp).or_insert_with(|| {
                requested
                    .iter()
                    .map(|(_, name)| (name.clone(), Decimal::ZERO))
                    .collect()
            });
            row.insert(cell.clone(), point.percent_change);
        }
    }

    rows.into_iter()
        .map(|(time, values)| GrowthRow { time, values })
        .collect()
}
