//! Pure helpers over timestamp-ordered price series.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::model::PricePoint;

/// Index of the first point with `timestamp >= instant` (binary search).
///
/// Returns `series.len()` when every point is earlier than `instant`.
pub fn lower_bound(series: &[PricePoint], instant: DateTime<Utc>) -> usize {
    series.partition_point(|p| p.timestamp < instant)
}

/// The sub-slice with `from <= timestamp < to`.
pub fn window(series: &[PricePoint], from: DateTime<Utc>, to: DateTime<Utc>) -> &[PricePoint] {
    if to <= from {
        return &[];
    }
    let start = lower_bound(series, from);
    let end = lower_bound(series, to);
    if start >= end {
        return &[];
    }
    &series[start..end]
}

/// Copies `range` with every percent change recomputed against its first
/// point. The input is left untouched.
///
/// A zero first close would divide by zero; all changes are reported as 0.
pub fn normalize(range: &[PricePoint]) -> Vec<PricePoint> {
    let Some(first) = range.first() else {
        return Vec::new();
    };
    let base = first.close;
    range
        .iter()
        .map(|point| {
            let mut normalized = point.clone();
            normalized.percent_change = if base.is_zero() {
                Decimal::ZERO
            } else {
                (point.close - base) / base * Decimal::ONE_HUNDRED
            };
            normalized
        })
        .collect()
}

/// Sorts a freshly fetched or loaded series by timestamp and drops repeated
/// timestamps, keeping the last observation for each.
pub fn canonicalize(mut series: Vec<PricePoint>) -> Vec<PricePoint> {
    series.sort_by_key(|p| p.timestamp);
    let mut out: Vec<PricePoint> = Vec::with_capacity(series.len());
    for point in series {
        match out.last_mut() {
            Some(last) if last.timestamp == point.timestamp => *last = point,
            _ => out.push(point),
        }
    }
    out
}
