//! Canonical time index and the historic/forecast split point.

use std::collections::{BTreeSet, HashSet};

use crate::models::{ColumnNames, ObservationTable, TimeBucket};

/// Sorted, deduplicated bucket ids of the table.
///
/// Ordering is lexical, which matches chronology for zero-padded ISO-like ids.
/// Rows without a bucket id are skipped.
pub fn build_time_index(table: &ObservationTable, columns: &ColumnNames) -> Vec<TimeBucket> {
    table
        .rows()
        .iter()
        .filter_map(|r| r.bucket(columns))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Position of the first bucket in which any row lacks an actual value.
///
/// A single missing actual is enough to mark the bucket as the forecast
/// boundary, even if other rows of that bucket carry ground truth. Returns
/// `time_index.len()` when every bucket is fully observed.
pub fn find_split_index(
    table: &ObservationTable,
    time_index: &[TimeBucket],
    columns: &ColumnNames,
) -> usize {
    let missing: HashSet<TimeBucket> = table
        .rows()
        .iter()
        .filter(|r| r.number(&columns.actual).is_none())
        .filter_map(|r| r.bucket(columns))
        .collect();

    time_index
        .iter()
        .position(|b| missing.contains(b))
        .unwrap_or(time_index.len())
}
