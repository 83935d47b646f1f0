//! Per-metric distribution summaries used to scale the color domain.

use std::collections::BTreeMap;

use crate::api::MetricStats;
use crate::models::{ColumnNames, MetricKey, ObservationTable};

/// Linear-interpolated quantile of an ascending-sorted slice.
///
/// `pos = (len - 1) * q`; the result interpolates between `sorted[floor(pos)]`
/// and the next element, or is `sorted[floor(pos)]` when there is no next one.
/// Empty input yields 0.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = (sorted.len() - 1) as f64 * q;
    let base = pos.floor() as usize;
    let rest = pos - base as f64;
    match sorted.get(base + 1) {
        Some(next) => sorted[base] + rest * (next - sorted[base]),
        None => sorted[base],
    }
}

/// Summarize a set of finite values. Non-finite entries are dropped first.
pub fn compute_stats(values: &[f64]) -> MetricStats {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return MetricStats::default();
    }
    sorted.sort_by(f64::total_cmp);

    MetricStats {
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        p05: quantile(&sorted, 0.05),
        p50: quantile(&sorted, 0.5),
        p95: quantile(&sorted, 0.95),
    }
}

/// Stats of one column over the whole table (not per bucket).
pub fn compute_metric_stats(table: &ObservationTable, metric: &MetricKey) -> MetricStats {
    let values: Vec<f64> = table
        .rows()
        .iter()
        .filter_map(|r| r.number(metric.as_str()))
        .collect();
    compute_stats(&values)
}

/// Stats for every metric, computed once per table.
pub fn compute_all_stats(
    table: &ObservationTable,
    metrics: &[MetricKey],
) -> BTreeMap<MetricKey, MetricStats> {
    metrics
        .iter()
        .map(|m| (m.clone(), compute_metric_stats(table, m)))
        .collect()
}

/// Columns of the first row that are numeric or null, excluding identifier columns.
///
/// Column order follows the artifact.
pub fn available_metrics(table: &ObservationTable, columns: &ColumnNames) -> Vec<MetricKey> {
    let Some(sample) = table.first() else {
        return Vec::new();
    };
    sample
        .0
        .iter()
        .filter(|(name, _)| !columns.is_id_column(name))
        .filter(|(_, value)| value.is_number() || value.is_null())
        .map(|(name, _)| MetricKey::new(name.as_str()))
        .collect()
}

/// The actual column when offered, else the first metric, else the actual column name.
pub fn default_metric(available: &[MetricKey], columns: &ColumnNames) -> MetricKey {
    available
        .iter()
        .find(|m| m.as_str() == columns.actual)
        .or_else(|| available.first())
        .cloned()
        .unwrap_or_else(|| MetricKey::new(columns.actual.as_str()))
}
