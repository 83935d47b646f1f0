//! Frame aggregation: per-region values of one (bucket, metric) pair and the
//! totals, rankings and movers derived from them.
//!
//! Only allow-listed regions take part. Participating regions missing from the
//! frame contribute 0 to every aggregate instead of being skipped.

use std::cmp::Ordering;

use serde_json::Value;

use crate::api::{
    ColorDomain, FrameAggregates, FrameView, RankedRegion, RegionDelta, RegionFill, RegionValues,
};
use crate::data::Dataset;
use crate::models::geo::{feature_name, feature_region, features};
use crate::models::{
    ColumnNames, MetricKey, ModelKey, ObservationTable, RegionAllowList, RegionCode, TimeBucket,
    ViewMode,
};
use crate::services::color;
use crate::services::metric::mode_label;

/// Length of the top/bottom rankings.
pub const RANKING_LEN: usize = 3;

/// Length of the riser/dropper lists.
pub const MOVERS_LEN: usize = 5;

/// Finite values of `metric` in `bucket` for allow-listed regions, in row order.
///
/// When a region appears more than once the later row wins.
pub fn values_for_bucket(
    table: &ObservationTable,
    bucket: &TimeBucket,
    metric: &MetricKey,
    columns: &ColumnNames,
    allow_list: &RegionAllowList,
) -> RegionValues {
    table
        .rows_in_bucket(bucket, columns)
        .filter_map(|row| {
            let region = row.region(columns);
            if !allow_list.contains(&region) {
                return None;
            }
            row.number(metric.as_str()).map(|v| (region, v))
        })
        .collect()
}

/// Regions taking part in a frame: allow-listed geography features in feature
/// order, then allow-listed regions of the frame values in row order.
pub fn participating_regions(
    allow_list: &RegionAllowList,
    geojson: &Value,
    values: &RegionValues,
) -> Vec<RegionCode> {
    let mut regions: Vec<RegionCode> = Vec::new();
    let from_geo = features(geojson).into_iter().map(feature_region);
    let from_values = values.regions().cloned();
    for region in from_geo.chain(from_values) {
        if allow_list.contains(&region) && !regions.contains(&region) {
            regions.push(region);
        }
    }
    regions
}

fn by_value_desc(a: &f64, b: &f64) -> Ordering {
    b.partial_cmp(a).unwrap_or(Ordering::Equal)
}

/// Totals, rankings and movers over `regions`.
///
/// `average` divides `total` by the number of participating `regions`, not by
/// the size of the allow-list; it is 0 when there are none. All sorts are
/// stable, so ties keep the order of `regions`.
pub fn compute_frame_aggregates(
    current: RegionValues,
    previous: RegionValues,
    regions: Vec<RegionCode>,
) -> FrameAggregates {
    let entries: Vec<RankedRegion> = regions
        .iter()
        .map(|r| RankedRegion {
            region: r.clone(),
            value: current.get(r).unwrap_or(0.0),
        })
        .collect();

    let values: Vec<f64> = entries.iter().map(|e| e.value).collect();
    // `Sum` for f64 starts at -0.0.
    let total = values.iter().fold(0.0, |acc, v| acc + v);
    let average = if values.is_empty() {
        0.0
    } else {
        total / values.len() as f64
    };

    let mut top = entries.clone();
    top.sort_by(|a, b| by_value_desc(&a.value, &b.value));
    top.truncate(RANKING_LEN);

    let mut bottom = entries.clone();
    bottom.sort_by(|a, b| by_value_desc(&b.value, &a.value));
    bottom.truncate(RANKING_LEN);

    let deltas: Vec<RegionDelta> = entries
        .into_iter()
        .map(|e| {
            let previous = previous.get(&e.region).unwrap_or(0.0);
            let delta = e.value - previous;
            let pct_change = (previous != 0.0).then(|| delta / previous * 100.0);
            RegionDelta {
                region: e.region,
                value: e.value,
                previous,
                delta,
                pct_change,
            }
        })
        .collect();

    let mut risers = deltas.clone();
    risers.sort_by(|a, b| by_value_desc(&a.delta, &b.delta));
    risers.truncate(MOVERS_LEN);

    let mut droppers = deltas;
    droppers.sort_by(|a, b| by_value_desc(&b.delta, &a.delta));
    droppers.truncate(MOVERS_LEN);

    FrameAggregates {
        value_by_region: current,
        prev_value_by_region: previous,
        regions,
        total,
        average,
        top,
        bottom,
        risers,
        droppers,
        values,
    }
}

/// Aggregate one metric between two buckets of a dataset.
///
/// `previous` is `None` when there is no earlier bucket; deltas are then taken
/// against 0 with no percentage baseline.
pub fn aggregate_buckets(
    dataset: &Dataset,
    current: &TimeBucket,
    previous: Option<&TimeBucket>,
    metric: &MetricKey,
) -> FrameAggregates {
    let columns = dataset.columns();
    let allow_list = dataset.allow_list();
    let now = values_for_bucket(dataset.table(), current, metric, columns, allow_list);
    let before = previous
        .map(|b| values_for_bucket(dataset.table(), b, metric, columns, allow_list))
        .unwrap_or_default();
    let regions = participating_regions(allow_list, dataset.geojson(), &now);
    compute_frame_aggregates(now, before, regions)
}

/// Fill and elevation for every geography feature.
pub fn region_fills(
    dataset: &Dataset,
    aggregates: &FrameAggregates,
    domain: &ColorDomain,
    view: ViewMode,
) -> Vec<RegionFill> {
    let allow_list = dataset.allow_list();
    features(dataset.geojson())
        .into_iter()
        .map(|feature| {
            let region = feature_region(feature);
            let in_scope = allow_list.contains(&region);
            let value = aggregates
                .value_by_region
                .get(&region)
                .filter(|_| in_scope);
            let highlighted = in_scope && aggregates.top.iter().any(|t| t.region == region);
            RegionFill {
                name: feature_name(feature, allow_list),
                in_scope,
                value,
                color: color::region_color(domain, view, in_scope, value),
                elevation: color::elevation(domain, view, in_scope, value),
                highlighted,
                region,
            }
        })
        .collect()
}

/// Everything needed to draw position `t` under a view mode and model.
///
/// `t` is clamped into the time index. The previous bucket is the one at
/// `t - 1`, or the current one at the start of the index.
pub fn build_frame_view(dataset: &Dataset, t: usize, view: ViewMode, model: ModelKey) -> FrameView {
    let t = dataset.clamp_position(t);
    let index = dataset.time_index();
    let day = index.get(t).cloned();
    let previous_day = index.get(t.saturating_sub(1)).cloned();
    let bucket = day.as_ref().map(|d| dataset.bucket_for_day(d));
    let previous_bucket = previous_day.as_ref().map(|d| dataset.bucket_for_day(d));

    let metric = dataset.metric_for(view, model);
    let stats = dataset.stats_for(&metric);
    let domain = ColorDomain::from_stats(stats.as_ref());

    let aggregates = match &bucket {
        Some(b) => aggregate_buckets(dataset, b, previous_bucket.as_ref(), &metric),
        None => compute_frame_aggregates(
            RegionValues::new(),
            RegionValues::new(),
            participating_regions(dataset.allow_list(), dataset.geojson(), &RegionValues::new()),
        ),
    };
    let fills = region_fills(dataset, &aggregates, &domain, view);

    log::debug!(
        "Frame t={} bucket={:?} metric={} participants={}",
        t,
        bucket,
        metric,
        aggregates.regions.len()
    );

    FrameView {
        t,
        day,
        bucket,
        previous_bucket,
        is_historic: t < dataset.split_index(),
        view_mode: view,
        model,
        label: mode_label(view, model),
        metric,
        stats,
        domain,
        aggregates,
        fills,
    }
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
