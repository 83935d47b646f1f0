//! Trailing actual/forecast window of a pinned region.

use crate::api::{FrameAggregates, RegionSeries};
use crate::data::Dataset;
use crate::models::{ModelKey, ObservationRow, RegionCode, ViewMode};
use crate::services::frame::{aggregate_buckets, compute_frame_aggregates};
use crate::services::metric::{error_metric, forecast_metric};

/// First time-index position of a window of `window` entries ending at `end`.
pub fn window_start(end: usize, window: usize) -> usize {
    end.saturating_sub(window.saturating_sub(1))
}

/// Global split index mapped into window-local coordinates, clamped to
/// `[0, len - 1]` (0 for an empty window).
pub fn split_relative_index(split_index: usize, start: usize, len: usize) -> usize {
    split_index
        .saturating_sub(start)
        .min(len.saturating_sub(1))
}

/// Region value over the frame total; 0 when the total is 0.
pub fn share_of_total(value: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        value / total
    }
}

/// Series of `region` for the window ending at position `t`.
///
/// `t` is clamped into the time index. `aggregates` must be the frame
/// aggregates of the same position; only the share reads them. The series is
/// all-null for a region without rows.
pub fn extract_region_series(
    dataset: &Dataset,
    region: &RegionCode,
    t: usize,
    model: ModelKey,
    aggregates: &FrameAggregates,
) -> RegionSeries {
    let columns = dataset.columns();
    let end = dataset.clamp_position(t);
    let index = dataset.time_index();
    let start = window_start(end, dataset.options().window);
    let days = index
        .get(start..=end)
        .map(<[_]>::to_vec)
        .unwrap_or_default();

    let forecast_col = forecast_metric(model);
    let error_col = error_metric(model);
    let read = |row: Option<&ObservationRow>, column: &str| row.and_then(|r| r.number(column));

    let mut actual = Vec::with_capacity(days.len());
    let mut forecast = Vec::with_capacity(days.len());
    for day in &days {
        let row = dataset.row(&dataset.bucket_for_day(day), region);
        actual.push(read(row, columns.actual.as_str()));
        forecast.push(read(row, forecast_col.as_str()));
    }

    let current_bucket = index.get(end).map(|d| dataset.bucket_for_day(d));
    let row_now = current_bucket
        .as_ref()
        .and_then(|b| dataset.row(b, region));

    let value = aggregates.value_by_region.get(region).unwrap_or(0.0);

    RegionSeries {
        region: region.clone(),
        region_name: dataset
            .allow_list()
            .display_name(region)
            .map(str::to_string)
            .unwrap_or_else(|| region.to_string()),
        model,
        split_relative_index: split_relative_index(dataset.split_index(), start, days.len()),
        actual_at_current: read(row_now, columns.actual.as_str()),
        forecast_at_current: read(row_now, forecast_col.as_str()),
        error_at_current: read(row_now, error_col.as_str()),
        share_of_total: share_of_total(value, aggregates.total),
        current_bucket,
        days,
        actual,
        forecast,
    }
}

/// Series of `region` at position `t`, computing the frame of the given view.
pub fn region_series_at(
    dataset: &Dataset,
    region: &RegionCode,
    t: usize,
    view: ViewMode,
    model: ModelKey,
) -> RegionSeries {
    let end = dataset.clamp_position(t);
    let index = dataset.time_index();
    let metric = dataset.metric_for(view, model);
    let aggregates = match index.get(end) {
        Some(day) => {
            let bucket = dataset.bucket_for_day(day);
            let previous = index
                .get(end.saturating_sub(1))
                .map(|d| dataset.bucket_for_day(d));
            aggregate_buckets(dataset, &bucket, previous.as_ref(), &metric)
        }
        None => compute_frame_aggregates(Default::default(), Default::default(), Vec::new()),
    };
    extract_region_series(dataset, region, t, model, &aggregates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DatasetOptions;
    use crate::models::TimeBucket;
    use proptest::prelude::*;
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    fn dataset_with_window(rows: Vec<Value>, window: usize) -> Dataset {
        let table = rows
            .into_iter()
            .map(|v| serde_json::from_value::<ObservationRow>(v).unwrap())
            .collect();
        let options = DatasetOptions {
            window,
            ..Default::default()
        };
        Dataset::new(table, json!({}), BTreeMap::new(), options)
    }

    fn weekly(n: usize, split: usize) -> Vec<Value> {
        (0..n)
            .flat_map(|i| {
                let week = format!("w{:03}", i);
                let actual = if i < split { json!(i as f64) } else { Value::Null };
                vec![
                    json!({"state_id": "CA", "week_start": week, "y_true": actual,
                           "yhat_sarimax": i as f64 + 0.5, "abs_err_yhat_sarimax": 0.5}),
                    json!({"state_id": "TX", "week_start": week, "y_true": actual,
                           "yhat_sarimax": 1.0, "abs_err_yhat_sarimax": 0.0}),
                ]
            })
            .collect()
    }

    #[test]
    fn test_window_helpers() {
        assert_eq!(window_start(40, 30), 11);
        assert_eq!(window_start(5, 30), 0);
        assert_eq!(window_start(5, 0), 5);
        assert_eq!(split_relative_index(35, 11, 30), 24);
        assert_eq!(split_relative_index(5, 11, 30), 0);
        assert_eq!(split_relative_index(100, 11, 30), 29);
        assert_eq!(split_relative_index(3, 0, 0), 0);
        assert_eq!(share_of_total(5.0, 0.0), 0.0);
        assert_eq!(share_of_total(5.0, 20.0), 0.25);
    }

    #[test]
    fn test_full_window() {
        let ds = dataset_with_window(weekly(40, 35), 30);
        let series = region_series_at(&ds, &RegionCode::from("ca"), 39, ViewMode::Actual, ModelKey::Sarimax);
        assert_eq!(series.len(), 30);
        assert_eq!(series.days[0], TimeBucket::from("w010"));
        assert_eq!(series.split_relative_index, 25);
        assert_eq!(series.actual[0], Some(10.0));
        assert_eq!(series.actual[29], None);
        assert_eq!(series.forecast[29], Some(39.5));
        assert_eq!(series.actual_at_current, None);
        assert_eq!(series.forecast_at_current, Some(39.5));
        assert_eq!(series.error_at_current, Some(0.5));
        assert_eq!(series.region_name, "California");
    }

    #[test]
    fn test_short_history_is_clamped() {
        let ds = dataset_with_window(weekly(40, 40), 30);
        let series = region_series_at(&ds, &RegionCode::from("CA"), 4, ViewMode::Actual, ModelKey::Sarimax);
        assert_eq!(series.len(), 5);
        assert_eq!(series.split_relative_index, 4);
        assert_eq!(series.actual_at_current, Some(4.0));
        // CA 4 / (CA 4 + TX 4)
        assert_eq!(series.share_of_total, 0.5);
    }

    #[test]
    fn test_region_without_history() {
        let ds = dataset_with_window(weekly(3, 3), 30);
        let series = region_series_at(&ds, &RegionCode::from("NY"), 2, ViewMode::Forecast, ModelKey::Sarimax);
        assert_eq!(series.len(), 3);
        assert!(series.actual.iter().all(Option::is_none));
        assert!(series.forecast.iter().all(Option::is_none));
        assert_eq!(series.share_of_total, 0.0);
        assert_eq!(series.region_name, "New York");
    }

    #[test]
    fn test_empty_dataset() {
        let ds = dataset_with_window(vec![], 30);
        let series = region_series_at(&ds, &RegionCode::from("CA"), 0, ViewMode::Actual, ModelKey::Lgbm);
        assert!(series.is_empty());
        assert_eq!(series.split_relative_index, 0);
        assert!(series.current_bucket.is_none());
    }

    #[test]
    fn test_zero_total_gives_zero_share() {
        let ds = dataset_with_window(
            vec![json!({"state_id": "CA", "week_start": "w1", "y_true": 0.0})],
            30,
        );
        let series = region_series_at(&ds, &RegionCode::from("CA"), 0, ViewMode::Actual, ModelKey::Lgbm);
        assert_eq!(series.share_of_total, 0.0);
    }

    proptest! {
        #[test]
        fn prop_series_length_and_split(n in 1usize..80, split in 0usize..90, t in 0usize..100) {
            let ds = dataset_with_window(weekly(n, split.min(n)), 30);
            let series = region_series_at(&ds, &RegionCode::from("TX"), t, ViewMode::Actual, ModelKey::Sarimax);
            let current = t.min(n - 1);
            prop_assert_eq!(series.len(), 30.min(current + 1));
            prop_assert_eq!(series.actual.len(), series.len());
            prop_assert_eq!(series.forecast.len(), series.len());
            prop_assert!(series.split_relative_index <= series.len() - 1);
        }
    }
}
