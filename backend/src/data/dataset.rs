//! The loaded dataset: the immutable table plus metadata derived once per load.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use crate::api::{MapData, MapMeta, MetricStats};
use crate::models::geo::normalize_lon_lat;
use crate::models::{
    ColumnNames, MetricKey, ModelKey, ObservationRow, ObservationTable, RegionAllowList,
    RegionCode, TimeBucket, ViewMode,
};
use crate::services::metric::resolve_metric_for;
use crate::services::{stats, time_index};

/// Default length of the pinned-region trailing window.
pub const DEFAULT_SERIES_WINDOW: usize = 30;

/// How the artifact is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetOptions {
    pub columns: ColumnNames,
    /// Regions taking part in aggregation.
    pub allow_list: RegionAllowList,
    /// Pinned-series window length.
    pub window: usize,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            allow_list: RegionAllowList::project(),
            window: DEFAULT_SERIES_WINDOW,
        }
    }
}

/// An observation table with its derived metadata.
#[derive(Debug, Clone)]
pub struct Dataset {
    table: ObservationTable,
    geojson: Value,
    meta: MapMeta,
    /// (bucket, region) -> row position; later rows win.
    row_index: HashMap<(TimeBucket, RegionCode), usize>,
    options: DatasetOptions,
    loaded_at: DateTime<Utc>,
}

impl Dataset {
    /// Derive the time index, split point, metric list and stats for `table`.
    pub fn new(
        table: ObservationTable,
        geojson: Value,
        day_to_week: BTreeMap<TimeBucket, TimeBucket>,
        options: DatasetOptions,
    ) -> Self {
        let columns = &options.columns;
        let time_index = time_index::build_time_index(&table, columns);
        let split_index = time_index::find_split_index(&table, &time_index, columns);
        let available_metrics = stats::available_metrics(&table, columns);
        let default_metric = stats::default_metric(&available_metrics, columns);
        let stats = stats::compute_all_stats(&table, &available_metrics);

        let mut row_index = HashMap::with_capacity(table.len());
        for (pos, row) in table.rows().iter().enumerate() {
            if let Some(bucket) = row.bucket(columns) {
                row_index.insert((bucket, row.region(columns)), pos);
            }
        }

        let meta = MapMeta {
            time_index,
            split_index,
            available_metrics,
            default_metric,
            stats,
            day_to_week,
        };

        Self {
            table,
            geojson,
            meta,
            row_index,
            options,
            loaded_at: Utc::now(),
        }
    }

    pub fn table(&self) -> &ObservationTable {
        &self.table
    }

    pub fn geojson(&self) -> &Value {
        &self.geojson
    }

    pub fn meta(&self) -> &MapMeta {
        &self.meta
    }

    pub fn options(&self) -> &DatasetOptions {
        &self.options
    }

    pub fn columns(&self) -> &ColumnNames {
        &self.options.columns
    }

    pub fn allow_list(&self) -> &RegionAllowList {
        &self.options.allow_list
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn time_index(&self) -> &[TimeBucket] {
        &self.meta.time_index
    }

    pub fn split_index(&self) -> usize {
        self.meta.split_index
    }

    /// Metric column shown by a selection, honoring the configured actual column.
    pub fn metric_for(&self, view: ViewMode, model: ModelKey) -> MetricKey {
        resolve_metric_for(view, model, self.columns())
    }

    pub fn stats_for(&self, metric: &MetricKey) -> Option<MetricStats> {
        self.meta.stats.get(metric).copied()
    }

    /// Row of `region` in `bucket`, if any.
    pub fn row(&self, bucket: &TimeBucket, region: &RegionCode) -> Option<&ObservationRow> {
        self.row_index
            .get(&(bucket.clone(), region.clone()))
            .and_then(|pos| self.table.rows().get(*pos))
    }

    /// Bucket a time-index entry aggregates into. Unmapped entries are buckets themselves.
    pub fn bucket_for_day(&self, day: &TimeBucket) -> TimeBucket {
        self.meta
            .day_to_week
            .get(day)
            .cloned()
            .unwrap_or_else(|| day.clone())
    }

    /// Clamp a requested position into `[0, len - 1]` (0 for an empty index).
    pub fn clamp_position(&self, t: usize) -> usize {
        t.min(self.time_index().len().saturating_sub(1))
    }

    /// The map-data payload, optionally with coordinate-normalized geography.
    pub fn map_data(&self, normalize: bool) -> MapData {
        let (geojson, coordinates) = if normalize {
            let (fixed, report) = normalize_lon_lat(&self.geojson);
            (fixed, Some(report))
        } else {
            (self.geojson.clone(), None)
        };

        MapData {
            meta: self.meta.clone(),
            geojson,
            table: self.table.clone(),
            coordinates,
        }
    }
}
