use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::geo::CoordinateReport;
use crate::models::{MetricKey, ObservationTable, TimeBucket};

// =========================================================
// Map data types
// =========================================================

/// Robust distribution summary of one metric column, used for color-domain scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub min: f64,
    pub max: f64,
    pub p05: f64,
    pub p50: f64,
    pub p95: f64,
}

impl Default for MetricStats {
    /// Stats of a column without any value.
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            p05: 0.0,
            p50: 0.0,
            p95: 0.0,
        }
    }
}

/// Derived metadata computed once per loaded dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMeta {
    /// Sorted unique bucket ids.
    pub time_index: Vec<TimeBucket>,
    /// First position without ground truth; equals `time_index.len()` when none.
    pub split_index: usize,
    pub available_metrics: Vec<MetricKey>,
    pub default_metric: MetricKey,
    pub stats: BTreeMap<MetricKey, MetricStats>,
    /// Optional day -> bucket mapping for finer-grained time indices.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub day_to_week: BTreeMap<TimeBucket, TimeBucket>,
}

/// Complete payload handed to the rendering layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapData {
    pub meta: MapMeta,
    pub geojson: serde_json::Value,
    pub table: ObservationTable,
    /// Present when the geometry was coordinate-normalized for this response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<CoordinateReport>,
}
