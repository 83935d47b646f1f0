use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

use super::mapdata::MetricStats;
use crate::models::{MetricKey, ModelKey, RegionCode, TimeBucket, ViewMode};

// =========================================================
// Frame types
// =========================================================

/// Metric value per region for one bucket, remembering first-seen row order.
///
/// Serializes as a JSON object in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionValues {
    order: Vec<RegionCode>,
    values: HashMap<RegionCode, f64>,
}

impl RegionValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later writes for the same region replace the value but keep its position.
    pub fn insert(&mut self, region: RegionCode, value: f64) {
        if self.values.insert(region.clone(), value).is_none() {
            self.order.push(region);
        }
    }

    pub fn get(&self, region: &RegionCode) -> Option<f64> {
        self.values.get(region).copied()
    }

    pub fn contains(&self, region: &RegionCode) -> bool {
        self.values.contains_key(region)
    }

    pub fn regions(&self) -> impl Iterator<Item = &RegionCode> {
        self.order.iter()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RegionCode, f64)> {
        self.order.iter().map(move |r| (r, self.values[r]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl FromIterator<(RegionCode, f64)> for RegionValues {
    fn from_iter<T: IntoIterator<Item = (RegionCode, f64)>>(iter: T) -> Self {
        let mut values = RegionValues::new();
        for (region, value) in iter {
            values.insert(region, value);
        }
        values
    }
}

impl Serialize for RegionValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.order.len()))?;
        for (region, value) in self.iter() {
            map.serialize_entry(region, &value)?;
        }
        map.end()
    }
}

/// A region with its value in the current frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRegion {
    pub region: RegionCode,
    pub value: f64,
}

/// Bucket-over-bucket movement of one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDelta {
    pub region: RegionCode,
    pub value: f64,
    pub previous: f64,
    pub delta: f64,
    /// `None` when the previous value is zero or absent: there is no baseline.
    pub pct_change: Option<f64>,
}

/// Aggregates of one (bucket, metric) frame over the participating regions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameAggregates {
    pub value_by_region: RegionValues,
    pub prev_value_by_region: RegionValues,
    /// Regions that took part in the aggregates, in iteration order.
    pub regions: Vec<RegionCode>,
    pub total: f64,
    pub average: f64,
    pub top: Vec<RankedRegion>,
    pub bottom: Vec<RankedRegion>,
    pub risers: Vec<RegionDelta>,
    pub droppers: Vec<RegionDelta>,
    /// Values of the participating regions (absent = 0), for the distribution curve.
    pub values: Vec<f64>,
}

/// Map scaling derived from a metric's stats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorDomain {
    pub lo: f64,
    pub hi: f64,
    pub mid: f64,
}

/// Fill and extrusion of one geography feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionFill {
    pub region: RegionCode,
    pub name: String,
    pub in_scope: bool,
    pub value: Option<f64>,
    pub color: [u8; 4],
    pub elevation: f64,
    /// Outline emphasis for the current top regions.
    pub highlighted: bool,
}

/// Everything the map and the insights panel need for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameView {
    /// Clamped time position.
    pub t: usize,
    pub day: Option<TimeBucket>,
    pub bucket: Option<TimeBucket>,
    pub previous_bucket: Option<TimeBucket>,
    pub is_historic: bool,
    pub view_mode: ViewMode,
    pub model: ModelKey,
    pub metric: MetricKey,
    pub label: String,
    pub stats: Option<MetricStats>,
    pub domain: ColorDomain,
    pub aggregates: FrameAggregates,
    pub fills: Vec<RegionFill>,
}
