use serde::{Deserialize, Serialize};

use crate::models::{ModelKey, RegionCode, TimeBucket};

// =========================================================
// Pinned-region series types
// =========================================================

/// Trailing actual/forecast window for a pinned region plus its current-frame KPIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSeries {
    pub region: RegionCode,
    pub region_name: String,
    pub model: ModelKey,
    /// Bucket the current position resolves to.
    pub current_bucket: Option<TimeBucket>,
    /// Time-index entries covered by the window, oldest first.
    pub days: Vec<TimeBucket>,
    pub actual: Vec<Option<f64>>,
    pub forecast: Vec<Option<f64>>,
    /// Split boundary clamped into the window's local coordinates.
    pub split_relative_index: usize,
    pub actual_at_current: Option<f64>,
    pub forecast_at_current: Option<f64>,
    pub error_at_current: Option<f64>,
    /// Region value over the frame total; 0 when the total is 0.
    pub share_of_total: f64,
}

impl RegionSeries {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
