use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{ModelKey, RegionCode};

// =========================================================
// Evaluation types
// =========================================================

/// Accuracy of one model over a set of rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelScore {
    /// Weighted absolute percentage error: Σ|y - ŷ| / Σ|y|.
    pub wape: f64,
    /// Signed relative bias: Σ(ŷ - y) / Σy.
    pub bias: f64,
    /// Rows where both the actual and the forecast were present.
    pub count: usize,
}

/// Scores of every model for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionScores {
    pub region: RegionCode,
    pub scores: BTreeMap<ModelKey, ModelScore>,
}

/// Overall and per-region model accuracy over the historic rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub overall: BTreeMap<ModelKey, ModelScore>,
    pub by_region: Vec<RegionScores>,
}
