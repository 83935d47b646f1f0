//! Forecast accuracy reporting (WAPE and relative bias) over rows with ground truth.

use std::collections::BTreeMap;

use crate::api::{EvaluationReport, ModelScore, RegionScores};
use crate::data::Dataset;
use crate::models::{ColumnNames, ModelKey, ObservationRow, RegionCode};
use crate::services::metric::forecast_metric;

fn denominator(value: f64) -> f64 {
    if value == 0.0 {
        1.0
    } else {
        value
    }
}

/// `Σ|y - ŷ| / Σ|y|`, with a denominator of 1 when the actuals sum to 0.
pub fn wape(pairs: &[(f64, f64)]) -> f64 {
    let num: f64 = pairs.iter().map(|(y, yhat)| (y - yhat).abs()).sum();
    let den: f64 = pairs.iter().map(|(y, _)| y.abs()).sum();
    num / denominator(den)
}

/// `Σ(ŷ - y) / Σy`, with a denominator of 1 when the actuals sum to 0.
pub fn bias(pairs: &[(f64, f64)]) -> f64 {
    let num: f64 = pairs.iter().map(|(y, yhat)| yhat - y).sum();
    let den: f64 = pairs.iter().map(|(y, _)| y).sum();
    num / denominator(den)
}

fn score<'a>(
    rows: impl Iterator<Item = &'a ObservationRow>,
    columns: &ColumnNames,
    model: ModelKey,
) -> ModelScore {
    let forecast = forecast_metric(model);
    let pairs: Vec<(f64, f64)> = rows
        .filter_map(|r| Some((r.number(&columns.actual)?, r.number(forecast.as_str())?)))
        .collect();
    ModelScore {
        wape: wape(&pairs),
        bias: bias(&pairs),
        count: pairs.len(),
    }
}

fn score_all<'a>(
    rows: &[&'a ObservationRow],
    columns: &ColumnNames,
) -> BTreeMap<ModelKey, ModelScore> {
    ModelKey::ALL
        .iter()
        .map(|m| (*m, score(rows.iter().copied(), columns, *m)))
        .collect()
}

/// Scores of every model overall and per allow-listed region.
///
/// Only allow-listed rows are scored. Regions appear in allow-list order and
/// are omitted when no model has a scorable row for them.
pub fn evaluate(dataset: &Dataset) -> EvaluationReport {
    let columns = dataset.columns();
    let allow_list = dataset.allow_list();

    let mut by_code: BTreeMap<RegionCode, Vec<&ObservationRow>> = BTreeMap::new();
    for row in dataset.table().rows() {
        let region = row.region(columns);
        if allow_list.contains(&region) {
            by_code.entry(region).or_default().push(row);
        }
    }

    let all_rows: Vec<&ObservationRow> = by_code.values().flatten().copied().collect();
    let overall = score_all(&all_rows, columns);

    let by_region = allow_list
        .codes()
        .filter_map(|code| {
            let rows = by_code.get(code)?;
            let scores = score_all(rows, columns);
            scores.values().any(|s| s.count > 0).then(|| RegionScores {
                region: code.clone(),
                scores,
            })
        })
        .collect();

    EvaluationReport { overall, by_region }
}
