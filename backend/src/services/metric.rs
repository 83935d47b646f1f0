//! Maps a (view mode, model) selection to the metric column to read.

use crate::models::{ColumnNames, MetricKey, ModelKey, ViewMode};

pub fn resolve_metric(view: ViewMode, model: ModelKey) -> MetricKey {
    match view {
        ViewMode::Actual => MetricKey::from("y_true"),
        ViewMode::Forecast => MetricKey::new(format!("yhat_{}", model)),
        ViewMode::AbsError => MetricKey::new(format!("abs_err_yhat_{}", model)),
    }
}

/// Like [`resolve_metric`], but the actual view reads the configured actual column.
pub fn resolve_metric_for(view: ViewMode, model: ModelKey, columns: &ColumnNames) -> MetricKey {
    match view {
        ViewMode::Actual => MetricKey::new(columns.actual.clone()),
        _ => resolve_metric(view, model),
    }
}

/// Forecast column of a model, independent of the view mode.
pub fn forecast_metric(model: ModelKey) -> MetricKey {
    resolve_metric(ViewMode::Forecast, model)
}

/// Absolute-error column of a model.
pub fn error_metric(model: ModelKey) -> MetricKey {
    resolve_metric(ViewMode::AbsError, model)
}

/// Panel heading for a selection.
pub fn mode_label(view: ViewMode, model: ModelKey) -> String {
    let model = model.as_str().to_uppercase();
    match view {
        ViewMode::Actual => "Historic Actuals".to_string(),
        ViewMode::Forecast => format!("Forecast ({})", model),
        ViewMode::AbsError => format!("Abs Error ({})", model),
    }
}
