//! Artifact parsing.
//!
//! The artifact is a single JSON document holding the observation table, the
//! geography and an optional day -> bucket mapping. Element names have
//! fallbacks so that older exports keep loading.

use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::dataset::{Dataset, DatasetOptions};
use super::error::{DatasetError, DatasetResult, ErrorContext};
use crate::models::{ObservationRow, ObservationTable, TimeBucket};

#[derive(Debug, Default, Deserialize)]
struct RawArtifact {
    #[serde(default)]
    table: Option<Value>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    geojson: Option<Value>,
    #[serde(default)]
    features: Option<Value>,
    #[serde(default)]
    day_to_week: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    meta: Option<RawMeta>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMeta {
    #[serde(default)]
    day_to_week: Option<BTreeMap<String, Value>>,
}

/// Read and parse the artifact at `path`.
pub fn load_artifact(path: impl AsRef<Path>, options: &DatasetOptions) -> DatasetResult<Dataset> {
    let path = path.as_ref();
    if !path.exists() {
        log::error!("Artifact not found at {}", path.display());
        return Err(DatasetError::missing(path));
    }

    let text = fs::read_to_string(path).map_err(|e| {
        DatasetError::io_with_context(
            e.to_string(),
            ErrorContext::new("load_artifact").with_details(path.display().to_string()),
        )
    })?;

    let dataset = parse_artifact(&text, options)?;
    log::info!(
        "Loaded {} rows from {} ({} buckets, split at {}, {} metrics)",
        dataset.table().len(),
        path.display(),
        dataset.time_index().len(),
        dataset.split_index(),
        dataset.meta().available_metrics.len()
    );
    Ok(dataset)
}

/// Parse an artifact document and derive its metadata.
///
/// A top-level array is read as a bare table without geography.
pub fn parse_artifact(text: &str, options: &DatasetOptions) -> DatasetResult<Dataset> {
    let de = &mut serde_json::Deserializer::from_str(text);
    let doc: Value = serde_path_to_error::deserialize(de)?;

    let (rows, geojson, day_to_week) = match doc {
        Value::Array(items) => (items, empty_collection(), BTreeMap::new()),
        object @ Value::Object(_) => {
            let raw: RawArtifact = serde_path_to_error::deserialize(&object)?;
            split_object(raw, &object)
        }
        other => {
            return Err(DatasetError::invalid_shape(format!(
                "expected an object or an array at the top level, found {}",
                json_kind(&other)
            )))
        }
    };

    let table = table_from_values(rows);
    Ok(Dataset::new(table, geojson, day_to_week, options.clone()))
}

fn split_object(
    raw: RawArtifact,
    doc: &Value,
) -> (Vec<Value>, Value, BTreeMap<TimeBucket, TimeBucket>) {
    let rows = match (raw.table, raw.data) {
        (Some(Value::Array(rows)), _) => rows,
        (_, Some(Value::Array(rows))) => rows,
        _ => Vec::new(),
    };

    let geojson = match (raw.geojson, raw.features) {
        (Some(g), _) if !g.is_null() => g,
        (_, Some(Value::Array(features))) => json!({
            "type": "FeatureCollection",
            "features": features,
        }),
        (_, Some(f)) if !f.is_null() => f,
        _ => doc.clone(),
    };

    let mapping = raw
        .day_to_week
        .or_else(|| raw.meta.and_then(|m| m.day_to_week))
        .unwrap_or_default();

    (rows, geojson, day_mapping(mapping))
}

fn day_mapping(raw: BTreeMap<String, Value>) -> BTreeMap<TimeBucket, TimeBucket> {
    raw.into_iter()
        .filter_map(|(day, bucket)| {
            let bucket = match bucket {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            Some((TimeBucket::new(day), TimeBucket::new(bucket)))
        })
        .collect()
}

fn table_from_values(values: Vec<Value>) -> ObservationTable {
    let mut skipped = 0usize;
    let table: ObservationTable = values
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(map) => Some(ObservationRow::new(map)),
            _ => {
                skipped += 1;
                None
            }
        })
        .collect();
    if skipped > 0 {
        log::warn!("Skipped {} table entries that are not objects", skipped);
    }
    table
}

fn empty_collection() -> Value {
    json!({"type": "FeatureCollection", "features": []})
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
