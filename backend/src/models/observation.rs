//! Observation rows as they appear in the artifact's table.
//!
//! The field set is data driven: only the region, bucket and actual columns are
//! known up front, every other numeric column is a metric.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::region::RegionCode;
use crate::define_key_type;

define_key_type!(TimeBucket);
define_key_type!(MetricKey);

/// Names of the columns the pipeline needs to understand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    #[serde(default = "default_region_column")]
    pub region: String,
    #[serde(default = "default_bucket_column")]
    pub bucket: String,
    #[serde(default = "default_actual_column")]
    pub actual: String,
    /// Identifier/date columns never offered as metrics.
    #[serde(default = "default_id_columns")]
    pub id_columns: Vec<String>,
}

fn default_region_column() -> String {
    "state_id".to_string()
}

fn default_bucket_column() -> String {
    "week_start".to_string()
}

fn default_actual_column() -> String {
    "y_true".to_string()
}

fn default_id_columns() -> Vec<String> {
    ["state_id", "week_start", "date", "id"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            region: default_region_column(),
            bucket: default_bucket_column(),
            actual: default_actual_column(),
            id_columns: default_id_columns(),
        }
    }
}

impl ColumnNames {
    pub fn is_id_column(&self, column: &str) -> bool {
        self.id_columns.iter().any(|c| c == column)
    }
}

/// A single table record keyed by region and time bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservationRow(pub Map<String, Value>);

impl ObservationRow {
    pub fn new(fields: Map<String, Value>) -> Self {
        ObservationRow(fields)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Finite numeric value of a column. Missing, `null`, non-numeric and
    /// non-finite values all read as absent.
    pub fn number(&self, column: &str) -> Option<f64> {
        self.0.get(column).and_then(finite_number)
    }

    pub fn region(&self, columns: &ColumnNames) -> RegionCode {
        self.0
            .get(&columns.region)
            .map(RegionCode::from_json)
            .unwrap_or_else(|| RegionCode::normalize(""))
    }

    /// Bucket id of the row; rows without one are skipped by the time index.
    pub fn bucket(&self, columns: &ColumnNames) -> Option<TimeBucket> {
        match self.0.get(&columns.bucket)? {
            Value::String(s) => Some(TimeBucket::new(s.as_str())),
            Value::Number(n) => Some(TimeBucket::new(n.to_string())),
            Value::Bool(b) => Some(TimeBucket::new(b.to_string())),
            _ => None,
        }
    }

    pub fn column_names(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

pub(crate) fn finite_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

/// The immutable table of observations held for the lifetime of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservationTable {
    rows: Vec<ObservationRow>,
}

impl ObservationTable {
    pub fn new(rows: Vec<ObservationRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ObservationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&ObservationRow> {
        self.rows.first()
    }

    /// Rows belonging to one bucket, in table order.
    pub fn rows_in_bucket<'a>(
        &'a self,
        bucket: &'a TimeBucket,
        columns: &'a ColumnNames,
    ) -> impl Iterator<Item = &'a ObservationRow> + 'a {
        self.rows
            .iter()
            .filter(move |r| r.bucket(columns).as_ref() == Some(bucket))
    }
}

impl FromIterator<ObservationRow> for ObservationTable {
    fn from_iter<T: IntoIterator<Item = ObservationRow>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
