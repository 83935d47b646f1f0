//! Region codes and the allow-list of regions that take part in aggregation.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Normalized short region code (trimmed, uppercase).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RegionCode(String);

impl RegionCode {
    /// Normalize a raw code: surrounding whitespace is dropped and letters are uppercased.
    pub fn normalize(raw: &str) -> Self {
        RegionCode(raw.trim().to_uppercase())
    }

    /// Normalize an arbitrary JSON scalar the way identifiers show up in the artifact.
    ///
    /// Strings are used as-is, numbers and booleans by their textual form.
    /// `null`, arrays and objects yield an empty code.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::normalize(s),
            serde_json::Value::Number(n) => Self::normalize(&n.to_string()),
            serde_json::Value::Bool(b) => Self::normalize(&b.to_string()),
            _ => RegionCode(String::new()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RegionCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|raw| RegionCode::normalize(&raw))
    }
}

impl From<&str> for RegionCode {
    fn from(raw: &str) -> Self {
        RegionCode::normalize(raw)
    }
}

/// The regions modelled by the forecasting project, with their display names.
pub const PROJECT_REGIONS: [(&str, &str); 11] = [
    ("CA", "California"),
    ("TX", "Texas"),
    ("WI", "Wisconsin"),
    ("WA", "Washington"),
    ("PA", "Pennsylvania"),
    ("NY", "New York"),
    ("GA", "Georgia"),
    ("FL", "Florida"),
    ("CO", "Colorado"),
    ("IA", "Iowa"),
    ("MA", "Massachusetts"),
];

/// Closed set of region codes that participate in totals, rankings and color fill.
///
/// Regions outside the list may still be drawn but are numerically inert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionAllowList {
    entries: Vec<(RegionCode, String)>,
    index: HashSet<RegionCode>,
}

impl RegionAllowList {
    /// Build an allow-list from `(code, display name)` pairs. Codes are normalized
    /// and duplicates keep their first occurrence.
    pub fn new<I, C, N>(entries: I) -> Self
    where
        I: IntoIterator<Item = (C, N)>,
        C: AsRef<str>,
        N: Into<String>,
    {
        let mut list = RegionAllowList {
            entries: Vec::new(),
            index: HashSet::new(),
        };
        for (code, name) in entries {
            let code = RegionCode::normalize(code.as_ref());
            if code.is_empty() || !list.index.insert(code.clone()) {
                continue;
            }
            list.entries.push((code, name.into()));
        }
        list
    }

    /// Allow-list made of bare codes; the display name falls back to the code.
    pub fn from_codes<I, C>(codes: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        Self::new(codes.into_iter().map(|c| {
            let name = RegionCode::normalize(c.as_ref()).to_string();
            (c, name)
        }))
    }

    /// The project's fixed region table.
    pub fn project() -> Self {
        Self::new(PROJECT_REGIONS)
    }

    pub fn contains(&self, code: &RegionCode) -> bool {
        self.index.contains(code)
    }

    pub fn display_name(&self, code: &RegionCode) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, name)| name.as_str())
    }

    pub fn codes(&self) -> impl Iterator<Item = &RegionCode> {
        self.entries.iter().map(|(c, _)| c)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RegionAllowList {
    fn default() -> Self {
        Self::project()
    }
}
