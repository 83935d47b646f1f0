//! Geography helpers over the GeoJSON-like object shipped with the artifact.
//!
//! The geography is kept as a raw `serde_json::Value`: the rendering layer owns
//! its shape, this module only reads region identities from feature properties
//! and repairs coordinate order.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::region::{RegionAllowList, RegionCode};

/// Property keys that may carry a region id, in lookup order. Display-name
/// fields are deliberately absent.
const REGION_ID_KEYS: [&str; 6] = ["state_id", "STUSPS", "STATE", "state", "id", "ID"];

const REGION_NAME_KEYS: [&str; 6] = [
    "name",
    "NAME",
    "state_name",
    "STATE_NAME",
    "State_Name",
    "state",
];

/// Features of a `FeatureCollection`, or the single `Feature` itself.
pub fn features(geojson: &Value) -> Vec<&Value> {
    match geojson.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => geojson
            .get("features")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().collect())
            .unwrap_or_default(),
        Some("Feature") => vec![geojson],
        _ => Vec::new(),
    }
}

fn first_property<'a>(feature: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let props = feature.get("properties")?;
    keys.iter()
        .filter_map(|k| props.get(*k))
        .find(|v| !v.is_null())
}

/// Normalized region id of a feature; empty when no id-like property exists.
pub fn feature_region(feature: &Value) -> RegionCode {
    first_property(feature, &REGION_ID_KEYS)
        .map(RegionCode::from_json)
        .unwrap_or_else(|| RegionCode::normalize(""))
}

/// Human-readable name of a feature.
///
/// Allow-listed regions always use the canonical name. Otherwise a name-like
/// property longer than two characters wins, then the id, then `"State"`.
pub fn feature_name(feature: &Value, allow_list: &RegionAllowList) -> String {
    let code = feature_region(feature);
    if let Some(name) = allow_list.display_name(&code) {
        return name.to_string();
    }

    let raw = first_property(feature, &REGION_NAME_KEYS)
        .map(|v| match v {
            Value::String(s) => s.trim().to_string(),
            other => other.to_string(),
        })
        .unwrap_or_default();
    if raw.chars().count() > 2 {
        return raw;
    }
    if !code.is_empty() {
        return code.to_string();
    }
    "State".to_string()
}

/// Outcome of [`normalize_lon_lat`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoordinateReport {
    /// Pairs rewritten from `[lat, lon]` to `[lon, lat]`.
    pub swapped_pairs: usize,
    /// Pairs where both magnitudes are within 90 and the order cannot be told apart.
    pub ambiguous_pairs: usize,
    /// Regions of features holding at least one ambiguous pair.
    pub ambiguous_regions: Vec<RegionCode>,
}

/// Best-effort coordinate order repair.
///
/// A pair `[a, b, ..]` is swapped when `|a| <= 90` and `|b| > 90`, which is the
/// signature of `[lat, lon]` for longitudes beyond ±90. When both magnitudes are
/// within 90 the pair is left untouched and reported as ambiguous; no further
/// guess is made.
pub fn normalize_lon_lat(geojson: &Value) -> (Value, CoordinateReport) {
    let mut report = CoordinateReport::default();
    let mut out = geojson.clone();

    match geojson.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {
            if let Some(features) = out.get_mut("features").and_then(Value::as_array_mut) {
                for feature in features.iter_mut() {
                    fix_feature(feature, &mut report);
                }
            }
        }
        Some("Feature") => fix_feature(&mut out, &mut report),
        _ => {
            if out.get("coordinates").is_some() {
                fix_geometry(&mut out, &mut report.swapped_pairs, &mut report.ambiguous_pairs);
            }
        }
    }

    if report.ambiguous_pairs > 0 {
        log::warn!(
            "Coordinate order could not be disambiguated for {} pair(s) across {} region(s)",
            report.ambiguous_pairs,
            report.ambiguous_regions.len()
        );
    }
    (out, report)
}

fn fix_feature(feature: &mut Value, report: &mut CoordinateReport) {
    let before = report.ambiguous_pairs;
    let region = feature_region(feature);
    if let Some(geometry) = feature.get_mut("geometry") {
        fix_geometry(geometry, &mut report.swapped_pairs, &mut report.ambiguous_pairs);
    }
    if report.ambiguous_pairs > before && !report.ambiguous_regions.contains(&region) {
        report.ambiguous_regions.push(region);
    }
}

fn fix_geometry(geometry: &mut Value, swapped: &mut usize, ambiguous: &mut usize) {
    if geometry.get("type").and_then(Value::as_str) == Some("GeometryCollection") {
        if let Some(parts) = geometry.get_mut("geometries").and_then(Value::as_array_mut) {
            for part in parts.iter_mut() {
                fix_geometry(part, swapped, ambiguous);
            }
        }
        return;
    }
    if let Some(coords) = geometry.get_mut("coordinates") {
        fix_coords(coords, swapped, ambiguous);
    }
}

fn fix_coords(coords: &mut Value, swapped: &mut usize, ambiguous: &mut usize) {
    let Some(items) = coords.as_array_mut() else {
        return;
    };

    let pair = match (items.first().and_then(Value::as_f64), items.get(1).and_then(Value::as_f64)) {
        (Some(a), Some(b)) => Some((a.abs(), b.abs())),
        _ => None,
    };

    match pair {
        Some((a, b)) if a <= 90.0 && b > 90.0 => {
            items.swap(0, 1);
            *swapped += 1;
        }
        Some((a, b)) if a <= 90.0 && b <= 90.0 => *ambiguous += 1,
        Some(_) => {}
        None => {
            for item in items.iter_mut() {
                fix_coords(item, swapped, ambiguous);
            }
        }
    }
}
