#![allow(dead_code)]

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Two weekly buckets; W02 carries forecasts only. ZZ is not allow-listed.
pub const SAMPLE_ARTIFACT: &str = r#"{
    "table": [
        {"state_id": "CA", "week_start": "2020-W01", "y_true": 100.0,
         "yhat_sarimax": 90.0, "abs_err_yhat_sarimax": 10.0,
         "yhat_lgbm": 104.0, "abs_err_yhat_lgbm": 4.0},
        {"state_id": "TX", "week_start": "2020-W01", "y_true": 50.0,
         "yhat_sarimax": 60.0, "abs_err_yhat_sarimax": 10.0,
         "yhat_lgbm": 49.0, "abs_err_yhat_lgbm": 1.0},
        {"state_id": "ZZ", "week_start": "2020-W01", "y_true": 999.0},
        {"state_id": "CA", "week_start": "2020-W02", "y_true": null,
         "yhat_sarimax": 110.0, "yhat_lgbm": 108.0},
        {"state_id": "TX", "week_start": "2020-W02", "y_true": null,
         "yhat_sarimax": 40.0, "yhat_lgbm": 45.0}
    ],
    "geojson": {"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"state_id": "CA", "name": "California"},
         "geometry": {"type": "Polygon", "coordinates": [[[36.7, -119.4], [38.0, -121.0], [35.0, -117.0], [36.7, -119.4]]]}},
        {"type": "Feature", "properties": {"state_id": "TX"},
         "geometry": {"type": "Polygon", "coordinates": [[[-99.0, 31.0], [-97.0, 33.0], [-95.0, 30.0], [-99.0, 31.0]]]}}
    ]}
}"#;

/// Write `contents` as `kepler_data.json` in a fresh temporary directory.
pub fn write_artifact(contents: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kepler_data.json");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}
