mod support;

use geo_forecast::data::{load_artifact, DatasetOptions, DatasetStore};
use geo_forecast::models::{MetricKey, ModelKey, RegionCode, TimeBucket, ViewMode};
use geo_forecast::services::{build_frame_view, evaluate, region_series_at, session_view};
use geo_forecast::api::SessionState;
use support::{write_artifact, SAMPLE_ARTIFACT};

#[test]
fn test_load_sample_artifact() {
    let (_dir, path) = write_artifact(SAMPLE_ARTIFACT);
    let ds = load_artifact(&path, &DatasetOptions::default()).unwrap();

    assert_eq!(
        ds.time_index(),
        &[TimeBucket::from("2020-W01"), TimeBucket::from("2020-W02")]
    );
    assert_eq!(ds.split_index(), 1);
    assert_eq!(ds.table().len(), 5);

    let stats = ds.stats_for(&MetricKey::from("y_true")).unwrap();
    assert_eq!(stats.min, 50.0);
    assert_eq!(stats.max, 999.0);
    assert!(stats.min <= stats.p05 && stats.p05 <= stats.p50);
    assert!(stats.p50 <= stats.p95 && stats.p95 <= stats.max);
}

#[test]
fn test_actual_frame_excludes_unlisted_regions() {
    let (_dir, path) = write_artifact(SAMPLE_ARTIFACT);
    let ds = load_artifact(&path, &DatasetOptions::default()).unwrap();
    let frame = build_frame_view(&ds, 0, ViewMode::Actual, ModelKey::Sarimax);

    assert!(frame.is_historic);
    assert_eq!(frame.aggregates.total, 150.0);
    assert_eq!(frame.aggregates.average, 75.0);
    let top: Vec<&str> = frame.aggregates.top.iter().map(|r| r.region.as_str()).collect();
    assert_eq!(top, vec!["CA", "TX"]);
    assert!(!frame.aggregates.value_by_region.contains(&RegionCode::from("ZZ")));
    assert_eq!(frame.fills.len(), 2);
}

#[test]
fn test_forecast_frame_movers() {
    let (_dir, path) = write_artifact(SAMPLE_ARTIFACT);
    let ds = load_artifact(&path, &DatasetOptions::default()).unwrap();
    let frame = build_frame_view(&ds, 1, ViewMode::Forecast, ModelKey::Sarimax);

    assert!(!frame.is_historic);
    assert_eq!(frame.metric.as_str(), "yhat_sarimax");
    assert_eq!(frame.aggregates.total, 150.0);

    let riser = &frame.aggregates.risers[0];
    assert_eq!(riser.region.as_str(), "CA");
    assert_eq!(riser.delta, 20.0);
    assert!((riser.pct_change.unwrap() - 20.0 / 90.0 * 100.0).abs() < 1e-9);

    let dropper = &frame.aggregates.droppers[0];
    assert_eq!(dropper.region.as_str(), "TX");
    assert_eq!(dropper.delta, -20.0);
}

#[test]
fn test_region_series_and_session_view() {
    let (_dir, path) = write_artifact(SAMPLE_ARTIFACT);
    let ds = load_artifact(&path, &DatasetOptions::default()).unwrap();

    let series = region_series_at(&ds, &RegionCode::from("tx"), 1, ViewMode::Actual, ModelKey::Lgbm);
    assert_eq!(series.region_name, "Texas");
    assert_eq!(series.actual, vec![Some(50.0), None]);
    assert_eq!(series.forecast, vec![Some(49.0), Some(45.0)]);
    assert_eq!(series.split_relative_index, 1);

    let state = SessionState {
        t: 1,
        view_mode: ViewMode::Forecast,
        model: ModelKey::Lgbm,
        pinned: Some(RegionCode::from("CA")),
        ..Default::default()
    };
    let view = session_view(&ds, "s1", state);
    let pinned = view.pinned.unwrap();
    assert_eq!(pinned.forecast_at_current, Some(108.0));
    assert!((pinned.share_of_total - 108.0 / 153.0).abs() < 1e-12);
}

#[test]
fn test_evaluation_on_sample() {
    let (_dir, path) = write_artifact(SAMPLE_ARTIFACT);
    let ds = load_artifact(&path, &DatasetOptions::default()).unwrap();
    let report = evaluate(&ds);

    let sarimax = &report.overall[&ModelKey::Sarimax];
    assert_eq!(sarimax.count, 2);
    assert!((sarimax.wape - 20.0 / 150.0).abs() < 1e-12);
    assert_eq!(report.by_region.len(), 2);
}

#[test]
fn test_store_reload_keeps_previous_on_failure() {
    let (_dir, path) = write_artifact(SAMPLE_ARTIFACT);
    let store = DatasetStore::new(&path, DatasetOptions::default());
    let first = store.get().unwrap();

    std::fs::write(&path, "{ not json").unwrap();
    assert!(store.reload().is_err());
    let current = store.get().unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &current));

    std::fs::remove_file(&path).unwrap();
    let err = store.reload().unwrap_err();
    assert!(err.is_missing());
    assert!(err.to_string().contains("kepler_data.json"));
}
