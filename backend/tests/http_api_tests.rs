#![cfg(feature = "http-server")]

mod support;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use futures::StreamExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use geo_forecast::data::{DatasetOptions, DatasetStore};
use geo_forecast::http::{create_router, AppState};
use support::{write_artifact, SAMPLE_ARTIFACT};

fn app_for(path: &Path) -> Router {
    let store = Arc::new(DatasetStore::new(path, DatasetOptions::default()));
    create_router(AppState::new(store))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

#[tokio::test]
async fn test_health_does_not_load() {
    let (_dir, path) = write_artifact(SAMPLE_ARTIFACT);
    let app = app_for(&path);

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["dataset"], "not_loaded");

    get(&app, "/v1/mapdata").await;
    let (_, body) = get(&app, "/health").await;
    assert_eq!(body["dataset"], "loaded");
}

#[tokio::test]
async fn test_map_data_response() {
    let (_dir, path) = write_artifact(SAMPLE_ARTIFACT);
    let app = app_for(&path);

    let (status, body) = get(&app, "/v1/mapdata").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["time_index"], json!(["2020-W01", "2020-W02"]));
    assert_eq!(body["meta"]["split_index"], 1);
    assert_eq!(body["meta"]["default_metric"], "y_true");
    assert_eq!(body["table"].as_array().unwrap().len(), 5);
    assert!(body.get("coordinates").is_none());
}

#[tokio::test]
async fn test_map_data_normalized_coordinates() {
    let (_dir, path) = write_artifact(SAMPLE_ARTIFACT);
    let app = app_for(&path);

    let (status, body) = get(&app, "/v1/mapdata?normalize=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["coordinates"]["swapped_pairs"], 4);
    assert_eq!(body["coordinates"]["ambiguous_pairs"], 0);
    let first = &body["geojson"]["features"][0]["geometry"]["coordinates"][0][0];
    assert_eq!(first, &json!([-119.4, 36.7]));
}

#[tokio::test]
async fn test_missing_artifact_is_structured_error() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_for(&dir.path().join("kepler_data.json"));

    let (status, body) = get(&app, "/v1/mapdata").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "MISSING_ARTIFACT");
    assert!(body["message"].as_str().unwrap().contains("kepler_data.json"));

    let (status, body) = get(&app, "/v1/frame").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "MISSING_ARTIFACT");
}

#[tokio::test]
async fn test_reload_picks_up_new_artifact() {
    let (_dir, path) = write_artifact(SAMPLE_ARTIFACT);
    let app = app_for(&path);
    get(&app, "/v1/mapdata").await;

    std::fs::write(
        &path,
        r#"{"table": [{"state_id": "CA", "week_start": "2021-W01", "y_true": 1.0}]}"#,
    )
    .unwrap();
    let (status, body) = send(&app, Method::POST, "/v1/mapdata/reload", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"], 1);
    assert_eq!(body["buckets"], 1);
    assert_eq!(body["split_index"], 1);

    let (_, body) = get(&app, "/v1/mapdata").await;
    assert_eq!(body["meta"]["time_index"], json!(["2021-W01"]));
}

#[tokio::test]
async fn test_frame_endpoint() {
    let (_dir, path) = write_artifact(SAMPLE_ARTIFACT);
    let app = app_for(&path);

    let (status, body) = get(&app, "/v1/frame?t=0&view=actual&model=sarimax").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["aggregates"]["total"], 150.0);
    assert_eq!(body["aggregates"]["top"][0]["region"], "CA");
    assert_eq!(body["label"], "Historic Actuals");

    let (status, body) = get(&app, "/v1/frame?t=99&view=abs_error&model=lgbm").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["t"], 1);
    assert_eq!(body["metric"], "abs_err_yhat_lgbm");

    let (status, body) = get(&app, "/v1/frame?view=sideways").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_region_series_endpoint() {
    let (_dir, path) = write_artifact(SAMPLE_ARTIFACT);
    let app = app_for(&path);

    let (status, body) = get(&app, "/v1/regions/ca/series?t=1&model=lgbm").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["region"], "CA");
    assert_eq!(body["region_name"], "California");
    assert_eq!(body["actual"], json!([100.0, null]));
    assert_eq!(body["forecast"], json!([104.0, 108.0]));
}

#[tokio::test]
async fn test_evaluation_endpoint() {
    let (_dir, path) = write_artifact(SAMPLE_ARTIFACT);
    let app = app_for(&path);

    let (status, body) = get(&app, "/v1/evaluation").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overall"]["sarimax"]["count"], 2);
    assert_eq!(body["by_region"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_session_lifecycle() {
    let (_dir, path) = write_artifact(SAMPLE_ARTIFACT);
    let app = app_for(&path);

    let (status, info) = send(
        &app,
        Method::POST,
        "/v1/sessions",
        Some(json!({"pinned": "ca", "model": "lgbm"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(info["state"]["pinned"], "CA");
    assert_eq!(info["state"]["playing"], false);
    let id = info["session_id"].as_str().unwrap().to_string();

    let (status, info) = send(
        &app,
        Method::PATCH,
        &format!("/v1/sessions/{id}"),
        Some(json!({"t": 7, "view_mode": "forecast"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["state"]["t"], 1);
    assert_eq!(info["state"]["view_mode"], "forecast");

    let (status, view) = get(&app, &format!("/v1/sessions/{id}/view")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["frame"]["metric"], "yhat_lgbm");
    assert_eq!(view["pinned"]["forecast_at_current"], 108.0);

    let (status, info) = send(&app, Method::POST, &format!("/v1/sessions/{id}/play"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["state"]["playing"], true);

    let (status, info) = send(&app, Method::POST, &format!("/v1/sessions/{id}/pause"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["state"]["playing"], false);

    let (status, _) = send(&app, Method::DELETE, &format!("/v1/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = get(&app, &format!("/v1/sessions/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_play_refused_on_single_bucket() {
    let (_dir, path) = write_artifact(
        r#"{"table": [{"state_id": "CA", "week_start": "2021-W01", "y_true": 1.0}]}"#,
    );
    let app = app_for(&path);

    let (_, info) = send(&app, Method::POST, "/v1/sessions", Some(json!({}))).await;
    let id = info["session_id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::POST, &format!("/v1/sessions/{id}/play"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_session_stream_ends_on_delete() {
    let (_dir, path) = write_artifact(SAMPLE_ARTIFACT);
    let app = app_for(&path);

    let (_, info) = send(&app, Method::POST, "/v1/sessions", Some(json!({}))).await;
    let id = info["session_id"].as_str().unwrap().to_string();

    let request = Request::builder()
        .uri(format!("/v1/sessions/{id}/stream"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
        "text/event-stream"
    );

    let mut body = response.into_body().into_data_stream();
    let first = tokio::time::timeout(Duration::from_secs(5), body.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert!(String::from_utf8_lossy(&first).contains("event: view"));

    send(&app, Method::DELETE, &format!("/v1/sessions/{id}"), None).await;

    let rest = tokio::time::timeout(Duration::from_secs(5), async {
        let mut text = String::new();
        while let Some(chunk) = body.next().await {
            text.push_str(&String::from_utf8_lossy(&chunk.unwrap()));
        }
        text
    })
    .await
    .unwrap();
    assert!(rest.contains("event: closed"));
}

#[tokio::test]
async fn test_malformed_session_body_is_bad_request() {
    let (_dir, path) = write_artifact(SAMPLE_ARTIFACT);
    let app = app_for(&path);

    let (status, body) = send(&app, Method::POST, "/v1/sessions", Some(json!({"t": "soon"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_unknown_session_stream_is_not_found() {
    let (_dir, path) = write_artifact(SAMPLE_ARTIFACT);
    let app = app_for(&path);

    let (status, body) = get(&app, "/v1/sessions/does-not-exist/stream").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}
