//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer. Work that reads the artifact or walks the table runs on
//! the blocking pool.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use super::dto::{FrameQuery, HealthResponse, MapDataQuery, ReloadResponse, SeriesQuery};
use super::error::AppError;
use super::state::AppState;
use crate::api::{EvaluationReport, FrameView, MapData, RegionSeries, SessionInfo, SessionUpdate, SessionView};
use crate::data::Dataset;
use crate::models::RegionCode;
use crate::services::{build_frame_view, evaluate, region_series_at, session_view};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Run `f` on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
}

/// Current dataset, loading the artifact on first use.
async fn current_dataset(state: &AppState) -> Result<Arc<Dataset>, AppError> {
    let store = Arc::clone(&state.store);
    blocking(move || store.get().map_err(AppError::from)).await
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Reports whether the artifact has been loaded. Does not trigger a load.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let dataset = if state.store.is_loaded() {
        "loaded"
    } else {
        "not_loaded"
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        dataset: dataset.to_string(),
    }))
}

// =============================================================================
// Map data
// =============================================================================

/// GET /v1/mapdata
///
/// Derived metadata, geography and table of the loaded artifact.
pub async fn get_map_data(
    State(state): State<AppState>,
    query: Result<Query<MapDataQuery>, QueryRejection>,
) -> HandlerResult<MapData> {
    let Query(query) = query?;
    let dataset = current_dataset(&state).await?;
    let data = blocking(move || Ok(dataset.map_data(query.normalize))).await?;
    Ok(Json(data))
}

/// POST /v1/mapdata/reload
///
/// Re-read the artifact and recompute its metadata.
pub async fn reload_map_data(State(state): State<AppState>) -> HandlerResult<ReloadResponse> {
    let store = Arc::clone(&state.store);
    let dataset = blocking(move || store.reload().map_err(AppError::from)).await?;

    Ok(Json(ReloadResponse {
        rows: dataset.table().len(),
        buckets: dataset.time_index().len(),
        split_index: dataset.split_index(),
        loaded_at: dataset.loaded_at(),
    }))
}

// =============================================================================
// Frames, series and evaluation
// =============================================================================

/// GET /v1/frame?t&view&model
pub async fn get_frame(
    State(state): State<AppState>,
    query: Result<Query<FrameQuery>, QueryRejection>,
) -> HandlerResult<FrameView> {
    let Query(query) = query?;
    let dataset = current_dataset(&state).await?;
    let view = blocking(move || {
        Ok(build_frame_view(&dataset, query.t, query.view, query.model))
    })
    .await?;
    Ok(Json(view))
}

/// GET /v1/regions/{code}/series?t&view&model
pub async fn get_region_series(
    State(state): State<AppState>,
    Path(code): Path<String>,
    query: Result<Query<SeriesQuery>, QueryRejection>,
) -> HandlerResult<RegionSeries> {
    let Query(query) = query?;
    let region = RegionCode::normalize(&code);
    if region.is_empty() {
        return Err(AppError::BadRequest("Region code must not be empty".to_string()));
    }

    let dataset = current_dataset(&state).await?;
    let series = blocking(move || {
        Ok(region_series_at(&dataset, &region, query.t, query.view, query.model))
    })
    .await?;
    Ok(Json(series))
}

/// GET /v1/evaluation
pub async fn get_evaluation(State(state): State<AppState>) -> HandlerResult<EvaluationReport> {
    let dataset = current_dataset(&state).await?;
    let report = blocking(move || Ok(evaluate(&dataset))).await?;
    Ok(Json(report))
}

// =============================================================================
// Sessions
// =============================================================================

/// POST /v1/sessions
///
/// Create a session. Fields of the body override the defaults.
pub async fn create_session(
    State(state): State<AppState>,
    request: Result<Json<SessionUpdate>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionInfo>), AppError> {
    let Json(request) = request?;
    let len = current_dataset(&state).await?.time_index().len();
    let created = state.sessions.create(Default::default());
    let info = state.sessions.update(&created.session_id, request, len)?;
    Ok((StatusCode::CREATED, Json(info)))
}

/// GET /v1/sessions/{session_id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> HandlerResult<SessionInfo> {
    Ok(Json(state.sessions.info(&session_id)?))
}

/// PATCH /v1/sessions/{session_id}
pub async fn update_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    update: Result<Json<SessionUpdate>, JsonRejection>,
) -> HandlerResult<SessionInfo> {
    let Json(update) = update?;
    // Unknown ids are reported before the dataset is touched.
    state.sessions.get(&session_id)?;
    let len = current_dataset(&state).await?.time_index().len();
    Ok(Json(state.sessions.update(&session_id, update, len)?))
}

/// DELETE /v1/sessions/{session_id}
///
/// Stops the play loop and ends every stream of the session.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.sessions.delete(&session_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/sessions/{session_id}/play
pub async fn play_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> HandlerResult<SessionInfo> {
    state.sessions.get(&session_id)?;
    let len = current_dataset(&state).await?.time_index().len();
    Ok(Json(state.sessions.play(&session_id, len)?))
}

/// POST /v1/sessions/{session_id}/pause
pub async fn pause_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> HandlerResult<SessionInfo> {
    Ok(Json(state.sessions.pause(&session_id)?))
}

/// GET /v1/sessions/{session_id}/view
///
/// Frame and pinned series for the session's current state.
pub async fn get_session_view(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> HandlerResult<SessionView> {
    let session_state = state.sessions.info(&session_id)?.state;
    let dataset = current_dataset(&state).await?;
    let view = blocking(move || Ok(session_view(&dataset, &session_id, session_state))).await?;
    Ok(Json(view))
}

/// GET /v1/sessions/{session_id}/stream
///
/// Stream the session view via Server-Sent Events (SSE): one `view` event for
/// the current state, then one per state change. A final `closed` event is
/// sent when the session is deleted.
pub async fn stream_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let mut rx = state.sessions.subscribe(&session_id)?;
    let store = Arc::clone(&state.store);

    let stream = async_stream::stream! {
        loop {
            let session_state = rx.borrow_and_update().clone();
            let store = Arc::clone(&store);
            let id = session_id.clone();
            let view = tokio::task::spawn_blocking(move || {
                store.get().map(|ds| session_view(&ds, &id, session_state))
            })
            .await;

            match view {
                Ok(Ok(view)) => {
                    let data = serde_json::to_string(&view).unwrap_or_default();
                    yield Ok(Event::default().event("view").data(data));
                }
                Ok(Err(e)) => {
                    tracing::warn!("Session {} stream: {}", session_id, e);
                    yield Ok(Event::default().event("error").data(e.to_string()));
                }
                Err(e) => {
                    tracing::error!("Session {} stream task failed: {}", session_id, e);
                    break;
                }
            }

            if rx.changed().await.is_err() {
                yield Ok(Event::default().event("closed").data(session_id.clone()));
                break;
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(1))
            .text("keep-alive"),
    ))
}
