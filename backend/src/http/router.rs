//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Artifact
        .route("/mapdata", get(handlers::get_map_data))
        .route("/mapdata/reload", post(handlers::reload_map_data))
        // Derived views
        .route("/frame", get(handlers::get_frame))
        .route("/regions/{code}/series", get(handlers::get_region_series))
        .route("/evaluation", get(handlers::get_evaluation))
        // Sessions
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/{session_id}",
            get(handlers::get_session)
                .patch(handlers::update_session)
                .delete(handlers::delete_session),
        )
        .route("/sessions/{session_id}/play", post(handlers::play_session))
        .route("/sessions/{session_id}/pause", post(handlers::pause_session))
        .route("/sessions/{session_id}/view", get(handlers::get_session_view))
        .route("/sessions/{session_id}/stream", get(handlers::stream_session));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
