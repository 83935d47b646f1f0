//! Data Transfer Objects for the HTTP API.
//!
//! Response payloads are the serializable types of the routes module; this
//! file holds the query strings and the small bodies only the HTTP layer uses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ModelKey, ViewMode};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// "loaded", "not_loaded" or the load error
    pub dataset: String,
}

/// Query parameters for the map-data endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MapDataQuery {
    /// Swap `[lat, lon]` coordinate pairs into `[lon, lat]`
    #[serde(default)]
    pub normalize: bool,
}

/// Query parameters for the frame endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FrameQuery {
    /// Time-index position (clamped)
    #[serde(default)]
    pub t: usize,
    #[serde(default)]
    pub view: ViewMode,
    #[serde(default)]
    pub model: ModelKey,
}

/// Query parameters for the region series endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SeriesQuery {
    #[serde(default)]
    pub t: usize,
    /// View whose frame total the share is computed against
    #[serde(default)]
    pub view: ViewMode,
    #[serde(default)]
    pub model: ModelKey,
}

/// Response of a successful reload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub rows: usize,
    pub buckets: usize,
    pub split_index: usize,
    pub loaded_at: DateTime<Utc>,
}
