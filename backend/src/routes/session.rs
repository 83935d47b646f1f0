use serde::{Deserialize, Serialize};

use super::frame::FrameView;
use super::series::RegionSeries;
use crate::models::{ModelKey, PlaySpeed, RegionCode, ViewMode};

// =========================================================
// Session types
// =========================================================

/// The user-selected parameters of one map view.
///
/// This is the single-writer state every derived structure is recomputed from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionState {
    /// Current time-index position.
    pub t: usize,
    pub view_mode: ViewMode,
    pub model: ModelKey,
    pub pinned: Option<RegionCode>,
    pub speed: PlaySpeed,
    pub playing: bool,
}

/// Partial update of a session. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUpdate {
    #[serde(default)]
    pub t: Option<usize>,
    #[serde(default)]
    pub view_mode: Option<ViewMode>,
    #[serde(default)]
    pub model: Option<ModelKey>,
    /// `Some(None)` (an explicit `null`) unpins.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub pinned: Option<Option<RegionCode>>,
    #[serde(default)]
    pub speed: Option<PlaySpeed>,
}

fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Session identity and state as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub state: SessionState,
}

/// Frame plus pinned-region series for a session's current state.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub state: SessionState,
    pub frame: FrameView,
    pub pinned: Option<RegionSeries>,
}
