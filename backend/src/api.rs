//! Public API surface of the crate.
//!
//! This file consolidates the DTO types exchanged with the rendering layer.
//! All response types derive Serialize for JSON output.

pub use crate::routes::evaluation::EvaluationReport;
pub use crate::routes::evaluation::ModelScore;
pub use crate::routes::evaluation::RegionScores;
pub use crate::routes::frame::ColorDomain;
pub use crate::routes::frame::FrameAggregates;
pub use crate::routes::frame::FrameView;
pub use crate::routes::frame::RankedRegion;
pub use crate::routes::frame::RegionDelta;
pub use crate::routes::frame::RegionFill;
pub use crate::routes::frame::RegionValues;
pub use crate::routes::mapdata::MapData;
pub use crate::routes::mapdata::MapMeta;
pub use crate::routes::mapdata::MetricStats;
pub use crate::routes::series::RegionSeries;
pub use crate::routes::session::SessionInfo;
pub use crate::routes::session::SessionState;
pub use crate::routes::session::SessionUpdate;
pub use crate::routes::session::SessionView;

pub use crate::models::geo::CoordinateReport;
pub use crate::models::{
    MetricKey, ModelKey, PlaySpeed, RegionCode, TimeBucket, ViewMode, PROJECT_REGIONS,
};

#[cfg(test)]
#[path = "api_tests.rs"]
mod api_tests;
