//! Service layer: the pure aggregation pipeline and the session runtime.
//!
//! Every function here is a pure derivation from a [`crate::data::Dataset`]
//! and a selection, except for [`session`], which owns the play loop.

pub mod color;
pub mod evaluation;
pub mod frame;
pub mod metric;
pub mod region_series;
pub mod session;
pub mod stats;
pub mod time_index;

pub use evaluation::evaluate;
pub use frame::{aggregate_buckets, build_frame_view, compute_frame_aggregates};
pub use metric::{mode_label, resolve_metric, resolve_metric_for};
pub use region_series::{extract_region_series, region_series_at};
pub use session::{session_view, SessionError, SessionStore};
pub use stats::{compute_all_stats, compute_metric_stats, compute_stats, quantile};
pub use time_index::{build_time_index, find_split_index};
