//! # Geo Forecast Backend
//!
//! Aggregation engine behind a map of regional demand forecasts.
//!
//! The crate reads one JSON artifact holding an observation table (actual
//! values plus per-model forecasts and absolute errors, one row per region and
//! time bucket) and a GeoJSON geography. From it the crate derives everything
//! the map needs: the time index and the split between historic and
//! forecast-only buckets, robust per-metric statistics for color scaling,
//! per-frame totals, rankings and movers, and the trailing series of a pinned
//! region. An axum REST API exposes these derivations.
//!
//! ## Architecture
//!
//! - [`api`]: Data Transfer Objects (DTOs) for API responses
//! - [`config`]: TOML and environment configuration
//! - [`data`]: Artifact loading and the reloadable dataset store
//! - [`models`]: Domain types (regions, buckets, rows, geography)
//! - [`services`]: The aggregation pipeline and the session play loop
//! - [`routes`]: Serializable response types, grouped by endpoint
//! - [`http`]: Axum-based HTTP server and request handlers

pub mod api;
pub mod config;
pub mod data;
pub mod models;
pub mod routes;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
