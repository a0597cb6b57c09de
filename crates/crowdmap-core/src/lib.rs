//! Aggregation engine and configuration for the Crowdmap service.
//!
//! # Modules
//!
//! - [`density`] -- Density map and single-location occupancy reductions
//! - [`filter`] -- Bounding-box and recency predicates shared by every store
//! - [`config`] -- Typed configuration loaded from YAML and the environment
//!
//! The aggregation functions are pure: they take the observations and the
//! current instant and return a summary. Callers fetch observations from a
//! store and pass `Utc::now()`; tests pass a fixed instant.

pub mod config;
pub mod density;
pub mod filter;

pub use config::{AppConfig, ConfigError, PgEnvironment};
pub use density::{
    aggregate_density, bucket_key, classify, occupancy, occupancy_at, round_density,
    OccupancyQuery, BUCKET_PRECISION,
};
pub use filter::{is_recent, BoundingBox, ObservationFilter, OCCUPANCY_RADIUS_DEGREES};
