//! Shared type definitions for the Crowdmap reporting service.
//!
//! This crate is the single source of truth for the records exchanged
//! between the store, the aggregation engine, and the HTTP API. Types
//! flow downstream to `TypeScript` via `ts-rs` for the map front end.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe wrappers for store-assigned row ids
//! - [`enums`] -- Occupancy classification
//! - [`structs`] -- Observation records, write payloads, and projections

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::OccupancyStatus;
pub use ids::{CrowdReportId, FavoriteSpotId, ParkingSpotId};
pub use structs::{
    CrowdReport, DensityMap, FavoriteSpot, FavoriteSpotEntry, GeoObservation, MessageResponse,
    NewCrowdReport, NewFavoriteSpot, NewParkingSpot, Occupancy, ParkingAvailability, ParkingSpot,
};
