//! Observation records and their client-facing projections.
//!
//! Stored records ([`CrowdReport`], [`FavoriteSpot`], [`ParkingSpot`]) are
//! append-only: they are created once by the store and never updated or
//! deleted. The `New*` records carry the client-supplied fields of a write;
//! the store fills in the id and, for timestamped kinds, the insert time.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::OccupancyStatus;
use crate::ids::{CrowdReportId, FavoriteSpotId, ParkingSpotId};

/// A timestamped point observation that can be filtered by place and time.
///
/// Implemented by every observation kind that participates in the rolling
/// recency window.
pub trait GeoObservation {
    /// Latitude in decimal degrees.
    fn latitude(&self) -> f64;
    /// Longitude in decimal degrees.
    fn longitude(&self) -> f64;
    /// Instant the store recorded the observation.
    fn observed_at(&self) -> DateTime<Utc>;
}

// ---------------------------------------------------------------------------
// Crowd reports
// ---------------------------------------------------------------------------

/// A crowd density report as persisted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CrowdReport {
    /// Store-assigned id.
    pub id: CrowdReportId,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Reported crowd density (non-negative).
    pub density: i32,
    /// Insert time, assigned by the store.
    pub timestamp: DateTime<Utc>,
}

/// Client-supplied fields of a crowd report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewCrowdReport {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Reported crowd density (non-negative).
    pub density: i32,
}

impl GeoObservation for CrowdReport {
    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }

    fn observed_at(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

// ---------------------------------------------------------------------------
// Favorite spots
// ---------------------------------------------------------------------------

/// A named location saved by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FavoriteSpot {
    /// Store-assigned id.
    pub id: FavoriteSpotId,
    /// Opaque owner identifier.
    pub user_id: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Display name, at most 100 characters.
    pub name: String,
}

/// Client-supplied fields of a favorite spot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewFavoriteSpot {
    /// Opaque owner identifier.
    pub user_id: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Display name, at most 100 characters.
    pub name: String,
}

/// A favorite spot as listed back to its owner (no `user_id`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FavoriteSpotEntry {
    /// Store-assigned id.
    pub id: FavoriteSpotId,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Display name.
    pub name: String,
}

impl From<FavoriteSpot> for FavoriteSpotEntry {
    fn from(spot: FavoriteSpot) -> Self {
        Self {
            id: spot.id,
            latitude: spot.latitude,
            longitude: spot.longitude,
            name: spot.name,
        }
    }
}

// ---------------------------------------------------------------------------
// Parking spots
// ---------------------------------------------------------------------------

/// A parking availability report as persisted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ParkingSpot {
    /// Store-assigned id.
    pub id: ParkingSpotId,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Whether the spot was free when reported.
    pub available: bool,
    /// Insert time, assigned by the store.
    pub timestamp: DateTime<Utc>,
}

/// Client-supplied fields of a parking report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewParkingSpot {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Whether the spot is free.
    pub available: bool,
}

/// A parking report as shown on the map (no id or timestamp).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ParkingAvailability {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Whether the spot was free when reported.
    pub available: bool,
}

impl From<&ParkingSpot> for ParkingAvailability {
    fn from(spot: &ParkingSpot) -> Self {
        Self {
            latitude: spot.latitude,
            longitude: spot.longitude,
            available: spot.available,
        }
    }
}

impl GeoObservation for ParkingSpot {
    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }

    fn observed_at(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Mean density per bucket key (`"lat,lng"` at 4 decimal places).
///
/// Ordered so responses are deterministic.
pub type DensityMap = BTreeMap<String, f64>;

/// Occupancy summary for a single location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Occupancy {
    /// Mean density of nearby fresh reports, rounded to one decimal place.
    pub density: f64,
    /// Classification of the unrounded mean.
    pub status: OccupancyStatus,
}

/// Body of a successful write response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MessageResponse {
    /// Human-readable confirmation.
    pub message: String,
}

impl MessageResponse {
    /// Build a response from a static confirmation message.
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_owned(),
        }
    }
}
