//! Place-and-time predicates over observations.
//!
//! An [`ObservationFilter`] is a plain value: the `PostgreSQL` store turns
//! it into a `WHERE` clause, the in-memory store evaluates it with
//! [`ObservationFilter::matches`]. Both must agree, so the bounds here are
//! the single definition of "near" and "recent".

use chrono::{DateTime, TimeDelta, Utc};
use crowdmap_types::GeoObservation;

/// Length of the rolling recency window, in hours.
pub const RECENCY_WINDOW_HOURS: i64 = 1;

/// Half-width of the occupancy search box, in degrees (about 111 m of
/// latitude). Independent of the 4-decimal bucketing used by the global
/// density map.
pub const OCCUPANCY_RADIUS_DEGREES: f64 = 0.001;

/// The rolling recency window as a duration.
pub fn recency_window() -> TimeDelta {
    TimeDelta::hours(RECENCY_WINDOW_HOURS)
}

/// Oldest instant still outside the recency window ending at `now`.
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_signed(recency_window())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Whether an observation made at `observed_at` is still fresh at `now`.
///
/// The boundary is exclusive: an observation exactly one window old is
/// stale. Timestamps in the future count as fresh.
pub fn is_recent(observed_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    observed_at > window_start(now)
}

/// Inclusive latitude/longitude rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Southern edge.
    pub min_latitude: f64,
    /// Northern edge.
    pub max_latitude: f64,
    /// Western edge.
    pub min_longitude: f64,
    /// Eastern edge.
    pub max_longitude: f64,
}

impl BoundingBox {
    /// A square box of half-width `radius` degrees centred on a point.
    pub fn around(latitude: f64, longitude: f64, radius: f64) -> Self {
        Self {
            min_latitude: latitude - radius,
            max_latitude: latitude + radius,
            min_longitude: longitude - radius,
            max_longitude: longitude + radius,
        }
    }

    /// Whether the point lies inside the box, edges included.
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&latitude)
            && (self.min_longitude..=self.max_longitude).contains(&longitude)
    }
}

/// Predicate selecting observations by area and age.
///
/// Unset parts match everything, so [`ObservationFilter::default`] selects
/// every record.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ObservationFilter {
    /// Area the observation must fall in.
    pub bounds: Option<BoundingBox>,
    /// Observations must be strictly newer than this instant.
    pub observed_after: Option<DateTime<Utc>>,
}

impl ObservationFilter {
    /// Observations inside the recency window ending at `now`.
    pub fn recent(now: DateTime<Utc>) -> Self {
        Self {
            bounds: None,
            observed_after: Some(window_start(now)),
        }
    }

    /// Restrict the filter to an area.
    #[must_use]
    pub const fn within(mut self, bounds: BoundingBox) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Evaluate the predicate against one observation.
    pub fn matches<O: GeoObservation>(&self, observation: &O) -> bool {
        let in_bounds = self
            .bounds
            .is_none_or(|b| b.contains(observation.latitude(), observation.longitude()));
        let fresh = self
            .observed_after
            .is_none_or(|after| observation.observed_at() > after);
        in_bounds && fresh
    }
}
