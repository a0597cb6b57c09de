//! Spatio-temporal aggregation of crowd reports.
//!
//! Two read models are derived from raw [`CrowdReport`]s:
//!
//! - the **density map**: every fresh report bucketed by its coordinates
//!   rounded to [`BUCKET_PRECISION`] decimal places, reduced to the mean
//!   density per bucket ([`aggregate_density`]);
//! - the **occupancy** of one location: the mean density of fresh reports
//!   inside a ±[`OCCUPANCY_RADIUS_DEGREES`] box, plus a status label
//!   ([`OccupancyQuery`], [`occupancy`]).
//!
//! Everything here is a pure function of its inputs and the supplied `now`.
//! No I/O, no shared state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use crowdmap_types::{CrowdReport, DensityMap, Occupancy, OccupancyStatus};

use crate::filter::{is_recent, BoundingBox, ObservationFilter, OCCUPANCY_RADIUS_DEGREES};

/// Decimal places kept in a bucket key.
///
/// Four places is roughly an 11 m cell at the equator. The key format
/// defines aggregation granularity, so changing this changes the map.
pub const BUCKET_PRECISION: usize = 4;

/// Mean density above which a location is "Highly occupied".
pub const HIGH_OCCUPANCY_THRESHOLD: f64 = 2.0;

/// Mean density above which a location is at least "Moderately occupied".
pub const MODERATE_OCCUPANCY_THRESHOLD: f64 = 1.0;

/// Format the bucket key for a coordinate pair, e.g. `"37.7749,-122.4194"`.
pub fn bucket_key(latitude: f64, longitude: f64) -> String {
    format!(
        "{latitude:.prec$},{longitude:.prec$}",
        prec = BUCKET_PRECISION
    )
}

/// Running sum used while reducing a bucket.
#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    sum: f64,
    count: u32,
}

impl Accumulator {
    fn push(&mut self, density: i32) {
        self.sum += f64::from(density);
        self.count = self.count.saturating_add(1);
    }

    fn mean(self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / f64::from(self.count))
    }
}

/// Build the global density map from raw reports.
///
/// Reports older than the recency window (relative to `now`) are ignored.
/// The remaining reports are grouped by [`bucket_key`] and each bucket maps
/// to the arithmetic mean of its densities. Input order does not matter.
/// An empty or entirely stale input yields an empty map.
pub fn aggregate_density(reports: &[CrowdReport], now: DateTime<Utc>) -> DensityMap {
    let mut buckets: BTreeMap<String, Accumulator> = BTreeMap::new();

    for report in reports.iter().filter(|r| is_recent(r.timestamp, now)) {
        buckets
            .entry(bucket_key(report.latitude, report.longitude))
            .or_default()
            .push(report.density);
    }

    buckets
        .into_iter()
        .filter_map(|(key, acc)| acc.mean().map(|mean| (key, mean)))
        .collect()
}

/// A request for the occupancy of one location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccupancyQuery {
    /// Target latitude.
    pub latitude: f64,
    /// Target longitude.
    pub longitude: f64,
}

impl OccupancyQuery {
    /// Create a query for a coordinate pair.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// The area searched around the target, edges included.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::around(self.latitude, self.longitude, OCCUPANCY_RADIUS_DEGREES)
    }

    /// The store predicate selecting the reports this query aggregates.
    pub fn filter(&self, now: DateTime<Utc>) -> ObservationFilter {
        ObservationFilter::recent(now).within(self.bounds())
    }
}

/// Classify an unrounded mean density.
///
/// `> 2` is high, `(1, 2]` is moderate, anything else is light. The
/// boundaries themselves fall on the lower class.
pub fn classify(mean_density: f64) -> OccupancyStatus {
    if mean_density > HIGH_OCCUPANCY_THRESHOLD {
        OccupancyStatus::HighlyOccupied
    } else if mean_density > MODERATE_OCCUPANCY_THRESHOLD {
        OccupancyStatus::ModeratelyOccupied
    } else {
        OccupancyStatus::LightlyOccupied
    }
}

/// Round a density to one decimal place, halves away from zero.
pub fn round_density(density: f64) -> f64 {
    (density * 10.0).round() / 10.0
}

/// Summarize the reports already selected by [`OccupancyQuery::filter`].
///
/// No reports means "Not occupied" with density 0. Otherwise the status is
/// taken from the exact mean and the reported density is that mean rounded
/// to one decimal.
pub fn occupancy(matched: &[CrowdReport]) -> Occupancy {
    let mut acc = Accumulator::default();
    for report in matched {
        acc.push(report.density);
    }

    acc.mean().map_or(
        Occupancy {
            density: 0.0,
            status: OccupancyStatus::NotOccupied,
        },
        |mean| Occupancy {
            density: round_density(mean),
            status: classify(mean),
        },
    )
}

/// Select and summarize in one step, for callers holding every report.
pub fn occupancy_at(
    reports: &[CrowdReport],
    query: &OccupancyQuery,
    now: DateTime<Utc>,
) -> Occupancy {
    let filter = query.filter(now);
    let matched: Vec<CrowdReport> = reports
        .iter()
        .filter(|r| filter.matches(*r))
        .cloned()
        .collect();
    occupancy(&matched)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use chrono::TimeDelta;
    use crowdmap_types::CrowdReportId;

    use super::*;

    fn report(
        latitude: f64,
        longitude: f64,
        density: i32,
        age: TimeDelta,
        now: DateTime<Utc>,
    ) -> CrowdReport {
        CrowdReport {
            id: CrowdReportId(0),
            latitude,
            longitude,
            density,
            timestamp: now - age,
        }
    }

    #[test]
    fn bucket_key_uses_four_fixed_decimals() {
        assert_eq!(bucket_key(37.7749, -122.4194), "37.7749,-122.4194");
        assert_eq!(bucket_key(1.0, 2.5), "1.0000,2.5000");
        assert_eq!(bucket_key(37.77491, -122.41941), "37.7749,-122.4194");
    }

    #[test]
    fn empty_input_gives_empty_map() {
        assert!(aggregate_density(&[], Utc::now()).is_empty());
    }

    #[test]
    fn all_stale_input_gives_empty_map() {
        let now = Utc::now();
        let reports = vec![
            report(1.0, 1.0, 3, TimeDelta::hours(2), now),
            report(2.0, 2.0, 1, TimeDelta::hours(1), now),
        ];
        assert!(aggregate_density(&reports, now).is_empty());
    }

    #[test]
    fn nearby_reports_share_a_bucket() {
        let now = Utc::now();
        let reports = vec![
            report(37.7749, -122.4194, 2, TimeDelta::minutes(5), now),
            report(37.77491, -122.41941, 4, TimeDelta::minutes(10), now),
        ];
        let map = aggregate_density(&reports, now);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("37.7749,-122.4194").copied(), Some(3.0));
    }

    #[test]
    fn mean_is_independent_of_order() {
        let now = Utc::now();
        let mut reports = vec![
            report(10.0, 10.0, 1, TimeDelta::minutes(1), now),
            report(10.0, 10.0, 2, TimeDelta::minutes(2), now),
            report(10.0, 10.0, 6, TimeDelta::minutes(3), now),
            report(20.0, 20.0, 5, TimeDelta::minutes(4), now),
        ];
        let forward = aggregate_density(&reports, now);
        reports.reverse();
        let backward = aggregate_density(&reports, now);

        assert_eq!(forward, backward);
        assert_eq!(forward.get("10.0000,10.0000").copied(), Some(3.0));
        assert_eq!(forward.get("20.0000,20.0000").copied(), Some(5.0));
    }

    #[test]
    fn window_edge_excludes_one_hour_and_one_second() {
        let now = Utc::now();
        let reports = vec![
            report(1.0, 1.0, 4, TimeDelta::seconds(3601), now),
            report(2.0, 2.0, 4, TimeDelta::seconds(3599), now),
        ];
        let map = aggregate_density(&reports, now);
        assert!(!map.contains_key("1.0000,1.0000"));
        assert_eq!(map.get("2.0000,2.0000").copied(), Some(4.0));
    }

    #[test]
    fn stale_reports_do_not_dilute_fresh_bucket() {
        let now = Utc::now();
        let reports = vec![
            report(5.0, 5.0, 4, TimeDelta::minutes(30), now),
            report(5.0, 5.0, 0, TimeDelta::hours(3), now),
        ];
        let map = aggregate_density(&reports, now);
        assert_eq!(map.get("5.0000,5.0000").copied(), Some(4.0));
    }

    #[test]
    fn classification_thresholds() {
        assert_eq!(classify(2.0), OccupancyStatus::ModeratelyOccupied);
        assert_eq!(classify(2.5), OccupancyStatus::HighlyOccupied);
        assert_eq!(classify(1.0), OccupancyStatus::LightlyOccupied);
        assert_eq!(classify(1.1), OccupancyStatus::ModeratelyOccupied);
        assert_eq!(classify(0.0), OccupancyStatus::LightlyOccupied);
    }

    #[test]
    fn no_matches_is_not_occupied() {
        let result = occupancy(&[]);
        assert_eq!(result.density, 0.0);
        assert_eq!(result.status, OccupancyStatus::NotOccupied);
    }

    #[test]
    fn status_uses_unrounded_mean() {
        // Mean 2.04 rounds to 2.0 for display but is still above 2.
        let now = Utc::now();
        let mut reports = Vec::new();
        for _ in 0..24 {
            reports.push(report(0.0, 0.0, 2, TimeDelta::minutes(1), now));
        }
        reports.push(report(0.0, 0.0, 3, TimeDelta::minutes(1), now));

        let result = occupancy(&reports);
        assert_eq!(result.density, 2.0);
        assert_eq!(result.status, OccupancyStatus::HighlyOccupied);
    }

    #[test]
    fn density_rounds_to_one_decimal() {
        let now = Utc::now();
        let reports = vec![
            report(0.0, 0.0, 1, TimeDelta::minutes(1), now),
            report(0.0, 0.0, 1, TimeDelta::minutes(1), now),
            report(0.0, 0.0, 2, TimeDelta::minutes(1), now),
        ];
        let result = occupancy(&reports);
        assert_eq!(result.density, 1.3);
        assert_eq!(result.status, OccupancyStatus::ModeratelyOccupied);
    }

    #[test]
    fn occupancy_at_uses_box_and_window() {
        let now = Utc::now();
        let reports = vec![
            // Inside the box, fresh.
            report(37.7749, -122.4194, 3, TimeDelta::minutes(5), now),
            report(37.7758, -122.4186, 1, TimeDelta::minutes(5), now),
            // Outside the box.
            report(37.7770, -122.4194, 9, TimeDelta::minutes(5), now),
            // Inside the box, stale.
            report(37.7749, -122.4194, 9, TimeDelta::minutes(61), now),
        ];
        let result = occupancy_at(&reports, &OccupancyQuery::new(37.7749, -122.4194), now);
        assert_eq!(result.density, 2.0);
        assert_eq!(result.status, OccupancyStatus::ModeratelyOccupied);
    }
}
