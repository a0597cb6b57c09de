//! [`ObservationStore`] backed by `PostgreSQL`.
//!
//! Inserts run inside a transaction and return the stored row, so the id
//! and the server-side `now()` timestamp come straight from the database.
//! Filtered reads translate an [`ObservationFilter`] into nullable
//! parameters: an unset bound is bound as `NULL` and disables its clause.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crowdmap_core::ObservationFilter;
use crowdmap_types::{
    CrowdReport, CrowdReportId, FavoriteSpot, FavoriteSpotId, NewCrowdReport, NewFavoriteSpot,
    NewParkingSpot, ParkingSpot, ParkingSpotId,
};

use crate::error::DbError;
use crate::postgres::PostgresPool;
use crate::store::ObservationStore;

/// Shared `WHERE` clause for area/age filtered reads.
///
/// `$1..$4` are the box edges, `$5` the exclusive lower time bound.
const FILTER_CLAUSE: &str = r#"($1::DOUBLE PRECISION IS NULL OR latitude BETWEEN $1 AND $2)
  AND ($3::DOUBLE PRECISION IS NULL OR longitude BETWEEN $3 AND $4)
  AND ($5::TIMESTAMPTZ IS NULL OR "timestamp" > $5)"#;

/// Observation store over a `PostgreSQL` pool.
#[derive(Clone)]
pub struct PgObservationStore {
    pool: PostgresPool,
}

impl PgObservationStore {
    /// Wrap a connected (and migrated) pool.
    pub const fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }
}

/// Nullable query parameters derived from a filter.
struct FilterParams {
    min_latitude: Option<f64>,
    max_latitude: Option<f64>,
    min_longitude: Option<f64>,
    max_longitude: Option<f64>,
    observed_after: Option<DateTime<Utc>>,
}

impl From<&ObservationFilter> for FilterParams {
    fn from(filter: &ObservationFilter) -> Self {
        Self {
            min_latitude: filter.bounds.map(|b| b.min_latitude),
            max_latitude: filter.bounds.map(|b| b.max_latitude),
            min_longitude: filter.bounds.map(|b| b.min_longitude),
            max_longitude: filter.bounds.map(|b| b.max_longitude),
            observed_after: filter.observed_after,
        }
    }
}

#[async_trait]
impl ObservationStore for PgObservationStore {
    async fn insert_crowd_report(&self, report: &NewCrowdReport) -> Result<CrowdReport, DbError> {
        let mut tx = self.pool.pool().begin().await?;
        let row = sqlx::query_as::<_, CrowdReportRow>(
            r#"INSERT INTO crowd_report (latitude, longitude, density)
               VALUES ($1, $2, $3)
               RETURNING id, latitude, longitude, density, "timestamp""#,
        )
        .bind(report.latitude)
        .bind(report.longitude)
        .bind(report.density)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::debug!(id = row.id, "Inserted crowd report");
        Ok(row.into())
    }

    async fn all_crowd_reports(&self) -> Result<Vec<CrowdReport>, DbError> {
        let rows = sqlx::query_as::<_, CrowdReportRow>(
            r#"SELECT id, latitude, longitude, density, "timestamp"
               FROM crowd_report
               ORDER BY id"#,
        )
        .fetch_all(self.pool.pool())
        .await?;

        Ok(rows.into_iter().map(CrowdReport::from).collect())
    }

    async fn crowd_reports_matching(
        &self,
        filter: &ObservationFilter,
    ) -> Result<Vec<CrowdReport>, DbError> {
        let params = FilterParams::from(filter);
        let sql = format!(
            r#"SELECT id, latitude, longitude, density, "timestamp"
               FROM crowd_report
               WHERE {FILTER_CLAUSE}
               ORDER BY id"#
        );
        let rows = sqlx::query_as::<_, CrowdReportRow>(&sql)
            .bind(params.min_latitude)
            .bind(params.max_latitude)
            .bind(params.min_longitude)
            .bind(params.max_longitude)
            .bind(params.observed_after)
            .fetch_all(self.pool.pool())
            .await?;

        Ok(rows.into_iter().map(CrowdReport::from).collect())
    }

    async fn insert_favorite_spot(&self, spot: &NewFavoriteSpot) -> Result<FavoriteSpot, DbError> {
        let mut tx = self.pool.pool().begin().await?;
        let row = sqlx::query_as::<_, FavoriteSpotRow>(
            r"INSERT INTO favorite_spot (user_id, latitude, longitude, name)
              VALUES ($1, $2, $3, $4)
              RETURNING id, user_id, latitude, longitude, name",
        )
        .bind(&spot.user_id)
        .bind(spot.latitude)
        .bind(spot.longitude)
        .bind(&spot.name)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::debug!(id = row.id, "Inserted favorite spot");
        Ok(row.into())
    }

    async fn favorite_spots_for(&self, user_id: &str) -> Result<Vec<FavoriteSpot>, DbError> {
        let rows = sqlx::query_as::<_, FavoriteSpotRow>(
            r"SELECT id, user_id, latitude, longitude, name
              FROM favorite_spot
              WHERE user_id = $1
              ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(rows.into_iter().map(FavoriteSpot::from).collect())
    }

    async fn insert_parking_spot(&self, spot: &NewParkingSpot) -> Result<ParkingSpot, DbError> {
        let mut tx = self.pool.pool().begin().await?;
        let row = sqlx::query_as::<_, ParkingSpotRow>(
            r#"INSERT INTO parking_spot (latitude, longitude, available)
               VALUES ($1, $2, $3)
               RETURNING id, latitude, longitude, available, "timestamp""#,
        )
        .bind(spot.latitude)
        .bind(spot.longitude)
        .bind(spot.available)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::debug!(id = row.id, "Inserted parking spot");
        Ok(row.into())
    }

    async fn parking_spots_matching(
        &self,
        filter: &ObservationFilter,
    ) -> Result<Vec<ParkingSpot>, DbError> {
        let params = FilterParams::from(filter);
        let sql = format!(
            r#"SELECT id, latitude, longitude, available, "timestamp"
               FROM parking_spot
               WHERE {FILTER_CLAUSE}
               ORDER BY id"#
        );
        let rows = sqlx::query_as::<_, ParkingSpotRow>(&sql)
            .bind(params.min_latitude)
            .bind(params.max_latitude)
            .bind(params.min_longitude)
            .bind(params.max_longitude)
            .bind(params.observed_after)
            .fetch_all(self.pool.pool())
            .await?;

        Ok(rows.into_iter().map(ParkingSpot::from).collect())
    }

    async fn ping(&self) -> Result<(), DbError> {
        self.pool.ping().await
    }
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `crowd_report` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CrowdReportRow {
    /// Auto-incremented id.
    pub id: i64,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Reported density.
    pub density: i32,
    /// Insert time.
    pub timestamp: DateTime<Utc>,
}

impl From<CrowdReportRow> for CrowdReport {
    fn from(row: CrowdReportRow) -> Self {
        Self {
            id: CrowdReportId(row.id),
            latitude: row.latitude,
            longitude: row.longitude,
            density: row.density,
            timestamp: row.timestamp,
        }
    }
}

/// A row from the `favorite_spot` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FavoriteSpotRow {
    /// Auto-incremented id.
    pub id: i64,
    /// Owner.
    pub user_id: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Display name.
    pub name: String,
}

impl From<FavoriteSpotRow> for FavoriteSpot {
    fn from(row: FavoriteSpotRow) -> Self {
        Self {
            id: FavoriteSpotId(row.id),
            user_id: row.user_id,
            latitude: row.latitude,
            longitude: row.longitude,
            name: row.name,
        }
    }
}

/// A row from the `parking_spot` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ParkingSpotRow {
    /// Auto-incremented id.
    pub id: i64,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Whether the spot was free.
    pub available: bool,
    /// Insert time.
    pub timestamp: DateTime<Utc>,
}

impl From<ParkingSpotRow> for ParkingSpot {
    fn from(row: ParkingSpotRow) -> Self {
        Self {
            id: ParkingSpotId(row.id),
            latitude: row.latitude,
            longitude: row.longitude,
            available: row.available,
            timestamp: row.timestamp,
        }
    }
}
