//! The observation store contract.
//!
//! Handlers only ever see `Arc<dyn ObservationStore>`; the concrete backend
//! is chosen once at startup from the connection string by [`open_store`].
//! Every write is atomic: a failed insert leaves nothing behind.

use std::sync::Arc;

use async_trait::async_trait;
use crowdmap_core::config::DatabaseSection;
use crowdmap_core::ObservationFilter;
use crowdmap_types::{
    CrowdReport, FavoriteSpot, NewCrowdReport, NewFavoriteSpot, NewParkingSpot, ParkingSpot,
};

use crate::error::DbError;
use crate::memory::MemoryStore;
use crate::pg_store::PgObservationStore;
use crate::postgres::{PostgresConfig, PostgresPool};
use crate::url::StoreBackend;

/// Create and query operations over the three observation kinds.
#[async_trait]
pub trait ObservationStore: Send + Sync {
    /// Persist a crowd report, stamping it with the insert time.
    async fn insert_crowd_report(&self, report: &NewCrowdReport) -> Result<CrowdReport, DbError>;

    /// Every crowd report ever stored.
    async fn all_crowd_reports(&self) -> Result<Vec<CrowdReport>, DbError>;

    /// Crowd reports matching an area/age predicate.
    async fn crowd_reports_matching(
        &self,
        filter: &ObservationFilter,
    ) -> Result<Vec<CrowdReport>, DbError>;

    /// Persist a favorite spot.
    async fn insert_favorite_spot(&self, spot: &NewFavoriteSpot) -> Result<FavoriteSpot, DbError>;

    /// Favorite spots owned by `user_id`, oldest first.
    async fn favorite_spots_for(&self, user_id: &str) -> Result<Vec<FavoriteSpot>, DbError>;

    /// Persist a parking report, stamping it with the insert time.
    async fn insert_parking_spot(&self, spot: &NewParkingSpot) -> Result<ParkingSpot, DbError>;

    /// Parking reports matching an area/age predicate.
    async fn parking_spots_matching(
        &self,
        filter: &ObservationFilter,
    ) -> Result<Vec<ParkingSpot>, DbError>;

    /// Cheap round trip proving the store is reachable.
    async fn ping(&self) -> Result<(), DbError>;
}

/// Open the store selected by `url`.
///
/// `PostgreSQL` stores are connected with the pool settings from `settings`
/// and migrated before being returned.
///
/// # Errors
///
/// Returns [`DbError::Config`] for an unsupported URL, or a connection or
/// migration error from `PostgreSQL`.
pub async fn open_store(
    url: &str,
    settings: &DatabaseSection,
) -> Result<Arc<dyn ObservationStore>, DbError> {
    match StoreBackend::from_url(url)? {
        StoreBackend::Postgres { url } => {
            let config = PostgresConfig::from_settings(&url, settings);
            let pool = PostgresPool::connect(&config).await?;
            pool.run_migrations().await?;
            Ok(Arc::new(PgObservationStore::new(pool)))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory observation store; data is not persisted");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
