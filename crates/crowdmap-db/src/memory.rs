//! In-process [`ObservationStore`].
//!
//! Backs `memory://` connection strings and the API tests. Filters are
//! evaluated with [`ObservationFilter::matches`], the same predicate the
//! `PostgreSQL` store encodes in SQL.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crowdmap_core::ObservationFilter;
use crowdmap_types::{
    CrowdReport, CrowdReportId, FavoriteSpot, FavoriteSpotId, NewCrowdReport, NewFavoriteSpot,
    NewParkingSpot, ParkingSpot, ParkingSpotId,
};
use tokio::sync::RwLock;

use crate::error::DbError;
use crate::store::ObservationStore;

#[derive(Debug, Default)]
struct Tables {
    crowd_reports: Vec<CrowdReport>,
    favorite_spots: Vec<FavoriteSpot>,
    parking_spots: Vec<ParkingSpot>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id = self.last_id.saturating_add(1);
        self.last_id
    }
}

/// Append-only observation tables held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: while set, every operation fails with
    /// [`DbError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), DbError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(DbError::Unavailable(String::from("in-memory store is offline")))
        } else {
            Ok(())
        }
    }

    /// Insert a crowd report with an explicit timestamp, bypassing the clock.
    pub async fn insert_crowd_report_at(
        &self,
        report: &NewCrowdReport,
        timestamp: DateTime<Utc>,
    ) -> CrowdReport {
        let mut tables = self.tables.write().await;
        let stored = CrowdReport {
            id: CrowdReportId(tables.next_id()),
            latitude: report.latitude,
            longitude: report.longitude,
            density: report.density,
            timestamp,
        };
        tables.crowd_reports.push(stored.clone());
        stored
    }

    /// Insert a parking report with an explicit timestamp, bypassing the clock.
    pub async fn insert_parking_spot_at(
        &self,
        spot: &NewParkingSpot,
        timestamp: DateTime<Utc>,
    ) -> ParkingSpot {
        let mut tables = self.tables.write().await;
        let stored = ParkingSpot {
            id: ParkingSpotId(tables.next_id()),
            latitude: spot.latitude,
            longitude: spot.longitude,
            available: spot.available,
            timestamp,
        };
        tables.parking_spots.push(stored.clone());
        stored
    }
}

#[async_trait]
impl ObservationStore for MemoryStore {
    async fn insert_crowd_report(&self, report: &NewCrowdReport) -> Result<CrowdReport, DbError> {
        self.check_available()?;
        Ok(self.insert_crowd_report_at(report, Utc::now()).await)
    }

    async fn all_crowd_reports(&self) -> Result<Vec<CrowdReport>, DbError> {
        self.check_available()?;
        Ok(self.tables.read().await.crowd_reports.clone())
    }

    async fn crowd_reports_matching(
        &self,
        filter: &ObservationFilter,
    ) -> Result<Vec<CrowdReport>, DbError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .crowd_reports
            .iter()
            .filter(|r| filter.matches(*r))
            .cloned()
            .collect())
    }

    async fn insert_favorite_spot(&self, spot: &NewFavoriteSpot) -> Result<FavoriteSpot, DbError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let stored = FavoriteSpot {
            id: FavoriteSpotId(tables.next_id()),
            user_id: spot.user_id.clone(),
            latitude: spot.latitude,
            longitude: spot.longitude,
            name: spot.name.clone(),
        };
        tables.favorite_spots.push(stored.clone());
        Ok(stored)
    }

    async fn favorite_spots_for(&self, user_id: &str) -> Result<Vec<FavoriteSpot>, DbError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .favorite_spots
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_parking_spot(&self, spot: &NewParkingSpot) -> Result<ParkingSpot, DbError> {
        self.check_available()?;
        Ok(self.insert_parking_spot_at(spot, Utc::now()).await)
    }

    async fn parking_spots_matching(
        &self,
        filter: &ObservationFilter,
    ) -> Result<Vec<ParkingSpot>, DbError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .parking_spots
            .iter()
            .filter(|s| filter.matches(*s))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), DbError> {
        self.check_available()
    }
}
