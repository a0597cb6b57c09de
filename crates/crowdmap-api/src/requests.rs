//! Write payloads and query parameters.
//!
//! Bodies are deserialized into structs whose fields are all optional, so a
//! missing field is reported by name instead of surfacing as an extractor
//! rejection. Present fields are then range-checked with `validator` before
//! being turned into the store's `New*` records.

use axum::extract::rejection::JsonRejection;
use axum::Json;
use crowdmap_types::{NewCrowdReport, NewFavoriteSpot, NewParkingSpot};
use serde::Deserialize;
use validator::Validate;

use crate::error::ApiError;

/// A JSON body that becomes one store record.
pub trait WritePayload: Validate {
    /// The record handed to the store.
    type Record;

    /// Names of required fields absent from the body.
    fn missing_fields(&self) -> Vec<&'static str>;

    /// Convert a complete, validated payload.
    ///
    /// Returns `None` only if a required field is missing.
    fn into_record(self) -> Option<Self::Record>;
}

/// Turn an extracted body into a store record, or a `400`.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] if the body is not JSON of the expected
/// shape, a required field is missing, or a value is out of range.
pub fn parse_payload<P>(payload: Result<Json<P>, JsonRejection>) -> Result<P::Record, ApiError>
where
    P: WritePayload,
{
    let Json(payload) = payload.map_err(|rejection| {
        ApiError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    let missing = payload.missing_fields();
    if !missing.is_empty() {
        return Err(missing_fields_error(&missing));
    }

    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    payload.into_record().ok_or_else(|| {
        ApiError::Validation(String::from("Missing required fields in the request"))
    })
}

fn missing_fields_error(missing: &[&str]) -> ApiError {
    ApiError::Validation(format!(
        "Missing required fields in the request: {}",
        missing.join(", ")
    ))
}

fn absent(fields: &[(&'static str, bool)]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect()
}

// ---------------------------------------------------------------------------
// POST /api/report_crowd
// ---------------------------------------------------------------------------

/// Body of `POST /api/report_crowd`.
#[derive(Debug, Deserialize, Validate)]
pub struct ReportCrowdRequest {
    /// Latitude in decimal degrees.
    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be within [-90, 90]"))]
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "longitude must be within [-180, 180]"
    ))]
    pub longitude: Option<f64>,
    /// Crowd density.
    #[validate(range(min = 0, message = "density must not be negative"))]
    pub density: Option<i32>,
}

impl WritePayload for ReportCrowdRequest {
    type Record = NewCrowdReport;

    fn missing_fields(&self) -> Vec<&'static str> {
        absent(&[
            ("latitude", self.latitude.is_some()),
            ("longitude", self.longitude.is_some()),
            ("density", self.density.is_some()),
        ])
    }

    fn into_record(self) -> Option<NewCrowdReport> {
        Some(NewCrowdReport {
            latitude: self.latitude?,
            longitude: self.longitude?,
            density: self.density?,
        })
    }
}

// ---------------------------------------------------------------------------
// POST /api/favorite_spots
// ---------------------------------------------------------------------------

/// Body of `POST /api/favorite_spots`.
#[derive(Debug, Deserialize, Validate)]
pub struct AddFavoriteSpotRequest {
    /// Owner.
    #[validate(length(min = 1, message = "user_id must not be empty"))]
    pub user_id: Option<String>,
    /// Latitude in decimal degrees.
    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be within [-90, 90]"))]
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "longitude must be within [-180, 180]"
    ))]
    pub longitude: Option<f64>,
    /// Display name.
    #[validate(length(
        min = 1,
        max = 100,
        message = "name must be 1 to 100 characters"
    ))]
    pub name: Option<String>,
}

impl WritePayload for AddFavoriteSpotRequest {
    type Record = NewFavoriteSpot;

    fn missing_fields(&self) -> Vec<&'static str> {
        absent(&[
            ("user_id", self.user_id.is_some()),
            ("latitude", self.latitude.is_some()),
            ("longitude", self.longitude.is_some()),
            ("name", self.name.is_some()),
        ])
    }

    fn into_record(self) -> Option<NewFavoriteSpot> {
        Some(NewFavoriteSpot {
            user_id: self.user_id?,
            latitude: self.latitude?,
            longitude: self.longitude?,
            name: self.name?,
        })
    }
}

// ---------------------------------------------------------------------------
// POST /api/report_parking
// ---------------------------------------------------------------------------

/// Body of `POST /api/report_parking`.
#[derive(Debug, Deserialize, Validate)]
pub struct ReportParkingRequest {
    /// Latitude in decimal degrees.
    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be within [-90, 90]"))]
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "longitude must be within [-180, 180]"
    ))]
    pub longitude: Option<f64>,
    /// Whether the spot is free.
    pub available: Option<bool>,
}

impl WritePayload for ReportParkingRequest {
    type Record = NewParkingSpot;

    fn missing_fields(&self) -> Vec<&'static str> {
        absent(&[
            ("latitude", self.latitude.is_some()),
            ("longitude", self.longitude.is_some()),
            ("available", self.available.is_some()),
        ])
    }

    fn into_record(self) -> Option<NewParkingSpot> {
        Some(NewParkingSpot {
            latitude: self.latitude?,
            longitude: self.longitude?,
            available: self.available?,
        })
    }
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/get_specific_crowd_density`.
///
/// Kept as strings so a non-numeric value is a `400` with our own message.
#[derive(Debug, Default, Deserialize)]
pub struct SpecificDensityQuery {
    /// Target latitude.
    pub lat: Option<String>,
    /// Target longitude.
    pub lng: Option<String>,
}

impl SpecificDensityQuery {
    /// Parse both coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] if either is missing, empty, or not
    /// a finite number.
    pub fn coordinates(&self) -> Result<(f64, f64), ApiError> {
        let (Some(lat), Some(lng)) = (
            self.lat.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            self.lng.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        ) else {
            return Err(ApiError::Validation(String::from(
                "Latitude and longitude are required",
            )));
        };

        match (lat.parse::<f64>(), lng.parse::<f64>()) {
            (Ok(lat), Ok(lng)) if lat.is_finite() && lng.is_finite() => Ok((lat, lng)),
            _ => Err(ApiError::Validation(String::from(
                "Latitude and longitude must be numbers",
            ))),
        }
    }
}

/// Query parameters for `GET /api/favorite_spots`.
#[derive(Debug, Default, Deserialize)]
pub struct FavoriteSpotsQuery {
    /// Owner whose spots to list.
    pub user_id: Option<String>,
}
