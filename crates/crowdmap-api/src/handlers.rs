//! REST API endpoint handlers.
//!
//! Writes go straight to the store. Reads fetch observations from the store
//! and reduce them with the pure functions in [`crowdmap_core`], passing the
//! request time as `now`.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `POST` | `/api/report_crowd` | Submit a crowd density report |
//! | `GET` | `/api/get_crowd_density` | Density map of the last hour |
//! | `GET` | `/api/get_specific_crowd_density` | Occupancy near `?lat=&lng=` |
//! | `GET` | `/api/favorite_spots` | List a user's favorite spots |
//! | `POST` | `/api/favorite_spots` | Save a favorite spot |
//! | `POST` | `/api/report_parking` | Submit a parking report |
//! | `GET` | `/api/get_parking` | Parking reports of the last hour |
//! | `GET` | `/check_database` | Store connectivity diagnostics |

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use axum::Json;
use chrono::Utc;
use crowdmap_core::{aggregate_density, occupancy, ObservationFilter, OccupancyQuery};
use crowdmap_db::mask_database_url;
use crowdmap_types::{
    DensityMap, FavoriteSpotEntry, MessageResponse, Occupancy, ParkingAvailability,
};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::error::ApiError;
use crate::requests::{
    parse_payload, AddFavoriteSpotRequest, FavoriteSpotsQuery, ReportCrowdRequest,
    ReportParkingRequest, SpecificDensityQuery,
};
use crate::state::AppState;

/// Placeholder shown for unset diagnostics values.
const NOT_SET: &str = "Not set";

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page listing the API.
pub async fn index() -> impl IntoResponse {
    Html(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Crowdmap</title>
    <style>
        body {
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }
        h1 { color: #58a6ff; margin-bottom: 0.25rem; }
        .subtitle { color: #8b949e; margin-top: 0; }
        a { color: #58a6ff; text-decoration: none; }
        a:hover { text-decoration: underline; }
        ul { list-style: none; padding: 0; }
        li { padding: 0.3rem 0; }
        .verb { color: #7ee787; font-weight: bold; }
    </style>
</head>
<body>
    <h1>Crowdmap</h1>
    <p class="subtitle">Crowd density and parking availability reports</p>

    <h2>API Endpoints</h2>
    <ul>
        <li><span class="verb">POST</span> /api/report_crowd -- Submit {latitude, longitude, density}</li>
        <li><span class="verb">GET</span> <a href="/api/get_crowd_density">/api/get_crowd_density</a> -- Density map (last hour)</li>
        <li><span class="verb">GET</span> /api/get_specific_crowd_density?lat=&amp;lng= -- Occupancy near a point</li>
        <li><span class="verb">GET</span> /api/favorite_spots?user_id= -- A user's favorite spots</li>
        <li><span class="verb">POST</span> /api/favorite_spots -- Save {user_id, latitude, longitude, name}</li>
        <li><span class="verb">POST</span> /api/report_parking -- Submit {latitude, longitude, available}</li>
        <li><span class="verb">GET</span> <a href="/api/get_parking">/api/get_parking</a> -- Parking reports (last hour)</li>
        <li><span class="verb">GET</span> <a href="/check_database">/check_database</a> -- Store diagnostics</li>
    </ul>
</body>
</html>"#,
    )
}

// ---------------------------------------------------------------------------
// Crowd reports
// ---------------------------------------------------------------------------

/// Store one crowd density report.
pub async fn report_crowd(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ReportCrowdRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    debug!(?payload, "Received crowd report");
    let report = parse_payload(payload)?;

    let stored = state.store.insert_crowd_report(&report).await?;
    info!(id = %stored.id, density = stored.density, "Crowd report submitted");

    Ok(Json(MessageResponse::new("Report submitted successfully")))
}

/// Return the density map built from every report of the last hour.
pub async fn get_crowd_density(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DensityMap>, ApiError> {
    let reports = state.store.all_crowd_reports().await?;
    debug!(count = reports.len(), "Retrieved crowd reports");

    let map = aggregate_density(&reports, Utc::now());
    if map.is_empty() {
        info!("No recent crowd reports");
    } else {
        debug!(buckets = map.len(), "Calculated density map");
    }
    Ok(Json(map))
}

/// Return the occupancy around one coordinate pair.
///
/// # Query Parameters
///
/// - `lat`, `lng`: required decimal degrees
pub async fn get_specific_crowd_density(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SpecificDensityQuery>,
) -> Result<Json<Occupancy>, ApiError> {
    let (latitude, longitude) = params.coordinates()?;
    let query = OccupancyQuery::new(latitude, longitude);

    let matched = state
        .store
        .crowd_reports_matching(&query.filter(Utc::now()))
        .await?;
    let result = occupancy(&matched);
    debug!(
        latitude,
        longitude,
        matched = matched.len(),
        status = %result.status,
        "Calculated occupancy"
    );
    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// Favorite spots
// ---------------------------------------------------------------------------

/// List the favorite spots of `?user_id=`.
///
/// Without a `user_id` nothing can match, so the list is empty.
pub async fn list_favorite_spots(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FavoriteSpotsQuery>,
) -> Result<Json<Vec<FavoriteSpotEntry>>, ApiError> {
    let Some(user_id) = params.user_id else {
        return Ok(Json(Vec::new()));
    };

    let spots = state.store.favorite_spots_for(&user_id).await?;
    debug!(count = spots.len(), user_id = %user_id, "Retrieved favorite spots");

    Ok(Json(spots.into_iter().map(FavoriteSpotEntry::from).collect()))
}

/// Save one favorite spot.
pub async fn add_favorite_spot(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AddFavoriteSpotRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    debug!(?payload, "Received favorite spot");
    let spot = parse_payload(payload)?;

    let stored = state.store.insert_favorite_spot(&spot).await?;
    info!(id = %stored.id, user_id = %stored.user_id, "Favorite spot added");

    Ok(Json(MessageResponse::new("Favorite spot added successfully")))
}

// ---------------------------------------------------------------------------
// Parking
// ---------------------------------------------------------------------------

/// Store one parking availability report.
pub async fn report_parking(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ReportParkingRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    debug!(?payload, "Received parking report");
    let spot = parse_payload(payload)?;

    let stored = state.store.insert_parking_spot(&spot).await?;
    info!(id = %stored.id, available = stored.available, "Parking report submitted");

    Ok(Json(MessageResponse::new(
        "Parking report submitted successfully",
    )))
}

/// Return every parking report of the last hour.
pub async fn get_parking(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ParkingAvailability>>, ApiError> {
    let spots = state
        .store
        .parking_spots_matching(&ObservationFilter::recent(Utc::now()))
        .await?;
    debug!(count = spots.len(), "Retrieved recent parking reports");

    Ok(Json(spots.iter().map(ParkingAvailability::from).collect()))
}

// ---------------------------------------------------------------------------
// GET /check_database -- diagnostics
// ---------------------------------------------------------------------------

/// Body of `GET /check_database`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseCheck {
    /// `success` or `error`.
    pub status: &'static str,
    /// Human-readable outcome.
    pub message: &'static str,
    /// Connection string with credentials masked.
    pub database_url: String,
    /// libpq variables as seen at startup.
    pub environment_variables: EnvironmentReport,
}

/// libpq variables reported by the diagnostics endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_field_names)]
pub struct EnvironmentReport {
    /// `PGHOST`.
    #[serde(rename = "PGHOST")]
    pub pg_host: String,
    /// `PGPORT`.
    #[serde(rename = "PGPORT")]
    pub pg_port: String,
    /// `PGDATABASE`.
    #[serde(rename = "PGDATABASE")]
    pub pg_database: String,
    /// `PGUSER`.
    #[serde(rename = "PGUSER")]
    pub pg_user: String,
    /// `****` when `PGPASSWORD` is set.
    #[serde(rename = "PGPASSWORD")]
    pub pg_password: String,
}

/// Report whether the store answers, plus masked connection details.
///
/// Always `200`; the outcome is in the body.
pub async fn check_database(State(state): State<Arc<AppState>>) -> Json<DatabaseCheck> {
    let connected = match state.store.ping().await {
        Ok(()) => {
            info!("Database connection successful");
            true
        }
        Err(e) => {
            error!(error = %e, "Database connection failed");
            false
        }
    };

    let config = &state.config;
    let env = &config.pg_environment;
    let or_not_set = |v: &Option<String>| v.clone().unwrap_or_else(|| NOT_SET.to_owned());

    Json(DatabaseCheck {
        status: if connected { "success" } else { "error" },
        message: if connected {
            "Database connection successful."
        } else {
            "Database connection failed. Please check your configuration."
        },
        database_url: config
            .database_url()
            .map_or_else(|_| NOT_SET.to_owned(), mask_database_url),
        environment_variables: EnvironmentReport {
            pg_host: or_not_set(&env.host),
            pg_port: or_not_set(&env.port),
            pg_database: or_not_set(&env.database),
            pg_user: or_not_set(&env.user),
            pg_password: if env.password_set { "****" } else { NOT_SET }.to_owned(),
        },
    })
}
