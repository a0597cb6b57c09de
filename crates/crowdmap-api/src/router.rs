//! Axum router construction for the HTTP API.
//!
//! Assembles all routes into a single [`Router`] with CORS enabled for the
//! map front end and request tracing.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `POST /api/report_crowd` -- submit a crowd report
/// - `GET /api/get_crowd_density` -- density map
/// - `GET /api/get_specific_crowd_density` -- single-location occupancy
/// - `GET|POST /api/favorite_spots` -- list or save favorite spots
/// - `POST /api/report_parking` -- submit a parking report
/// - `GET /api/get_parking` -- recent parking reports
/// - `GET /check_database` -- store diagnostics
///
/// CORS allows any origin.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // Crowd density
        .route(
            "/api/report_crowd",
            axum::routing::post(handlers::report_crowd),
        )
        .route("/api/get_crowd_density", get(handlers::get_crowd_density))
        .route(
            "/api/get_specific_crowd_density",
            get(handlers::get_specific_crowd_density),
        )
        // Favorite spots
        .route(
            "/api/favorite_spots",
            get(handlers::list_favorite_spots).post(handlers::add_favorite_spot),
        )
        // Parking
        .route(
            "/api/report_parking",
            axum::routing::post(handlers::report_parking),
        )
        .route("/api/get_parking", get(handlers::get_parking))
        // Diagnostics
        .route("/check_database", get(handlers::check_database))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
