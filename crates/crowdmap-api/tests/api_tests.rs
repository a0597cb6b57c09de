//! Integration tests for the Crowdmap API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. The router runs against the in-memory store, so
//! handler logic, routing, and status mapping are validated without a
//! database.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{TimeDelta, Utc};
use crowdmap_api::router::build_router;
use crowdmap_api::state::AppState;
use crowdmap_core::AppConfig;
use crowdmap_db::{MemoryStore, ObservationStore};
use crowdmap_types::{NewCrowdReport, NewParkingSpot};
use serde_json::{json, Value};
use tower::ServiceExt;

const LAT: f64 = 37.7749;
const LNG: f64 = -122.4194;

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = Some(String::from("memory://"));
    config
}

fn make_router(store: &Arc<MemoryStore>) -> Router {
    let state = AppState::new(store.clone(), test_config());
    build_router(Arc::new(state))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn post_json(router: Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

fn hours_ago(hours: i64) -> chrono::DateTime<Utc> {
    Utc::now()
        .checked_sub_signed(TimeDelta::hours(hours))
        .unwrap()
}

// =========================================================================
// Index
// =========================================================================

#[tokio::test]
async fn test_index_returns_html() {
    let store = Arc::new(MemoryStore::new());
    let response = make_router(&store)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/html"));
}

// =========================================================================
// Crowd reports
// =========================================================================

#[tokio::test]
async fn test_report_crowd_then_density_map() {
    let store = Arc::new(MemoryStore::new());

    for density in [1, 3] {
        let (status, body) = post_json(
            make_router(&store),
            "/api/report_crowd",
            &json!({"latitude": LAT, "longitude": LNG, "density": density}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Report submitted successfully");
    }

    let (status, body) = get(make_router(&store), "/api/get_crowd_density").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"37.7749,-122.4194": 2.0}));
}

#[tokio::test]
async fn test_density_map_ignores_stale_reports() {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_crowd_report_at(
            &NewCrowdReport {
                latitude: 10.0,
                longitude: 20.0,
                density: 5,
            },
            hours_ago(2),
        )
        .await;

    let (status, body) = get(make_router(&store), "/api/get_crowd_density").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn test_report_crowd_missing_fields_is_400() {
    let store = Arc::new(MemoryStore::new());
    let (status, body) = post_json(
        make_router(&store),
        "/api/report_crowd",
        &json!({"latitude": LAT}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("longitude"));
    assert!(message.contains("density"));
}

#[tokio::test]
async fn test_report_crowd_malformed_json_is_400() {
    let store = Arc::new(MemoryStore::new());
    let response = make_router(&store)
        .oneshot(
            Request::post("/api/report_crowd")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_store_failure_is_500_with_generic_message() {
    let store = Arc::new(MemoryStore::new());
    store.set_unavailable(true);

    let (status, body) = post_json(
        make_router(&store),
        "/api/report_crowd",
        &json!({"latitude": LAT, "longitude": LNG, "density": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "An unexpected error occurred");

    let (status, _) = get(make_router(&store), "/api/get_crowd_density").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = get(make_router(&store), "/api/get_parking").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

// =========================================================================
// Specific density
// =========================================================================

#[tokio::test]
async fn test_specific_density_averages_nearby_reports() {
    let store = Arc::new(MemoryStore::new());
    for (lat, density) in [(LAT, 2), (LAT + 0.0005, 3), (LAT + 0.002, 0)] {
        post_json(
            make_router(&store),
            "/api/report_crowd",
            &json!({"latitude": lat, "longitude": LNG, "density": density}),
        )
        .await;
    }

    let (status, body) = get(
        make_router(&store),
        "/api/get_specific_crowd_density?lat=37.7749&lng=-122.4194",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["density"].as_f64(), Some(2.5));
    assert_eq!(body["status"], "Highly occupied");
}

#[tokio::test]
async fn test_specific_density_with_no_reports_is_not_occupied() {
    let store = Arc::new(MemoryStore::new());
    let (status, body) = get(
        make_router(&store),
        "/api/get_specific_crowd_density?lat=1.0&lng=2.0",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["density"].as_f64(), Some(0.0));
    assert_eq!(body["status"], "Not occupied");
}

#[tokio::test]
async fn test_specific_density_requires_coordinates() {
    let store = Arc::new(MemoryStore::new());

    let (status, body) = get(
        make_router(&store),
        "/api/get_specific_crowd_density?lat=1.0",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Latitude and longitude are required");

    let (status, body) = get(
        make_router(&store),
        "/api/get_specific_crowd_density?lat=north&lng=2.0",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Latitude and longitude must be numbers");
}

// =========================================================================
// Favorite spots
// =========================================================================

#[tokio::test]
async fn test_favorite_spots_are_scoped_by_user() {
    let store = Arc::new(MemoryStore::new());

    for (user, name) in [("alice", "Cafe"), ("alice", "Park"), ("bob", "Gym")] {
        let (status, body) = post_json(
            make_router(&store),
            "/api/favorite_spots",
            &json!({"user_id": user, "latitude": LAT, "longitude": LNG, "name": name}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Favorite spot added successfully");
    }

    let (status, body) = get(make_router(&store), "/api/favorite_spots?user_id=alice").await;
    assert_eq!(status, StatusCode::OK);
    let spots = body.as_array().unwrap();
    assert_eq!(spots.len(), 2);
    let names: Vec<&str> = spots.iter().map(|s| s["name"].as_str().unwrap()).collect();
    assert!(names.contains(&"Cafe"));
    assert!(names.contains(&"Park"));
    assert!(spots.iter().all(|s| s.get("user_id").is_none()));
    assert!(spots.iter().all(|s| s["id"].is_number()));

    let (_, body) = get(make_router(&store), "/api/favorite_spots?user_id=carol").await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_favorite_spot_round_trips_exactly() {
    let store = Arc::new(MemoryStore::new());
    let (status, _) = post_json(
        make_router(&store),
        "/api/favorite_spots",
        &json!({"user_id": "dana", "latitude": 48.8584, "longitude": 2.2945, "name": "Tower"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let stored = store.favorite_spots_for("dana").await.unwrap();
    assert_eq!(stored.len(), 1);
    let stored_id = stored.first().unwrap().id.into_inner();

    let (status, body) = get(make_router(&store), "/api/favorite_spots?user_id=dana").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{"id": stored_id, "latitude": 48.8584, "longitude": 2.2945, "name": "Tower"}])
    );

    let (_, body) = get(make_router(&store), "/api/favorite_spots?user_id=erin").await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_favorite_spots_without_user_is_empty() {
    let store = Arc::new(MemoryStore::new());
    post_json(
        make_router(&store),
        "/api/favorite_spots",
        &json!({"user_id": "alice", "latitude": LAT, "longitude": LNG, "name": "Cafe"}),
    )
    .await;

    let (status, body) = get(make_router(&store), "/api/favorite_spots").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_add_favorite_spot_missing_name_is_400() {
    let store = Arc::new(MemoryStore::new());
    let (status, body) = post_json(
        make_router(&store),
        "/api/favorite_spots",
        &json!({"user_id": "alice", "latitude": LAT, "longitude": LNG}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("name"));
}

// =========================================================================
// Parking
// =========================================================================

#[tokio::test]
async fn test_report_parking_then_list_recent() {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_parking_spot_at(
            &NewParkingSpot {
                latitude: 1.0,
                longitude: 1.0,
                available: false,
            },
            hours_ago(3),
        )
        .await;

    let (status, body) = post_json(
        make_router(&store),
        "/api/report_parking",
        &json!({"latitude": LAT, "longitude": LNG, "available": true}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Parking report submitted successfully");

    let (status, body) = get(make_router(&store), "/api/get_parking").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{"latitude": LAT, "longitude": LNG, "available": true}])
    );
}

#[tokio::test]
async fn test_report_parking_wrong_type_is_400() {
    let store = Arc::new(MemoryStore::new());
    let (status, _) = post_json(
        make_router(&store),
        "/api/report_parking",
        &json!({"latitude": LAT, "longitude": LNG, "available": "yes"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =========================================================================
// Diagnostics
// =========================================================================

#[tokio::test]
async fn test_check_database_success() {
    let store = Arc::new(MemoryStore::new());
    let (status, body) = get(make_router(&store), "/check_database").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Database connection successful.");
    assert_eq!(body["database_url"], "memory://****");
    assert_eq!(body["environment_variables"]["PGHOST"], "Not set");
    assert_eq!(body["environment_variables"]["PGPASSWORD"], "Not set");
}

#[tokio::test]
async fn test_check_database_reports_failure_and_masks_secrets() {
    let store = Arc::new(MemoryStore::new());
    store.set_unavailable(true);

    let mut config = AppConfig::default();
    config
        .apply_overrides_from(|name| match name {
            "DATABASE_URL" => Some(String::from("postgresql://user:secret@db:5432/crowd")),
            "PGHOST" => Some(String::from("db")),
            "PGPASSWORD" => Some(String::from("secret")),
            _ => None,
        })
        .unwrap();
    let router = build_router(Arc::new(AppState::new(store, config)));

    let (status, body) = get(router, "/check_database").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    assert_eq!(
        body["message"],
        "Database connection failed. Please check your configuration."
    );
    assert_eq!(body["database_url"], "postgresql://****db:5432/crowd");
    assert_eq!(body["environment_variables"]["PGHOST"], "db");
    assert_eq!(body["environment_variables"]["PGPASSWORD"], "****");
    assert!(!body.to_string().contains("secret"));
}

#[tokio::test]
async fn test_nonexistent_route_returns_404() {
    let store = Arc::new(MemoryStore::new());
    let response = make_router(&store)
        .oneshot(Request::get("/api/nonexistent").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
