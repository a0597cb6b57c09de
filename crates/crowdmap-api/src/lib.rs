//! HTTP API for the Crowdmap service.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Crowd endpoints** for submitting density reports and reading the
//!   density map or the occupancy around one point
//! - **Favorite spot endpoints** for saving and listing a user's places
//! - **Parking endpoints** for submitting and reading availability reports
//! - **Diagnostics** (`GET /check_database`) reporting store connectivity
//! - **Minimal HTML page** (`GET /`) listing the endpoints
//!
//! # Architecture
//!
//! Handlers hold an injected [`ObservationStore`] and never cache
//! observations. Every read recomputes its answer from the store with the
//! pure aggregation functions in `crowdmap-core`, so no request depends on
//! another and any number can run concurrently.
//!
//! [`ObservationStore`]: crowdmap_db::ObservationStore

pub mod error;
pub mod handlers;
pub mod requests;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{start_server, ServerConfig, ServerError};
pub use state::AppState;
