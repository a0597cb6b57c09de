//! Shared application state for the HTTP API.
//!
//! [`AppState`] carries the injected observation store and the startup
//! configuration. It is built once, wrapped in [`Arc`], and handed to the
//! router; handlers only read from it.

use std::sync::Arc;

use crowdmap_core::AppConfig;
use crowdmap_db::ObservationStore;

/// Shared state for the Axum application.
///
/// Injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// The observation store selected at startup.
    pub store: Arc<dyn ObservationStore>,
    /// Immutable service configuration.
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Bundle a store with the configuration it was opened from.
    pub fn new(store: Arc<dyn ObservationStore>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
