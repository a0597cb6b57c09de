//! Error types for the service binary.
//!
//! [`AppError`] is the top-level error type that wraps all possible
//! failure modes during startup and serving.

/// Top-level error for the service binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crowdmap_core::ConfigError,
    },

    /// The observation store could not be opened or reached.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: crowdmap_db::DbError,
    },

    /// The HTTP server failed to start or stopped abnormally.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: crowdmap_api::ServerError,
    },
}
