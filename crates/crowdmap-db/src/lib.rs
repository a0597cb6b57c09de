//! Observation store for the Crowdmap service.
//!
//! Crowd reports, favorite spots, and parking reports are append-only
//! records. This crate defines the [`ObservationStore`] contract the HTTP
//! layer depends on, and two implementations of it:
//!
//! ```text
//! DATABASE_URL
//!     |
//!     +-- postgres:// | postgresql:// --> PgObservationStore (PostgresPool)
//!     |
//!     +-- memory:// ------------------> MemoryStore
//! ```
//!
//! # Modules
//!
//! - [`store`] -- The [`ObservationStore`] trait and [`open_store`]
//! - [`postgres`] -- `PostgreSQL` connection pool and migrations
//! - [`pg_store`] -- `PostgreSQL`-backed store
//! - [`memory`] -- In-process store
//! - [`url`] -- Backend selection and credential masking
//! - [`error`] -- Shared error types

pub mod error;
pub mod memory;
pub mod pg_store;
pub mod postgres;
pub mod store;
pub mod url;

// Re-export primary types for convenience.
pub use error::DbError;
pub use memory::MemoryStore;
pub use pg_store::PgObservationStore;
pub use postgres::{PostgresConfig, PostgresPool};
pub use store::{open_store, ObservationStore};
pub use url::{mask_database_url, normalize_postgres_url, StoreBackend};
