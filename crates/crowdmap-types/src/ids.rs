//! Type-safe identifier wrappers around store-assigned row ids.
//!
//! Every observation kind has its own id type so a favorite spot id can
//! never be passed where a crowd report id is expected. Ids are assigned by
//! the store on insert (`BIGSERIAL` in `PostgreSQL`, a counter in the
//! in-memory store) and are never generated by clients.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around `i64` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(transparent)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(#[ts(type = "number")] pub i64);

        impl $name {
            /// Return the inner row id.
            pub const fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a crowd density report.
    CrowdReportId
}

define_id! {
    /// Unique identifier for a user's favorite spot.
    FavoriteSpotId
}

define_id! {
    /// Unique identifier for a parking availability report.
    ParkingSpotId
}
