//! Enumeration types for the Crowdmap service.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Occupancy classification for a single location.
///
/// Serialized as the human-readable label the map front end displays
/// (e.g. `"Highly occupied"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum OccupancyStatus {
    /// No fresh report exists near the location.
    #[serde(rename = "Not occupied")]
    NotOccupied,
    /// Mean density of at most 1.
    #[serde(rename = "Lightly occupied")]
    LightlyOccupied,
    /// Mean density above 1 and at most 2.
    #[serde(rename = "Moderately occupied")]
    ModeratelyOccupied,
    /// Mean density above 2.
    #[serde(rename = "Highly occupied")]
    HighlyOccupied,
}

impl OccupancyStatus {
    /// The label sent to clients.
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotOccupied => "Not occupied",
            Self::LightlyOccupied => "Lightly occupied",
            Self::ModeratelyOccupied => "Moderately occupied",
            Self::HighlyOccupied => "Highly occupied",
        }
    }
}

impl core::fmt::Display for OccupancyStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_as_label() {
        for status in [
            OccupancyStatus::NotOccupied,
            OccupancyStatus::LightlyOccupied,
            OccupancyStatus::ModeratelyOccupied,
            OccupancyStatus::HighlyOccupied,
        ] {
            let json = serde_json::to_string(&status).unwrap_or_default();
            assert_eq!(json, format!("\"{}\"", status.label()));
        }
    }
}
