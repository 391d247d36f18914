//! Coordinates, position fixes and the resolved location snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::air_quality::AirQualityMeasurement;
use crate::region_mapper::RegionClassification;

/// Campus of Konkuk University, used whenever no live position is available
pub const DEFAULT_COORDINATE: Coordinate = Coordinate {
    latitude: 37.5407,
    longitude: 127.0702,
};

/// Address reported whenever reverse geocoding yields nothing usable
pub const DEFAULT_ADDRESS: &str = "서울특별시 광진구 건국대학교";

/// Geographic point in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components finite and inside the WGS84 ranges
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Format coordinate as "lat, lon"
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        DEFAULT_COORDINATE
    }
}

/// A coordinate together with the instant it was measured
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct PositionFix {
    pub coordinate: Coordinate,
    pub timestamp: DateTime<Utc>,
}

impl PositionFix {
    /// A fix measured right now
    #[must_use]
    pub fn now(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            timestamp: Utc::now(),
        }
    }

    /// Age of the fix relative to `now`; fixes from the future count as fresh
    #[must_use]
    pub fn age_at(&self, now: DateTime<Utc>) -> std::time::Duration {
        (now - self.timestamp).to_std().unwrap_or_default()
    }
}

/// One complete resolution: where the user is, what that place is called,
/// which district and region it falls in, and the air there.
///
/// Every field is populated; degraded stages carry their fallback values.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub coordinate: Coordinate,
    pub address: String,
    #[serde(flatten)]
    pub classification: RegionClassification,
    pub measurement: AirQualityMeasurement,
}

impl ResolvedLocation {
    /// Name shown in the header of the main screen
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.address.is_empty() {
            DEFAULT_ADDRESS
        } else {
            &self.address
        }
    }

    /// Display color of the current air-quality grade
    #[must_use]
    pub fn grade_color(&self) -> &'static str {
        self.measurement.grade_color()
    }
}
