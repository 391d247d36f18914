//! Data models for the locator
//!
//! This module contains the core domain models organized by concern:
//! - Location: coordinates, position fixes and the resolved snapshot
//! - Air quality: station measurements and grades
//! - Weather: current conditions

pub mod air_quality;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use air_quality::{AirQualityGrade, AirQualityMeasurement};
pub use location::{Coordinate, DEFAULT_ADDRESS, DEFAULT_COORDINATE, PositionFix, ResolvedLocation};
pub use weather::CurrentWeather;
