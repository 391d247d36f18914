//! `seoul-air-locator` - Location, district and air-quality resolution for Seoul
//!
//! This library turns a device position into an address, classifies it into
//! one of Seoul's districts and macro-regions, and fetches the current
//! air-quality measurement for it, falling back to defaults at every stage.

pub mod air_quality;
pub mod api;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod geolocation;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod region_mapper;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use air_quality::{AirQualitySource, SeoulAirQualityClient, parser::parse_air_quality};
pub use config::LocatorConfig;
pub use error::{ErrorKind, LocatorError};
pub use geocoding::{KakaoGeocoder, ReverseGeocoder};
pub use geolocation::{
    FixedPositionProvider, IpPositionProvider, PermissionPrompt, PermissionStatus,
    PositionOptions, PositionProvider, ReportedPositionProvider,
};
pub use location_resolver::{LocationResolver, StageTimeouts};
pub use models::{
    AirQualityGrade, AirQualityMeasurement, Coordinate, CurrentWeather, DEFAULT_ADDRESS,
    DEFAULT_COORDINATE, PositionFix, ResolvedLocation,
};
pub use region_mapper::{District, Region, RegionClassification, map_address_to_region};
pub use weather::WeatherClient;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, LocatorError>;
