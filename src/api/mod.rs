use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    response::Json,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    air_quality::{AirQualitySource, SeoulAirQualityClient},
    config::LocatorConfig,
    error::Result,
    geolocation::ReportedPositionProvider,
    location_resolver::LocationResolver,
    models::{
        AirQualityMeasurement, Coordinate, CurrentWeather, DEFAULT_COORDINATE, PositionFix,
        ResolvedLocation,
    },
    region_mapper::{RegionClassification, map_address_to_region},
    weather::WeatherClient,
};

/// Shared, immutable handles used by every request
#[derive(Clone)]
pub struct AppState {
    pub resolver: LocationResolver,
    pub air_quality: Arc<dyn AirQualitySource>,
    pub weather: Arc<WeatherClient>,
}

impl AppState {
    pub fn from_config(config: &LocatorConfig) -> Result<Self> {
        let resolver =
            LocationResolver::from_config(config, Arc::new(ReportedPositionProvider::denied()))?;

        Ok(Self {
            resolver,
            air_quality: Arc::new(SeoulAirQualityClient::new(&config.air_quality)?),
            weather: Arc::new(WeatherClient::new(&config.weather)?),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Milliseconds since the Unix epoch at which the device took the fix
    pub timestamp: Option<i64>,
}

impl LocationQuery {
    /// The reported fix, or `None` when the device sent no position.
    /// A missing timestamp means "now"; an out-of-range one makes the fix stale.
    fn fix(&self) -> Option<PositionFix> {
        let (lat, lon) = self.lat.zip(self.lon)?;
        let timestamp = match self.timestamp {
            Some(millis) => DateTime::<Utc>::from_timestamp_millis(millis)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            None => Utc::now(),
        };

        Some(PositionFix {
            coordinate: Coordinate::new(lat, lon),
            timestamp,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RegionQuery {
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct AirQualityQuery {
    pub region: Option<String>,
    pub station: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/location", get(get_location))
        .route("/region", get(get_region))
        .route("/air-quality", get(get_air_quality))
        .route("/weather", get(get_weather))
        .route("/health", get(health))
        .with_state(state)
}

async fn get_location(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> Json<ResolvedLocation> {
    let provider = ReportedPositionProvider::new(query.fix());
    let resolved = state
        .resolver
        .with_position_provider(Arc::new(provider))
        .resolve()
        .await;
    Json(resolved)
}

async fn get_region(Query(query): Query<RegionQuery>) -> Json<RegionClassification> {
    Json(map_address_to_region(&query.address))
}

async fn get_air_quality(
    State(state): State<AppState>,
    Query(query): Query<AirQualityQuery>,
) -> Json<AirQualityMeasurement> {
    let measurement = state
        .air_quality
        .air_quality(query.region.as_deref(), query.station.as_deref())
        .await
        .unwrap_or_else(|e| {
            warn!(kind = e.kind().as_str(), "air quality failed, using default: {}", e);
            AirQualityMeasurement::fallback()
        });
    Json(measurement)
}

async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Json<CurrentWeather> {
    let coordinate = query
        .lat
        .zip(query.lon)
        .map(|(lat, lon)| Coordinate::new(lat, lon))
        .filter(Coordinate::is_valid)
        .unwrap_or(DEFAULT_COORDINATE);
    debug!("Weather requested for {}", coordinate.format_coordinates());

    let weather = state
        .weather
        .current_weather(coordinate)
        .await
        .unwrap_or_else(|e| {
            warn!(kind = e.kind().as_str(), "weather failed, using default: {}", e);
            CurrentWeather::fallback()
        });
    Json(weather)
}

async fn health() -> &'static str {
    "ok"
}
