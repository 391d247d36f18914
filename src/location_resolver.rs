//! Location Resolution Module
//!
//! Turns the device position into a [`ResolvedLocation`]: coordinate, address,
//! district/region classification and the current air-quality measurement.
//! Every stage has a fallback, so resolution itself never fails.

use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::air_quality::{AirQualitySource, SeoulAirQualityClient};
use crate::config::LocatorConfig;
use crate::error::{LocatorError, Result};
use crate::geocoding::{KakaoGeocoder, ReverseGeocoder};
use crate::geolocation::{PermissionPrompt, PermissionStatus, PositionOptions, PositionProvider};
use crate::models::{
    AirQualityMeasurement, Coordinate, DEFAULT_ADDRESS, DEFAULT_COORDINATE, ResolvedLocation,
};
use crate::region_mapper::map_address_to_region;

/// Per-stage time bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTimeouts {
    pub geocoding: Duration,
    pub air_quality: Duration,
}

impl Default for StageTimeouts {
    fn default() -> Self {
        Self {
            geocoding: Duration::from_secs(5),
            air_quality: Duration::from_secs(5),
        }
    }
}

/// Orchestrates position → address → region → air quality
#[derive(Clone)]
pub struct LocationResolver {
    position: Arc<dyn PositionProvider>,
    geocoder: Arc<dyn ReverseGeocoder>,
    air_quality: Arc<dyn AirQualitySource>,
    options: PositionOptions,
    timeouts: StageTimeouts,
    prompt: PermissionPrompt,
}

impl LocationResolver {
    #[must_use]
    pub fn new(
        position: Arc<dyn PositionProvider>,
        geocoder: Arc<dyn ReverseGeocoder>,
        air_quality: Arc<dyn AirQualitySource>,
    ) -> Self {
        Self {
            position,
            geocoder,
            air_quality,
            options: PositionOptions::default(),
            timeouts: StageTimeouts::default(),
            prompt: PermissionPrompt::default(),
        }
    }

    /// Build a resolver with the configured Kakao and Seoul clients
    pub fn from_config(config: &LocatorConfig, position: Arc<dyn PositionProvider>) -> Result<Self> {
        let geocoder = Arc::new(KakaoGeocoder::new(&config.geocoding)?);
        let air_quality = Arc::new(SeoulAirQualityClient::new(&config.air_quality)?);

        Ok(Self::new(position, geocoder, air_quality)
            .with_options(PositionOptions::from(&config.position))
            .with_timeouts(StageTimeouts {
                geocoding: config.geocoding.timeout(),
                air_quality: config.air_quality.timeout(),
            }))
    }

    #[must_use]
    pub fn with_options(mut self, options: PositionOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_timeouts(mut self, timeouts: StageTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Same collaborators, different position source
    #[must_use]
    pub fn with_position_provider(&self, position: Arc<dyn PositionProvider>) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }

    /// Resolve the current location. Never fails; degraded stages use defaults.
    #[instrument(skip(self))]
    pub async fn resolve(&self) -> ResolvedLocation {
        let (coordinate, address) = match self.position.request_permission(&self.prompt).await {
            PermissionStatus::Denied => {
                log_fallback("permission", &LocatorError::PermissionDenied);
                (DEFAULT_COORDINATE, DEFAULT_ADDRESS.to_string())
            }
            PermissionStatus::Granted => {
                let coordinate = self
                    .acquire_position()
                    .await
                    .unwrap_or_else(|e| fallback("position", &e, DEFAULT_COORDINATE));
                let address = self
                    .reverse_geocode(coordinate)
                    .await
                    .unwrap_or_else(|e| fallback("geocoding", &e, DEFAULT_ADDRESS.to_string()));
                (coordinate, address)
            }
        };

        let classification = map_address_to_region(&address);
        debug!(
            "Address '{}' classified as {}/{}",
            address,
            classification.region_name(),
            classification.district_name()
        );

        let measurement = self
            .fetch_air_quality(classification.region_name(), classification.district_name())
            .await
            .unwrap_or_else(|e| fallback("air quality", &e, AirQualityMeasurement::fallback()));

        info!(
            "Resolved {} -> '{}' ({} {}), PM10 {}",
            coordinate.format_coordinates(),
            address,
            classification.region_name(),
            classification.district_name(),
            measurement.pm10
        );

        ResolvedLocation {
            coordinate,
            address,
            classification,
            measurement,
        }
    }

    async fn acquire_position(&self) -> Result<Coordinate> {
        let limit = self.options.timeout;
        let fix = bounded(limit, self.position.current_position(&self.options), || {
            LocatorError::AcquisitionTimeout {
                seconds: limit.as_secs(),
            }
        })
        .await?;

        if !self.options.is_fresh(&fix, Utc::now()) {
            return Err(LocatorError::position_unavailable(format!(
                "fix is {}s old",
                fix.age_at(Utc::now()).as_secs()
            )));
        }
        if !fix.coordinate.is_valid() {
            return Err(LocatorError::position_unavailable(format!(
                "invalid coordinate {}",
                fix.coordinate.format_coordinates()
            )));
        }

        Ok(fix.coordinate)
    }

    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<String> {
        let limit = self.timeouts.geocoding;
        let address = bounded(limit, self.geocoder.reverse_geocode(coordinate), || {
            LocatorError::network(format!("geocoding timed out after {}ms", limit.as_millis()))
        })
        .await?;

        if address.trim().is_empty() {
            return Err(LocatorError::no_data("geocoder returned an empty address"));
        }
        Ok(address)
    }

    async fn fetch_air_quality(
        &self,
        region: &str,
        station: &str,
    ) -> Result<AirQualityMeasurement> {
        let region = (!region.is_empty()).then_some(region);
        let station = (!station.is_empty()).then_some(station);
        let limit = self.timeouts.air_quality;
        bounded(limit, self.air_quality.air_quality(region, station), || {
            LocatorError::network(format!("air quality timed out after {}ms", limit.as_millis()))
        })
        .await
    }
}

/// Await `future`, failing with `on_elapsed()` once `limit` has passed
async fn bounded<T, F, E>(limit: Duration, future: F, on_elapsed: E) -> Result<T>
where
    F: Future<Output = Result<T>>,
    E: FnOnce() -> LocatorError,
{
    tokio::time::timeout(limit, future)
        .await
        .unwrap_or_else(|_| Err(on_elapsed()))
}

fn log_fallback(stage: &str, err: &LocatorError) {
    warn!(
        stage,
        kind = err.kind().as_str(),
        "{} failed, using default: {}",
        stage,
        err
    );
}

fn fallback<T>(stage: &str, err: &LocatorError, default: T) -> T {
    log_fallback(stage, err);
    default
}
