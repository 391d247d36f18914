//! Seoul real-time city air-quality client
//!
//! Queries the `RealtimeCityAir` service of the Seoul Open API and hands the
//! XML body to [`parser`].

pub mod parser;

use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use crate::config::{AirQualityConfig, usable_key};
use crate::error::{LocatorError, Result};
use crate::models::AirQualityMeasurement;

const SERVICE_NAME: &str = "RealtimeCityAir";

/// Anything that can produce the current measurement for a region/station
#[async_trait]
pub trait AirQualitySource: Send + Sync {
    /// Current measurement, optionally narrowed by macro-region and station.
    ///
    /// Empty strings are treated the same as `None`.
    async fn air_quality(
        &self,
        region: Option<&str>,
        station: Option<&str>,
    ) -> Result<AirQualityMeasurement>;
}

/// HTTP client for the Seoul Open API
#[derive(Debug, Clone)]
pub struct SeoulAirQualityClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    max_results: u32,
}

impl SeoulAirQualityClient {
    /// Create a new client from the air-quality configuration
    pub fn new(config: &AirQualityConfig) -> Result<Self> {
        Self::with_timeout(config, config.timeout())
    }

    pub fn with_timeout(config: &AirQualityConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("seoul-air-locator/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key: usable_key(config.api_key.as_deref()).map(str::to_string),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_results: config.max_results,
        })
    }

    /// Build the request URL.
    ///
    /// Region and station are trailing path segments. When only a station is
    /// given the region segment is sent as a single encoded space.
    fn request_url(&self, key: &str, region: Option<&str>, station: Option<&str>) -> String {
        let mut url = format!(
            "{}/{}/xml/{SERVICE_NAME}/1/{}",
            self.base_url,
            urlencoding::encode(key),
            self.max_results
        );

        match (region, station) {
            (Some(region), Some(station)) => {
                url.push('/');
                url.push_str(&urlencoding::encode(region));
                url.push('/');
                url.push_str(&urlencoding::encode(station));
            }
            (Some(region), None) => {
                url.push('/');
                url.push_str(&urlencoding::encode(region));
            }
            (None, Some(station)) => {
                url.push_str("/%20/");
                url.push_str(&urlencoding::encode(station));
            }
            (None, None) => {}
        }

        url
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[async_trait]
impl AirQualitySource for SeoulAirQualityClient {
    #[instrument(skip(self))]
    async fn air_quality(
        &self,
        region: Option<&str>,
        station: Option<&str>,
    ) -> Result<AirQualityMeasurement> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(LocatorError::CredentialMissing {
                service: "Seoul Open API",
            });
        };

        let region = non_blank(region);
        let station = non_blank(station);
        let url = self.request_url(key, region, station);
        debug!(
            "Air-quality request URL: {}",
            url.replace(&*urlencoding::encode(key), "***")
        );

        let start_time = Instant::now();
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Air-quality service answered HTTP {}", status);
            return Err(LocatorError::network(format!(
                "air-quality service returned HTTP {status}"
            )));
        }

        let body = response.bytes().await?;
        let measurement = parser::parse_air_quality(&body)?;

        info!(
            "Air quality for {} ({}) retrieved in {:.3}s",
            measurement.station_name,
            measurement.region_name,
            start_time.elapsed().as_secs_f64()
        );
        Ok(measurement)
    }
}
