//! Reverse geocoding through the Kakao Local API

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use crate::config::{GeocodingConfig, usable_key};
use crate::error::{LocatorError, Result};
use crate::models::Coordinate;

/// Administrative (행정동) documents, as opposed to legal (`B`) ones
const ADMINISTRATIVE_REGION: &str = "H";

/// Coordinate → human-readable address
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct RegionCodeResponse {
    documents: Vec<RegionDocument>,
}

#[derive(Debug, Deserialize)]
struct RegionDocument {
    region_type: String,
    #[serde(default)]
    region_1depth_name: String,
    #[serde(default)]
    region_2depth_name: String,
}

impl RegionCodeResponse {
    /// "시/도 구/군" of the first administrative document
    fn address(&self) -> Option<String> {
        self.documents
            .iter()
            .find(|doc| doc.region_type == ADMINISTRATIVE_REGION)
            .map(|doc| {
                format!("{} {}", doc.region_1depth_name, doc.region_2depth_name)
                    .trim()
                    .to_string()
            })
            .filter(|address| !address.is_empty())
    }
}

/// `coord2regioncode` client
#[derive(Debug, Clone)]
pub struct KakaoGeocoder {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl KakaoGeocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        Self::with_timeout(config, config.timeout())
    }

    pub fn with_timeout(config: &GeocodingConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("seoul-air-locator/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key: usable_key(config.api_key.as_deref()).map(str::to_string),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ReverseGeocoder for KakaoGeocoder {
    #[instrument(skip(self), fields(lat = coordinate.latitude, lon = coordinate.longitude))]
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<String> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(LocatorError::CredentialMissing {
                service: "Kakao Local API",
            });
        };

        // Kakao expects longitude as x and latitude as y
        let url = format!(
            "{}/coord2regioncode.json?x={}&y={}",
            self.base_url, coordinate.longitude, coordinate.latitude
        );
        debug!("Reverse geocoding request URL: {}", url);

        let start_time = Instant::now();
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("KakaoAK {key}"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Geocoding service answered HTTP {}", status);
            return Err(LocatorError::network(format!(
                "geocoding service returned HTTP {status}"
            )));
        }

        let body: RegionCodeResponse = response.json().await?;
        let address = body.address().ok_or_else(|| {
            LocatorError::no_data("no administrative region for coordinate")
        })?;

        info!(
            "Reverse geocoded {} to '{}' in {:.3}s",
            coordinate.format_coordinates(),
            address,
            start_time.elapsed().as_secs_f64()
        );
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_geocoder(base_url: &str, api_key: Option<&str>) -> KakaoGeocoder {
        let config = GeocodingConfig {
            api_key: api_key.map(str::to_string),
            base_url: base_url.to_string(),
            ..GeocodingConfig::default()
        };
        KakaoGeocoder::new(&config).unwrap()
    }

    fn documents() -> serde_json::Value {
        serde_json::json!({
            "meta": { "total_count": 2 },
            "documents": [
                {
                    "region_type": "B",
                    "address_name": "서울특별시 광진구 화양동",
                    "region_1depth_name": "서울특별시",
                    "region_2depth_name": "광진구",
                    "region_3depth_name": "화양동",
                    "code": "1121510700"
                },
                {
                    "region_type": "H",
                    "address_name": "서울특별시 광진구 화양동",
                    "region_1depth_name": "서울특별시",
                    "region_2depth_name": "광진구",
                    "region_3depth_name": "화양동",
                    "code": "1121571000"
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_reverse_geocode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/coord2regioncode.json"))
            .and(query_param("x", "127.0702"))
            .and(query_param("y", "37.5407"))
            .and(header("Authorization", "KakaoAK test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(documents()))
            .expect(1)
            .mount(&server)
            .await;

        let geocoder = test_geocoder(&server.uri(), Some("test-key"));
        let address = geocoder
            .reverse_geocode(Coordinate::new(37.5407, 127.0702))
            .await
            .unwrap();
        assert_eq!(address, "서울특별시 광진구");
    }

    #[tokio::test]
    async fn test_only_administrative_documents_count() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "documents": [{
                    "region_type": "B",
                    "region_1depth_name": "서울특별시",
                    "region_2depth_name": "광진구"
                }]
            })))
            .mount(&server)
            .await;

        let geocoder = test_geocoder(&server.uri(), Some("test-key"));
        let err = geocoder
            .reverse_geocode(Coordinate::new(37.5407, 127.0702))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoDataFound);
    }

    #[tokio::test]
    async fn test_placeholder_key_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(documents()))
            .expect(0)
            .mount(&server)
            .await;

        for key in [None, Some(""), Some("YOUR_KAKAO_REST_API_KEY")] {
            let geocoder = test_geocoder(&server.uri(), key);
            let err = geocoder
                .reverse_geocode(Coordinate::new(37.5407, 127.0702))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::CredentialMissing);
        }
    }

    #[tokio::test]
    async fn test_missing_documents_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"errorType": "AccessDeniedError"})),
            )
            .mount(&server)
            .await;

        let geocoder = test_geocoder(&server.uri(), Some("test-key"));
        let err = geocoder
            .reverse_geocode(Coordinate::new(37.5407, 127.0702))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_unauthorized_is_network_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let geocoder = test_geocoder(&server.uri(), Some("wrong-key"));
        let err = geocoder
            .reverse_geocode(Coordinate::new(37.5407, 127.0702))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkFailure);
    }
}
