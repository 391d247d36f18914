//! Current weather from the OpenWeatherMap API

use reqwest::Client;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::config::{WeatherConfig, usable_key};
use crate::error::{LocatorError, Result};
use crate::models::{Coordinate, CurrentWeather};

/// `OpenWeatherMap` current weather response structures
mod openweathermap {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct CurrentResponse {
        pub weather: Vec<Condition>,
        pub main: MainData,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        pub main: String,
        #[serde(default)]
        pub icon: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct MainData {
        pub temp: f64,
        pub humidity: f64,
    }
}

impl TryFrom<openweathermap::CurrentResponse> for CurrentWeather {
    type Error = LocatorError;

    fn try_from(response: openweathermap::CurrentResponse) -> Result<Self> {
        let condition = response
            .weather
            .first()
            .ok_or_else(|| LocatorError::no_data("weather response has no condition"))?;

        let condition = CurrentWeather::condition_for_icon(&condition.icon)
            .map_or_else(|| condition.main.clone(), str::to_string);

        Ok(Self {
            temperature: response.main.temp.round() as i32,
            condition,
            humidity: response.main.humidity.round() as i32,
        })
    }
}

/// Client for the current weather endpoint
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl WeatherClient {
    /// Create a new weather client
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("seoul-air-locator/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key: usable_key(config.api_key.as_deref()).map(str::to_string),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Current conditions at a coordinate
    #[instrument(skip(self), fields(lat = coordinate.latitude, lon = coordinate.longitude))]
    pub async fn current_weather(&self, coordinate: Coordinate) -> Result<CurrentWeather> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(LocatorError::CredentialMissing {
                service: "OpenWeatherMap",
            });
        };

        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}&units=metric&lang=kr",
            self.base_url,
            coordinate.latitude,
            coordinate.longitude,
            urlencoding::encode(key)
        );
        debug!(
            "Weather request URL: {}/weather?lat={}&lon={}&appid=***&units=metric&lang=kr",
            self.base_url, coordinate.latitude, coordinate.longitude
        );

        let start_time = Instant::now();
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Weather service answered HTTP {}", status);
            return Err(LocatorError::network(format!(
                "weather service returned HTTP {status}"
            )));
        }

        let body: openweathermap::CurrentResponse = response.json().await?;
        let weather = CurrentWeather::try_from(body)?;

        info!(
            "Current weather {} {} retrieved in {:.3}s",
            weather.format_temperature(),
            weather.condition,
            start_time.elapsed().as_secs_f64()
        );
        Ok(weather)
    }
}
