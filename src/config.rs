//! Configuration management for the locator
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::LocatorError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Placeholder values shipped in sample env files; treated as "no key"
const PLACEHOLDER_KEYS: [&str; 3] = [
    "YOUR_KAKAO_REST_API_KEY",
    "YOUR_SEOUL_API_KEY",
    "YOUR_OPENWEATHER_API_KEY",
];

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocatorConfig {
    /// Device position acquisition
    #[serde(default)]
    pub position: PositionConfig,
    /// Reverse geocoding service
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Real-time air-quality service
    #[serde(default)]
    pub air_quality: AirQualityConfig,
    /// Current weather service
    #[serde(default)]
    pub weather: WeatherConfig,
    /// HTTP API server
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Position acquisition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionConfig {
    /// Upper bound on waiting for a fix, in seconds
    #[serde(default = "default_position_timeout")]
    pub timeout_seconds: u32,
    /// Oldest fix still accepted, in seconds
    #[serde(default = "default_maximum_age")]
    pub maximum_age_seconds: u32,
    /// Ask the provider for its most precise source
    #[serde(default = "default_high_accuracy")]
    pub enable_high_accuracy: bool,
    /// Endpoint of the IP-based position lookup
    #[serde(default = "default_ip_lookup_url")]
    pub ip_lookup_url: String,
}

/// Reverse geocoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Kakao REST API key
    pub api_key: Option<String>,
    /// Base URL of the local geo API
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_geocoding_timeout")]
    pub timeout_seconds: u32,
}

/// Air-quality service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirQualityConfig {
    /// Seoul Open API key
    pub api_key: Option<String>,
    /// Base URL of the Seoul Open API
    #[serde(default = "default_air_quality_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_air_quality_timeout")]
    pub timeout_seconds: u32,
    /// Number of station rows requested per query
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

/// Weather service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key
    pub api_key: Option<String>,
    /// Base URL for weather API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_position_timeout() -> u32 {
    10
}

fn default_maximum_age() -> u32 {
    60
}

fn default_high_accuracy() -> bool {
    true
}

fn default_ip_lookup_url() -> String {
    "https://ipinfo.io/json".to_string()
}

fn default_geocoding_base_url() -> String {
    "https://dapi.kakao.com/v2/local/geo".to_string()
}

fn default_geocoding_timeout() -> u32 {
    5
}

fn default_air_quality_base_url() -> String {
    "http://openAPI.seoul.go.kr:8088".to_string()
}

fn default_air_quality_timeout() -> u32 {
    5
}

fn default_max_results() -> u32 {
    5
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_weather_timeout() -> u32 {
    10
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_position_timeout(),
            maximum_age_seconds: default_maximum_age(),
            enable_high_accuracy: default_high_accuracy(),
            ip_lookup_url: default_ip_lookup_url(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_geocoding_base_url(),
            timeout_seconds: default_geocoding_timeout(),
        }
    }
}

impl Default for AirQualityConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_air_quality_base_url(),
            timeout_seconds: default_air_quality_timeout(),
            max_results: default_max_results(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl PositionConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }

    #[must_use]
    pub fn maximum_age(&self) -> Duration {
        Duration::from_secs(self.maximum_age_seconds.into())
    }
}

impl GeocodingConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl AirQualityConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl WeatherConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

/// The key itself when it is set to something other than blank or a placeholder
#[must_use]
pub fn usable_key(key: Option<&str>) -> Option<&str> {
    key.map(str::trim)
        .filter(|k| !k.is_empty() && !PLACEHOLDER_KEYS.contains(k))
}

impl LocatorConfig {
    /// Load configuration from the given file (or the default location) and
    /// environment variables
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // SEOUL_AIR_GEOCODING__API_KEY, SEOUL_AIR_SERVER__PORT, ...
        builder = builder.add_source(
            Environment::with_prefix("SEOUL_AIR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: LocatorConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_credentials_from(|name| std::env::var(name).ok());
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("seoul-air-locator").join("config.toml"))
    }

    /// Fill unset keys from the conventional variables used by the mobile app
    /// (`KAKAO_REST_API_KEY`, `SEOUL_API_KEY`, `OPENWEATHER_API_KEY`).
    pub fn apply_credentials_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.geocoding.api_key.is_none() {
            self.geocoding.api_key = lookup("KAKAO_REST_API_KEY");
        }
        if self.air_quality.api_key.is_none() {
            self.air_quality.api_key = lookup("SEOUL_API_KEY");
        }
        if self.weather.api_key.is_none() {
            self.weather.api_key =
                lookup("OPENWEATHER_API_KEY").or_else(|| lookup("REACT_APP_OPENWEATHER_API_KEY"));
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.position.timeout_seconds == 0 {
            self.position.timeout_seconds = default_position_timeout();
        }
        if self.position.ip_lookup_url.is_empty() {
            self.position.ip_lookup_url = default_ip_lookup_url();
        }
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.geocoding.timeout_seconds == 0 {
            self.geocoding.timeout_seconds = default_geocoding_timeout();
        }
        if self.air_quality.base_url.is_empty() {
            self.air_quality.base_url = default_air_quality_base_url();
        }
        if self.air_quality.timeout_seconds == 0 {
            self.air_quality.timeout_seconds = default_air_quality_timeout();
        }
        if self.air_quality.max_results == 0 {
            self.air_quality.max_results = default_max_results();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        let timeouts = [
            ("Position", self.position.timeout_seconds),
            ("Geocoding", self.geocoding.timeout_seconds),
            ("Air-quality", self.air_quality.timeout_seconds),
            ("Weather", self.weather.timeout_seconds),
        ];
        for (name, seconds) in timeouts {
            if seconds > 60 {
                return Err(LocatorError::config(format!(
                    "{name} timeout cannot exceed 60 seconds"
                ))
                .into());
            }
        }

        if self.position.maximum_age_seconds > 3600 {
            return Err(LocatorError::config(
                "Position maximum age cannot exceed 3600 seconds",
            )
            .into());
        }

        if !(1..=1000).contains(&self.air_quality.max_results) {
            return Err(LocatorError::config(
                "Air-quality max results must be between 1 and 1000",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(LocatorError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(LocatorError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("Position lookup", &self.position.ip_lookup_url),
            ("Geocoding", &self.geocoding.base_url),
            ("Air-quality", &self.air_quality.base_url),
            ("Weather", &self.weather.base_url),
        ];
        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(LocatorError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LocatorConfig::default();
        assert_eq!(config.position.timeout_seconds, 10);
        assert_eq!(config.position.maximum_age_seconds, 60);
        assert!(config.position.enable_high_accuracy);
        assert_eq!(config.geocoding.base_url, "https://dapi.kakao.com/v2/local/geo");
        assert_eq!(config.air_quality.timeout(), Duration::from_secs(5));
        assert_eq!(config.air_quality.max_results, 5);
        assert_eq!(config.logging.level, "info");
        assert!(config.geocoding.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_usable_key() {
        assert_eq!(usable_key(Some("abc123")), Some("abc123"));
        assert_eq!(usable_key(Some("  abc123 ")), Some("abc123"));
        assert_eq!(usable_key(Some("")), None);
        assert_eq!(usable_key(Some("   ")), None);
        assert_eq!(usable_key(Some("YOUR_KAKAO_REST_API_KEY")), None);
        assert_eq!(usable_key(None), None);
    }

    #[test]
    fn test_credentials_from_legacy_variables() {
        let vars = HashMap::from([
            ("KAKAO_REST_API_KEY", "kakao-key"),
            ("SEOUL_API_KEY", "seoul-key"),
            ("REACT_APP_OPENWEATHER_API_KEY", "owm-key"),
        ]);
        let mut config = LocatorConfig::default();
        config.air_quality.api_key = Some("from-file".to_string());
        config.apply_credentials_from(|name| vars.get(name).map(|v| (*v).to_string()));

        assert_eq!(config.geocoding.api_key.as_deref(), Some("kakao-key"));
        // explicit configuration wins over the legacy variable
        assert_eq!(config.air_quality.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.weather.api_key.as_deref(), Some("owm-key"));
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = LocatorConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = LocatorConfig::default();
        config.air_quality.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));

        let mut config = LocatorConfig::default();
        config.air_quality.max_results = 5000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_urls() {
        let mut config = LocatorConfig::default();
        config.geocoding.base_url = "dapi.kakao.com".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Geocoding base URL"));
    }

    #[test]
    fn test_apply_defaults_fills_zeroes() {
        let mut config = LocatorConfig::default();
        config.geocoding.timeout_seconds = 0;
        config.air_quality.base_url = String::new();
        config.apply_defaults();
        assert_eq!(config.geocoding.timeout_seconds, 5);
        assert_eq!(config.air_quality.base_url, "http://openAPI.seoul.go.kr:8088");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            r#"
[air_quality]
api_key = "file-seoul-key"
max_results = 10

[server]
port = 8080

[logging]
format = "json"
"#
        )
        .unwrap();

        let config = LocatorConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.air_quality.api_key.as_deref(), Some("file-seoul-key"));
        assert_eq!(config.air_quality.max_results, 10);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.position.timeout_seconds, 10);
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = LocatorConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("seoul-air-locator"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
