//! Current weather data model and display methods

use serde::{Deserialize, Serialize};

/// Current conditions at a coordinate
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentWeather {
    /// Temperature in Celsius, rounded
    pub temperature: i32,
    /// Korean description of the sky (e.g. "맑음", "흐림")
    pub condition: String,
    /// Relative humidity percentage, rounded
    pub humidity: i32,
}

impl CurrentWeather {
    /// Conditions shown when the weather service is unavailable
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            temperature: 18,
            condition: "흐림".to_string(),
            humidity: 65,
        }
    }

    /// Map an OpenWeatherMap icon code ("01d", "10n", ...) to a Korean condition
    #[must_use]
    pub fn condition_for_icon(icon: &str) -> Option<&'static str> {
        let code = icon.get(..2)?;
        match code {
            "01" => Some("맑음"),
            "02" => Some("약한 구름"),
            "03" => Some("구름"),
            "04" => Some("흐림"),
            "09" | "10" => Some("비"),
            "11" => Some("천둥번개"),
            "13" => Some("눈"),
            "50" => Some("안개"),
            _ => None,
        }
    }

    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{}°C", self.temperature)
    }
}
