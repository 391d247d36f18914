//! Air-quality measurement model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Color used for a missing or unrecognised grade
pub const UNKNOWN_GRADE_COLOR: &str = "#757575";

/// Qualitative category assigned by the measurement service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AirQualityGrade {
    #[serde(rename = "좋음")]
    Good,
    #[serde(rename = "보통")]
    Moderate,
    #[serde(rename = "나쁨")]
    Bad,
    #[serde(rename = "매우나쁨")]
    VeryBad,
}

impl AirQualityGrade {
    /// Korean label exactly as the service reports it
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AirQualityGrade::Good => "좋음",
            AirQualityGrade::Moderate => "보통",
            AirQualityGrade::Bad => "나쁨",
            AirQualityGrade::VeryBad => "매우나쁨",
        }
    }

    /// Hex color for badges and cards
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            AirQualityGrade::Good => "#4CAF50",
            AirQualityGrade::Moderate => "#8BC34A",
            AirQualityGrade::Bad => "#FF9800",
            AirQualityGrade::VeryBad => "#F44336",
        }
    }
}

impl FromStr for AirQualityGrade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "좋음" => Ok(AirQualityGrade::Good),
            "보통" => Ok(AirQualityGrade::Moderate),
            "나쁨" => Ok(AirQualityGrade::Bad),
            "매우나쁨" | "매우 나쁨" => Ok(AirQualityGrade::VeryBad),
            other => Err(format!("unknown air-quality grade: {other}")),
        }
    }
}

impl fmt::Display for AirQualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One station's real-time readings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AirQualityMeasurement {
    /// Fine dust PM10 in µg/m³
    pub pm10: f64,
    /// Ultrafine dust PM2.5 in µg/m³
    pub pm25: f64,
    /// Ozone in ppm
    pub ozone: f64,
    /// Macro-region reported by the service (e.g. "동북권")
    pub region_name: String,
    /// Measuring station (e.g. "광진구")
    pub station_name: String,
    /// Grade text; empty when the service did not report one
    pub grade: String,
    /// Integrated air-quality index value
    pub index: f64,
    /// Measurement time as reported, e.g. "202410181500"
    pub measured_at: String,
}

impl AirQualityMeasurement {
    /// Readings shown when the service cannot be reached
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            pm10: 81.0,
            pm25: 45.0,
            ozone: 0.035,
            region_name: "도심권".to_string(),
            station_name: String::new(),
            grade: AirQualityGrade::Bad.label().to_string(),
            index: 54.0,
            measured_at: String::new(),
        }
    }

    /// Parsed grade, `None` when empty or unrecognised
    #[must_use]
    pub fn grade_level(&self) -> Option<AirQualityGrade> {
        self.grade.parse().ok()
    }

    #[must_use]
    pub fn grade_color(&self) -> &'static str {
        self.grade_level()
            .map_or(UNKNOWN_GRADE_COLOR, AirQualityGrade::color)
    }
}
