//! RealtimeCityAir XML payload parsing
//!
//! The payload is deserialized into a document tree and fields are read by
//! element name. Successful responses look like
//!
//! ```xml
//! <RealtimeCityAir>
//!   <list_total_count>25</list_total_count>
//!   <RESULT><CODE>INFO-000</CODE><MESSAGE>정상 처리되었습니다</MESSAGE></RESULT>
//!   <row><MSRDT>202410181500</MSRDT><MSRRGN_NM>동북권</MSRRGN_NM>...</row>
//! </RealtimeCityAir>
//! ```
//!
//! while failures are a bare `<RESULT>` document carrying only the code.

use quick_xml::de::from_str;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{LocatorError, Result};
use crate::models::AirQualityMeasurement;

/// Status code of a successful response
pub const SUCCESS_CODE: &str = "INFO-000";

#[derive(Debug, Deserialize)]
struct CityAirDocument {
    #[serde(rename = "RESULT")]
    result: Option<ResultStatus>,
    // present at the top level when the document root is <RESULT> itself
    #[serde(rename = "CODE")]
    code: Option<String>,
    #[serde(rename = "MESSAGE")]
    message: Option<String>,
    #[serde(rename = "row", default)]
    rows: Vec<StationRow>,
}

#[derive(Debug, Deserialize)]
struct ResultStatus {
    #[serde(rename = "CODE")]
    code: Option<String>,
    #[serde(rename = "MESSAGE")]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StationRow {
    #[serde(rename = "MSRDT")]
    measured_at: Option<String>,
    #[serde(rename = "MSRRGN_NM")]
    region_name: Option<String>,
    #[serde(rename = "MSRSTE_NM")]
    station_name: Option<String>,
    #[serde(rename = "PM10")]
    pm10: Option<String>,
    #[serde(rename = "PM25")]
    pm25: Option<String>,
    #[serde(rename = "O3")]
    ozone: Option<String>,
    #[serde(rename = "IDEX_NM")]
    grade: Option<String>,
    #[serde(rename = "IDEX_MVL")]
    index: Option<String>,
}

impl CityAirDocument {
    fn status(&self) -> (Option<&str>, Option<&str>) {
        let nested = self.result.as_ref();
        let code = nested
            .and_then(|r| r.code.as_deref())
            .or(self.code.as_deref())
            .map(str::trim)
            .filter(|c| !c.is_empty());
        let message = nested
            .and_then(|r| r.message.as_deref())
            .or(self.message.as_deref())
            .map(str::trim)
            .filter(|m| !m.is_empty());
        (code, message)
    }
}

impl From<&StationRow> for AirQualityMeasurement {
    fn from(row: &StationRow) -> Self {
        Self {
            pm10: parse_reading(row.pm10.as_deref()),
            pm25: parse_reading(row.pm25.as_deref()),
            ozone: parse_reading(row.ozone.as_deref()),
            region_name: text(row.region_name.as_deref()),
            station_name: text(row.station_name.as_deref()),
            grade: text(row.grade.as_deref()),
            index: parse_reading(row.index.as_deref()),
            measured_at: text(row.measured_at.as_deref()),
        }
    }
}

/// Numeric reading; missing, unparseable, negative or non-finite values are 0
fn parse_reading(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.0)
}

fn text(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

/// Parse every station row of a payload, checking the status code first
pub fn parse_stations(xml: &str) -> Result<Vec<AirQualityMeasurement>> {
    if xml.trim().is_empty() {
        return Err(LocatorError::malformed("empty air-quality response"));
    }

    let document: CityAirDocument = from_str(xml)
        .map_err(|e| LocatorError::malformed(format!("failed to parse air-quality XML: {e}")))?;

    if let (Some(code), message) = document.status() {
        if code != SUCCESS_CODE {
            let message = message.unwrap_or("Unknown error");
            warn!(code, message, "air-quality service returned an error code");
            return Err(LocatorError::upstream(code, message));
        }
    }

    if document.rows.is_empty() {
        return Err(LocatorError::no_data("response contains no row element"));
    }

    let stations: Vec<AirQualityMeasurement> =
        document.rows.iter().map(AirQualityMeasurement::from).collect();
    debug!("Parsed {} station rows", stations.len());
    Ok(stations)
}

/// Parse a raw response body into the measurement of its first station
pub fn parse_air_quality(body: &[u8]) -> Result<AirQualityMeasurement> {
    let xml = std::str::from_utf8(body)
        .map_err(|e| LocatorError::malformed(format!("response is not UTF-8 text: {e}")))?;

    parse_stations(xml)?
        .into_iter()
        .next()
        .ok_or_else(|| LocatorError::no_data("response contains no row element"))
}
