//! Device position acquisition
//!
//! A [`PositionProvider`] negotiates permission and produces position fixes.
//! The server never sees a GPS itself: the mobile client reports its fix with
//! each request, and the IP lookup covers the command-line use.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::PositionConfig;
use crate::error::{LocatorError, Result};
use crate::models::{Coordinate, PositionFix};

/// Outcome of a permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Text shown to the user when the platform asks for location access
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionPrompt {
    pub title: String,
    pub message: String,
    pub button_neutral: String,
    pub button_negative: String,
    pub button_positive: String,
}

impl Default for PermissionPrompt {
    fn default() -> Self {
        Self {
            title: "위치 권한 요청".to_string(),
            message: "앱이 현재 위치를 사용하기 위해 위치 권한이 필요합니다.".to_string(),
            button_neutral: "나중에".to_string(),
            button_negative: "거부".to_string(),
            button_positive: "허용".to_string(),
        }
    }
}

/// Constraints on a single position request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    /// Upper bound on waiting for a fix
    pub timeout: Duration,
    /// Oldest fix still accepted
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(60),
        }
    }
}

impl From<&PositionConfig> for PositionOptions {
    fn from(config: &PositionConfig) -> Self {
        Self {
            enable_high_accuracy: config.enable_high_accuracy,
            timeout: config.timeout(),
            maximum_age: config.maximum_age(),
        }
    }
}

impl PositionOptions {
    /// Whether a fix is recent enough to be used at `now`
    #[must_use]
    pub fn is_fresh(&self, fix: &PositionFix, now: DateTime<Utc>) -> bool {
        fix.age_at(now) <= self.maximum_age
    }
}

/// Source of the device position
#[async_trait]
pub trait PositionProvider: Send + Sync {
    /// Ask for access to the position. Providers without a permission model grant.
    async fn request_permission(&self, _prompt: &PermissionPrompt) -> PermissionStatus {
        PermissionStatus::Granted
    }

    /// Acquire a single position fix
    async fn current_position(&self, options: &PositionOptions) -> Result<PositionFix>;
}

/// Fix reported by the client device alongside its request.
///
/// A device that refused location access reports nothing, which this provider
/// surfaces as a denied permission.
#[derive(Debug, Clone, Default)]
pub struct ReportedPositionProvider {
    fix: Option<PositionFix>,
}

impl ReportedPositionProvider {
    #[must_use]
    pub fn new(fix: Option<PositionFix>) -> Self {
        Self { fix }
    }

    #[must_use]
    pub fn denied() -> Self {
        Self { fix: None }
    }
}

#[async_trait]
impl PositionProvider for ReportedPositionProvider {
    async fn request_permission(&self, _prompt: &PermissionPrompt) -> PermissionStatus {
        if self.fix.is_some() {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }

    async fn current_position(&self, _options: &PositionOptions) -> Result<PositionFix> {
        self.fix.ok_or(LocatorError::PermissionDenied)
    }
}

/// Always reports the same coordinate, stamped with the current time
#[derive(Debug, Clone, Copy)]
pub struct FixedPositionProvider {
    coordinate: Coordinate,
}

impl FixedPositionProvider {
    #[must_use]
    pub fn new(coordinate: Coordinate) -> Self {
        Self { coordinate }
    }
}

#[async_trait]
impl PositionProvider for FixedPositionProvider {
    async fn current_position(&self, _options: &PositionOptions) -> Result<PositionFix> {
        Ok(PositionFix::now(self.coordinate))
    }
}

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    loc: Option<String>,
    city: Option<String>,
}

/// Approximate position from the public IP address (ipinfo.io format)
#[derive(Debug, Clone)]
pub struct IpPositionProvider {
    client: Client,
    url: String,
}

impl IpPositionProvider {
    pub fn new(config: &PositionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("seoul-air-locator/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: config.ip_lookup_url.clone(),
        })
    }
}

/// Parse the `"lat,lon"` pair of an ipinfo response
fn parse_loc(loc: &str) -> Result<Coordinate> {
    let (lat, lon) = loc
        .split_once(',')
        .ok_or_else(|| LocatorError::malformed(format!("invalid loc value '{loc}'")))?;

    let latitude = lat
        .trim()
        .parse::<f64>()
        .map_err(|_| LocatorError::malformed("invalid latitude format"))?;
    let longitude = lon
        .trim()
        .parse::<f64>()
        .map_err(|_| LocatorError::malformed("invalid longitude format"))?;

    let coordinate = Coordinate::new(latitude, longitude);
    if !coordinate.is_valid() {
        return Err(LocatorError::position_unavailable(format!(
            "coordinate out of range: {}",
            coordinate.format_coordinates()
        )));
    }
    Ok(coordinate)
}

#[async_trait]
impl PositionProvider for IpPositionProvider {
    async fn current_position(&self, options: &PositionOptions) -> Result<PositionFix> {
        debug!(
            "IP position lookup (high accuracy requested: {})",
            options.enable_high_accuracy
        );

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LocatorError::network(format!(
                "position lookup returned HTTP {status}"
            )));
        }

        let info: IpInfoResponse = response.json().await?;
        let loc = info
            .loc
            .ok_or_else(|| LocatorError::position_unavailable("lookup returned no location"))?;
        let coordinate = parse_loc(&loc)?;

        info!(
            "IP position {} ({})",
            coordinate.format_coordinates(),
            info.city.as_deref().unwrap_or("unknown city")
        );
        Ok(PositionFix::now(coordinate))
    }
}
