//! Error types for the location and air-quality pipeline

use thiserror::Error;

/// Coarse classification of a [`LocatorError`].
///
/// The resolver picks its fallback from the kind alone and never needs the
/// underlying cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    PermissionDenied,
    AcquisitionTimeout,
    PositionUnavailable,
    CredentialMissing,
    NetworkFailure,
    MalformedResponse,
    UpstreamErrorCode,
    NoDataFound,
    Config,
    Io,
}

impl ErrorKind {
    /// Stable identifier used in log fields
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::AcquisitionTimeout => "acquisition_timeout",
            ErrorKind::PositionUnavailable => "position_unavailable",
            ErrorKind::CredentialMissing => "credential_missing",
            ErrorKind::NetworkFailure => "network_failure",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::UpstreamErrorCode => "upstream_error_code",
            ErrorKind::NoDataFound => "no_data_found",
            ErrorKind::Config => "config",
            ErrorKind::Io => "io",
        }
    }
}

/// Main error type for the locator
#[derive(Error, Debug)]
pub enum LocatorError {
    /// The platform refused access to the device position
    #[error("Location permission denied")]
    PermissionDenied,

    /// No position fix arrived within the acquisition bound
    #[error("Position acquisition timed out after {seconds}s")]
    AcquisitionTimeout { seconds: u64 },

    /// The position source failed or produced an unusable fix
    #[error("Position unavailable: {message}")]
    PositionUnavailable { message: String },

    /// A service credential is absent or still the placeholder value
    #[error("Credential missing for {service}")]
    CredentialMissing { service: &'static str },

    /// Transport failure, timeout or non-success HTTP status
    #[error("Network failure: {message}")]
    NetworkFailure { message: String },

    /// The upstream body could not be read as the expected shape
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// The upstream payload carried a non-success status code
    #[error("Upstream error code {code}: {message}")]
    UpstreamErrorCode { code: String, message: String },

    /// The upstream answered successfully but had nothing usable
    #[error("No data found: {message}")]
    NoDataFound { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl LocatorError {
    /// Create a new position-unavailable error
    pub fn position_unavailable<S: Into<String>>(message: S) -> Self {
        Self::PositionUnavailable {
            message: message.into(),
        }
    }

    /// Create a new network failure
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::NetworkFailure {
            message: message.into(),
        }
    }

    /// Create a new malformed-response error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a new upstream error-code error
    pub fn upstream<C: Into<String>, M: Into<String>>(code: C, message: M) -> Self {
        Self::UpstreamErrorCode {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a new no-data error
    pub fn no_data<S: Into<String>>(message: S) -> Self {
        Self::NoDataFound {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            LocatorError::PermissionDenied => ErrorKind::PermissionDenied,
            LocatorError::AcquisitionTimeout { .. } => ErrorKind::AcquisitionTimeout,
            LocatorError::PositionUnavailable { .. } => ErrorKind::PositionUnavailable,
            LocatorError::CredentialMissing { .. } => ErrorKind::CredentialMissing,
            LocatorError::NetworkFailure { .. } => ErrorKind::NetworkFailure,
            LocatorError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            LocatorError::UpstreamErrorCode { .. } => ErrorKind::UpstreamErrorCode,
            LocatorError::NoDataFound { .. } => ErrorKind::NoDataFound,
            LocatorError::Config { .. } => ErrorKind::Config,
            LocatorError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            LocatorError::PermissionDenied => {
                "Location permission was denied. Showing the default location.".to_string()
            }
            LocatorError::AcquisitionTimeout { .. } | LocatorError::PositionUnavailable { .. } => {
                "Unable to determine your position. Showing the default location.".to_string()
            }
            LocatorError::CredentialMissing { service } => {
                format!("No API key configured for {service}. Please check your config file.")
            }
            LocatorError::NetworkFailure { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            LocatorError::MalformedResponse { .. } | LocatorError::NoDataFound { .. } => {
                "The data service returned no usable data.".to_string()
            }
            LocatorError::UpstreamErrorCode { code, .. } => {
                format!("The data service reported error {code}.")
            }
            LocatorError::Config { message } => format!("Configuration error: {message}"),
            LocatorError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for LocatorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LocatorError::malformed(err.to_string())
        } else {
            LocatorError::network(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, LocatorError>;
