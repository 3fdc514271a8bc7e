//! Error types for EO-Floods

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FloodError {
    // Registry errors
    #[error("Dataset '{name}' not recognized. Supported datasets are: {supported}")]
    DatasetNotRecognized { name: String, supported: String },

    #[error("Given provider '{name}' not supported, choose from: {supported}")]
    ProviderNotRecognized { name: String, supported: String },

    // Area of interest errors
    #[error("X values are not within the longitudinal range")]
    LongitudeOutOfRange { xmin: f64, xmax: f64 },

    #[error("Y values are not within the latitudinal range")]
    LatitudeOutOfRange { ymin: f64, ymax: f64 },

    #[error("Invalid bounding box: {reason}")]
    InvalidBoundingBox { reason: String },

    // Date errors
    #[error("Invalid date string format: '{input}'")]
    InvalidDate { input: String },

    #[error("Start date '{start}' must occur before end date '{end}'")]
    DateOrder { start: String, end: String },

    #[error("Date '{date}' is outside of the date range {start}/{end}")]
    DateOutOfRange { date: String, start: String, end: String },

    // Selection errors
    #[error("No data found for given date(s): {dates}")]
    NoDataFound { dates: String },

    #[error("Invalid selection: {reason}")]
    InvalidSelection { reason: String },

    // Credential and remote errors
    #[error("Missing credentials: {reason}")]
    MissingCredentials { reason: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("HTTP {status} from {url}: {body}")]
    Http { status: u16, url: String, body: String },

    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("Imagery platform error during {operation}: {reason}")]
    Platform { operation: String, reason: String },

    // Rendering errors
    #[error(
        "Plotting flood extents has timed out after {}s, increase the time out threshold \
         or plot a smaller selection of your data",
        timeout.as_secs_f64()
    )]
    PlotTimeout { timeout: Duration },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    #[error("Credential file error at {path}: {reason}")]
    CredentialFile { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl FloodError {
    /// Shorthand for errors reported by an imagery platform adapter
    pub fn platform(operation: impl Into<String>, reason: impl ToString) -> Self {
        FloodError::Platform { operation: operation.into(), reason: reason.to_string() }
    }

    /// Whether this error came from a remote service rather than local validation
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            FloodError::Http { .. }
                | FloodError::Transport { .. }
                | FloodError::Platform { .. }
                | FloodError::AuthenticationFailed { .. }
        )
    }
}

impl From<serde_json::Error> for FloodError {
    fn from(e: serde_json::Error) -> Self {
        FloodError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FloodError>;
