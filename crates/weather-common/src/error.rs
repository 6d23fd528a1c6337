//! Error types shared by station-weather crates.

use thiserror::Error;

/// Result type alias using WeatherError.
pub type WeatherResult<T> = Result<T, WeatherError>;

/// Errors that are not tied to a specific upstream protocol.
#[derive(Debug, Error)]
pub enum WeatherError {
    // === Lookup Errors ===
    #[error("Unknown station: {0}")]
    UnknownStation(String),

    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Configuration Errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // === Storage Errors ===
    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl WeatherError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            WeatherError::InvalidParameter { .. } => 400,
            WeatherError::UnknownStation(_) | WeatherError::UnknownRegion(_) => 404,
            WeatherError::CacheError(_) => 503,
            _ => 500,
        }
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        WeatherError::Serialization(format!("JSON error: {}", err))
    }
}
