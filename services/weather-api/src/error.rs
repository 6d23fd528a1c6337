//! Collection-level errors.

use thiserror::Error;

/// What the collector reports when it has no fresh reading.
///
/// Carries a human-readable message only; protocol detail stays in logs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CollectError {
    #[error("Unknown station: {0}")]
    UnknownStation(String),

    #[error("Station {station} unavailable: {message}")]
    Upstream { station: String, message: String },

    #[error("Station {station} returned no usable wind data")]
    Invalid { station: String },
}

impl CollectError {
    pub fn http_status_code(&self) -> u16 {
        match self {
            CollectError::UnknownStation(_) => 404,
            CollectError::Upstream { .. } | CollectError::Invalid { .. } => 503,
        }
    }

    /// Metrics label.
    pub fn outcome(&self) -> &'static str {
        match self {
            CollectError::UnknownStation(_) => "unknown",
            CollectError::Upstream { .. } => "error",
            CollectError::Invalid { .. } => "invalid",
        }
    }
}
