//! Model Layer Error Types

use thiserror::Error;

/// Result type for geo-model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Model layer errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    /// Country code is not a known ISO 3166-1 alpha-2 code
    #[error("Invalid country code: {0}")]
    InvalidCountry(String),

    /// Nominal voltage outside the accepted range
    #[error("Invalid voltage: {0}")]
    InvalidVoltage(i64),

    /// Coordinate is not a finite number
    #[error("Invalid coordinate: lat={lat}, lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// Record failed validation
    #[error("Invalid record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },
}

impl ModelError {
    /// Create an invalid record error
    pub fn invalid_record(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
