//! Geographic position primitive

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::{ModelError, Result};

/// Immutable geographic point (degrees)
///
/// Equality is exact-value. Proximity is expressed through [`Position::distance`],
/// never through equality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build a position, rejecting NaN and infinite components
    pub fn try_new(lat: f64, lon: f64) -> Result<Self> {
        if lat.is_finite() && lon.is_finite() {
            Ok(Self { lat, lon })
        } else {
            Err(ModelError::InvalidCoordinate { lat, lon })
        }
    }

    /// Planar Euclidean distance on (lat, lon)
    ///
    /// Lines span short distances, so this preserves the relative ordering a
    /// great-circle metric would give.
    pub fn distance(&self, other: &Position) -> f64 {
        (self.lat - other.lat).hypot(self.lon - other.lon)
    }

    /// Lexicographic total order on (lat, lon), used for tie-breaking
    pub fn lexicographic_cmp(&self, other: &Position) -> Ordering {
        self.lat
            .total_cmp(&other.lat)
            .then_with(|| self.lon.total_cmp(&other.lon))
    }
}

impl From<(f64, f64)> for Position {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self::new(lat, lon)
    }
}
