//! Geographic coordinates

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Finite coordinates within latitude ±90 and longitude ±180
    pub fn new(lat: f64, lng: f64) -> Result<Self, DomainError> {
        if !lat.is_finite() || !lng.is_finite() || lat.abs() > 90.0 || lng.abs() > 180.0 {
            return Err(DomainError::ValidationError(format!(
                "invalid coordinates ({lat}, {lng})"
            )));
        }
        Ok(Self { lat, lng })
    }

    /// Planar distance in degrees.
    ///
    /// Only meaningful for ordering nearby points; it is not a great-circle distance.
    pub fn planar_distance(&self, other: &GeoPoint) -> f64 {
        (self.lat - other.lat).hypot(self.lng - other.lng)
    }
}
