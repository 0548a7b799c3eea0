//! Validated geographic primitives shared by every localmart crate.

use serde::Serialize;
use thiserror::Error;

/// 50 miles expressed in meters.
pub const SEARCH_RADIUS_METERS: f64 = 80_467.2;

/// Errors raised when constructing geographic values from untrusted input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("latitude {0} is outside [-90, 90] or not finite")]
    InvalidLatitude(f64),

    #[error("longitude {0} is outside [-180, 180] or not finite")]
    InvalidLongitude(f64),

    #[error("search radius {0} m must be positive and finite")]
    InvalidRadius(f64),
}

/// A WGS84 position. Both components are finite and in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Continental US center, used whenever live geolocation is unavailable.
    pub const FALLBACK: Coordinate = Coordinate {
        latitude: 39.828_3,
        longitude: -98.579_5,
    };

    /// # Errors
    ///
    /// Returns [`GeoError::InvalidLatitude`] or [`GeoError::InvalidLongitude`]
    /// when a component is non-finite or out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::InvalidLatitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::InvalidLongitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Builds a coordinate from a GeoJSON position, which is `[lng, lat]`.
    ///
    /// # Errors
    ///
    /// Same as [`Coordinate::new`].
    pub fn from_geojson(position: [f64; 2]) -> Result<Self, GeoError> {
        let [lng, lat] = position;
        Self::new(lat, lng)
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// Search radius in meters. Never zero, negative, or non-finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SearchRadius(f64);

impl SearchRadius {
    pub const FIFTY_MILES: SearchRadius = SearchRadius(SEARCH_RADIUS_METERS);

    /// # Errors
    ///
    /// Returns [`GeoError::InvalidRadius`] for zero, negative, or non-finite input.
    pub fn new(meters: f64) -> Result<Self, GeoError> {
        if meters.is_finite() && meters > 0.0 {
            Ok(Self(meters))
        } else {
            Err(GeoError::InvalidRadius(meters))
        }
    }

    #[must_use]
    pub fn meters(self) -> f64 {
        self.0
    }
}

impl Default for SearchRadius {
    fn default() -> Self {
        Self::FIFTY_MILES
    }
}
