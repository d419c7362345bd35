//! Geographic points and store locations.
//!
//! Coordinates follow `GeoJSON` order: `[longitude, latitude]`.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Errors that can occur when building a [`GeoPoint`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    /// A coordinate was not supplied.
    #[error("missing {0}")]
    Missing(&'static str),
    /// A coordinate did not parse as a finite number.
    #[error("{axis} is not a finite number: {value:?}")]
    NotANumber {
        /// `"longitude"` or `"latitude"`.
        axis: &'static str,
        /// The raw input.
        value: String,
    },
    /// A coordinate is outside its valid range.
    #[error("{axis} {value} is out of range")]
    OutOfRange {
        /// `"longitude"` or `"latitude"`.
        axis: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// A point on the Earth's surface.
///
/// Serialises as a `[longitude, latitude]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f64; 2]", try_from = "[f64; 2]")]
pub struct GeoPoint {
    lng: f64,
    lat: f64,
}

impl GeoPoint {
    /// Build a point, checking that both coordinates are finite and in range.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::NotANumber`] for NaN/infinite input and
    /// [`GeoError::OutOfRange`] when `|lng| > 180` or `|lat| > 90`.
    pub fn new(lng: f64, lat: f64) -> Result<Self, GeoError> {
        let lng = check_axis("longitude", lng, 180.0)?;
        let lat = check_axis("latitude", lat, 90.0)?;
        Ok(Self { lng, lat })
    }

    /// Build a point from raw, possibly absent query-string values.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Missing`] if either value is absent or blank, and
    /// the errors of [`Self::new`] otherwise.
    pub fn from_query(lng: Option<&str>, lat: Option<&str>) -> Result<Self, GeoError> {
        let lng = parse_axis("longitude", lng)?;
        let lat = parse_axis("latitude", lat)?;
        Self::new(lng, lat)
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.lng
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Great-circle distance to `other` in meters (haversine formula).
    #[must_use]
    pub fn distance_meters(&self, other: &Self) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

        let c = 2.0 * a.sqrt().asin();
        EARTH_RADIUS_METERS * c
    }

    /// Smallest latitude/longitude box containing every point within
    /// `radius_meters` of `self`.
    ///
    /// When the circle reaches a pole or crosses the antimeridian the
    /// longitude range widens to the full `[-180, 180]`.
    #[must_use]
    pub fn bounding_box(&self, radius_meters: f64) -> BoundingBox {
        let angular = (radius_meters.max(0.0) / EARTH_RADIUS_METERS).to_degrees();
        let min_lat = self.lat - angular;
        let max_lat = self.lat + angular;

        if min_lat <= -90.0 || max_lat >= 90.0 {
            return BoundingBox {
                min_lat: min_lat.max(-90.0),
                max_lat: max_lat.min(90.0),
                min_lng: -180.0,
                max_lng: 180.0,
            };
        }

        let d_lng = (angular.to_radians().sin() / self.lat.to_radians().cos())
            .min(1.0)
            .asin()
            .to_degrees();
        let (min_lng, max_lng) = (self.lng - d_lng, self.lng + d_lng);
        if min_lng < -180.0 || max_lng > 180.0 {
            return BoundingBox {
                min_lat,
                max_lat,
                min_lng: -180.0,
                max_lng: 180.0,
            };
        }

        BoundingBox {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }
}

/// An axis-aligned latitude/longitude range, in degrees. Bounds are
/// inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    #[must_use]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lng..=self.max_lng).contains(&point.lng)
    }
}

fn parse_axis(axis: &'static str, raw: Option<&str>) -> Result<f64, GeoError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let raw = raw.ok_or(GeoError::Missing(axis))?;
    raw.parse::<f64>().map_err(|_| GeoError::NotANumber {
        axis,
        value: raw.to_owned(),
    })
}

fn check_axis(axis: &'static str, value: f64, limit: f64) -> Result<f64, GeoError> {
    if !value.is_finite() {
        return Err(GeoError::NotANumber {
            axis,
            value: value.to_string(),
        });
    }
    if value.abs() > limit {
        return Err(GeoError::OutOfRange { axis, value });
    }
    Ok(value)
}

impl From<GeoPoint> for [f64; 2] {
    fn from(p: GeoPoint) -> Self {
        [p.lng, p.lat]
    }
}

impl TryFrom<[f64; 2]> for GeoPoint {
    type Error = GeoError;

    fn try_from([lng, lat]: [f64; 2]) -> Result<Self, Self::Error> {
        Self::new(lng, lat)
    }
}

/// A store's geographic location and street address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// `[longitude, latitude]`.
    pub coordinates: GeoPoint,
    /// Human-readable street address.
    pub address: String,
}
