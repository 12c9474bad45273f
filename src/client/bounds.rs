//! Bounding-box derivation
//!
//! Converts a center point and a radius into the latitude/longitude
//! rectangle that circumscribes the geodesic circle of that radius.

use serde::{Deserialize, Serialize};

use crate::service::SearchRequest;

/// Sphere radius used for the circle, in meters (WGS84 equatorial).
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Fallback center when the user gives none (Tucson, AZ).
pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: 32.253,
    lng: -110.912,
};

/// Fallback search distance, in user-facing units.
pub const DEFAULT_DISTANCE: f64 = 10.0;

/// Conversion factor for miles, as used by the search form.
pub const METERS_PER_MILE: f64 = 1609.0;

/// A point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Resolve a center from raw form input.
    ///
    /// Each axis falls back to `fallback` independently when it is unset,
    /// unparseable, zero, or off the globe.
    pub fn resolve(lat: Option<&str>, lng: Option<&str>, fallback: LatLng) -> Self {
        Self {
            lat: parse_coordinate(lat, 90.0).unwrap_or(fallback.lat),
            lng: parse_coordinate(lng, 180.0).unwrap_or(fallback.lng),
        }
    }
}

fn parse_coordinate(raw: Option<&str>, limit: f64) -> Option<f64> {
    raw.and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value != 0.0 && value.abs() <= limit)
}

/// Radius in meters from a user-entered distance.
///
/// A missing, unparseable or non-positive distance uses `default_distance`.
pub fn radius_meters(distance: Option<&str>, default_distance: f64, meters_per_unit: f64) -> f64 {
    let units = distance
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value > 0.0)
        .unwrap_or(default_distance);

    units * meters_per_unit
}

/// Axis-aligned rectangle in latitude/longitude space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Rectangle enclosing the circle of `radius_m` meters around `center`.
    ///
    /// The latitude half-span is the circle's angular radius. The longitude
    /// half-span is taken at the circle's tangent meridians,
    /// `asin(sin d / cos lat)`, which is wider than the angular radius away
    /// from the equator. A circle that reaches a pole spans every longitude.
    /// Results are clamped to the globe; no antimeridian wrap is produced.
    pub fn around(center: LatLng, radius_m: f64) -> Self {
        let angular = (radius_m.max(0.0) / EARTH_RADIUS_M).min(std::f64::consts::PI);
        let lat_span = angular.to_degrees();

        let min_lat = (center.lat - lat_span).max(-90.0);
        let max_lat = (center.lat + lat_span).min(90.0);

        let ratio = angular.sin() / center.lat.to_radians().cos();
        let reaches_pole = min_lat <= -90.0 || max_lat >= 90.0;

        let (min_lng, max_lng) = if reaches_pole || !ratio.is_finite() || ratio >= 1.0 {
            (-180.0, 180.0)
        } else {
            let lng_span = ratio.asin().to_degrees();
            (
                (center.lng - lng_span).max(-180.0),
                (center.lng + lng_span).min(180.0),
            )
        };

        Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }

    /// South-west corner.
    pub fn south_west(&self) -> LatLng {
        LatLng {
            lat: self.min_lat,
            lng: self.min_lng,
        }
    }

    /// North-east corner.
    pub fn north_east(&self) -> LatLng {
        LatLng {
            lat: self.max_lat,
            lng: self.max_lng,
        }
    }

    pub fn contains(&self, point: LatLng) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lng..=self.max_lng).contains(&point.lng)
    }

    /// Wire request for this box with optional filters ("" = unset).
    pub fn to_request(&self, cache_type: &str, difficulty: &str) -> SearchRequest {
        SearchRequest {
            min_lat: self.min_lat,
            max_lat: self.max_lat,
            min_lng: self.min_lng,
            max_lng: self.max_lng,
            cache_type: cache_type.trim().to_string(),
            difficulty: difficulty.trim().to_string(),
        }
    }
}
