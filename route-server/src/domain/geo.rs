//! Coordinates and the two distance metrics used by the server.
//!
//! Planning (sequencing and ETAs) measures straight-line distance in raw
//! degrees. Arrival detection compares against a radius in meters, so it
//! uses great-circle distance. The two are intentionally kept apart: the
//! planning metric drives scoring and tie-breaking, and changing it would
//! change the itineraries produced.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components are finite and within their ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Query-string form used by directions providers ("lat,lng").
    pub fn to_query(&self) -> String {
        format!("{:.6},{:.6}", self.lat, self.lng)
    }
}

/// Straight-line distance on raw latitude/longitude degrees.
///
/// # Examples
///
/// ```
/// use route_server::domain::{Coordinate, euclidean_degrees};
///
/// let d = euclidean_degrees(Coordinate::new(0.0, 0.0), Coordinate::new(3.0, 4.0));
/// assert_eq!(d, 5.0);
/// ```
pub fn euclidean_degrees(a: Coordinate, b: Coordinate) -> f64 {
    let dlat = a.lat - b.lat;
    let dlng = a.lng - b.lng;
    (dlat * dlat + dlng * dlng).sqrt()
}

/// Great-circle distance in meters (haversine formula).
pub fn haversine_meters(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Offset a coordinate by a number of meters north of it.
///
/// Handy for building positions at known distances from a stop.
pub fn offset_north(origin: Coordinate, meters: f64) -> Coordinate {
    let delta_lat = (meters / EARTH_RADIUS_M).to_degrees();
    Coordinate::new(origin.lat + delta_lat, origin.lng)
}
