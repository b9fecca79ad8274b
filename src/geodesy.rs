//! Spherical bearing and distance between geographic points.
//!
//! NaN inputs propagate as NaN; callers gate fixes with
//! [`GeoPoint::is_valid`](crate::types::GeoPoint::is_valid) first.

use crate::types::GeoPoint;

/// Mean Earth radius used by every distance in the crate (m)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Wrap any angle in degrees into [0, 360)
pub fn normalize_bearing(degrees: f64) -> f64 {
    ((degrees % 360.0) + 360.0) % 360.0
}

/// Initial compass bearing from `a` to `b`, degrees in [0, 360)
///
/// 0 = north, increasing clockwise.
pub fn bearing(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

    normalize_bearing(y.atan2(x).to_degrees())
}

/// Haversine great-circle distance in meters
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).max(0.0).sqrt());
    EARTH_RADIUS_M * c
}

/// Sum of haversine lengths along a polyline
pub fn path_length_meters(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| distance_meters(pair[0], pair[1]))
        .sum()
}
