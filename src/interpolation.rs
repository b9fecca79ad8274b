use crate::geodesy::normalize_bearing;
use crate::types::GeoPoint;

/// Component-wise linear interpolation between two points
///
/// Planar in degrees. Good enough over the few kilometers a single
/// marker hop covers; not a geodesic.
pub fn lerp_point(a: GeoPoint, b: GeoPoint, t: f64) -> GeoPoint {
    GeoPoint {
        latitude: a.latitude + (b.latitude - a.latitude) * t,
        longitude: a.longitude + (b.longitude - a.longitude) * t,
    }
}

/// Signed shortest rotation from `a` to `b`, degrees in [-180, 180)
pub fn shortest_rotation(a: f64, b: f64) -> f64 {
    let a = normalize_bearing(a);
    let b = normalize_bearing(b);
    ((b - a + 540.0) % 360.0) - 180.0
}

/// Interpolate a heading along the shortest arc, result in [0, 360)
///
/// Crossing north (350 -> 10) rotates 20 degrees clockwise instead of
/// spinning 340 degrees the other way.
pub fn lerp_bearing(a: f64, b: f64, t: f64) -> f64 {
    let start = normalize_bearing(a);
    normalize_bearing(start + shortest_rotation(start, b) * t)
}

/// Densify a straight segment into `steps + 1` evenly spaced points
///
/// Both endpoints are included; `steps` is raised to at least 1.
pub fn interpolate_segment(a: GeoPoint, b: GeoPoint, steps: usize) -> Vec<GeoPoint> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| lerp_point(a, b, i as f64 / steps as f64))
        .collect()
}
