use crate::geodesy::path_length_meters;
use crate::types::GeoPoint;
use geo::LineString;
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::sync::Arc;

/// Ordered trip polyline, start -> destination
///
/// Immutable once built. Clones share the same points, so several readers
/// can hold one route for the whole trip without copying.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<GeoPoint>", into = "Vec<GeoPoint>")]
pub struct Route {
    points: Arc<[GeoPoint]>,
}

impl Route {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Route {
            points: points.into(),
        }
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Total haversine length (m)
    pub fn length_m(&self) -> f64 {
        path_length_meters(&self.points)
    }

    /// Drop vertices that fail [`GeoPoint::is_valid`]
    pub fn sanitized(points: Vec<GeoPoint>) -> Self {
        let total = points.len();
        let kept: Vec<GeoPoint> = points.into_iter().filter(GeoPoint::is_valid).collect();
        if kept.len() != total {
            log::warn!("Dropped {} invalid route vertices", total - kept.len());
        }
        Route::new(kept)
    }

    pub fn to_line_string(&self) -> LineString<f64> {
        LineString::from_iter(self.points.iter().map(|p| geo::Coord::from(*p)))
    }
}

impl Default for Route {
    fn default() -> Self {
        Route::new(Vec::new())
    }
}

impl Deref for Route {
    type Target = [GeoPoint];

    fn deref(&self) -> &[GeoPoint] {
        &self.points
    }
}

impl From<Vec<GeoPoint>> for Route {
    fn from(points: Vec<GeoPoint>) -> Self {
        Route::new(points)
    }
}

impl From<Route> for Vec<GeoPoint> {
    fn from(route: Route) -> Self {
        route.points.to_vec()
    }
}

impl From<LineString<f64>> for Route {
    fn from(line: LineString<f64>) -> Self {
        Route::new(line.into_inner().into_iter().map(GeoPoint::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> Route {
        Route::new(vec![
            GeoPoint::new(12.0, 77.0),
            GeoPoint::new(12.009, 77.0),
            GeoPoint::new(12.009, 77.009),
        ])
    }

    #[test]
    fn test_clone_shares_points() {
        let route = sample();
        let other = route.clone();
        assert!(std::ptr::eq(route.points().as_ptr(), other.points().as_ptr()));
        assert_eq!(route.len(), 3);
    }

    #[test]
    fn test_length() {
        let route = sample();
        // ~1000 m north then ~980 m east
        assert!((route.length_m() - 1980.0).abs() < 40.0, "got {}", route.length_m());
        assert_eq!(Route::default().length_m(), 0.0);
    }

    #[test]
    fn test_line_string_round_trip() {
        let route = sample();
        let line = route.to_line_string();
        assert_eq!(line.0.len(), 3);
        assert_relative_eq!(line.0[1].y, 12.009);
        assert_eq!(Route::from(line), route);
    }

    #[test]
    fn test_sanitized_drops_invalid() {
        let route = Route::sanitized(vec![
            GeoPoint::new(12.0, 77.0),
            GeoPoint::new(f64::NAN, 77.0),
            GeoPoint::new(12.1, 200.0),
            GeoPoint::new(12.2, 77.0),
        ]);
        assert_eq!(route.len(), 2);
    }

    #[test]
    fn test_serde_as_plain_array() {
        let route: Route = serde_json::from_str(
            r#"[{"latitude": 12.0, "longitude": 77.0}, {"latitude": 12.1, "longitude": 77.1}]"#,
        )
        .expect("valid route");
        assert_eq!(route.len(), 2);
        let json = serde_json::to_string(&route).expect("serialize");
        assert!(json.starts_with('['));
    }
}
