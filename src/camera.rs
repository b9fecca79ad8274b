//! Camera targets for the map renderer.
//!
//! Pure values: the renderer owns the actual camera and decides how to move it.

use crate::geodesy::{bearing, distance_meters};
use crate::interpolation::lerp_point;
use crate::types::GeoPoint;
use geo::{BoundingRect, Coord, Rect};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomLevel {
    /// Navigation view, ~3 km across
    Close,
    /// Overview, ~10 km
    Medium,
    /// Wide view, ~30 km
    Far,
}

impl ZoomLevel {
    pub fn zoom(self) -> f64 {
        match self {
            ZoomLevel::Close => 17.0,
            ZoomLevel::Medium => 15.0,
            ZoomLevel::Far => 13.0,
        }
    }

    pub fn altitude_m(self) -> f64 {
        match self {
            ZoomLevel::Close => 500.0,
            ZoomLevel::Medium => 1500.0,
            ZoomLevel::Far => 3000.0,
        }
    }

    pub fn pitch_degrees(self) -> f64 {
        match self {
            ZoomLevel::Close => 50.0,
            ZoomLevel::Medium => 45.0,
            ZoomLevel::Far => 30.0,
        }
    }

    /// Region span in degrees
    pub fn region_delta(self) -> f64 {
        match self {
            ZoomLevel::Close => 0.027,
            ZoomLevel::Medium => 0.09,
            ZoomLevel::Far => 0.27,
        }
    }
}

/// 3D camera placement following the driver
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub center: GeoPoint,
    pub heading: f64,
    pub pitch: f64,
    pub zoom: f64,
    pub altitude_m: f64,
}

/// Flat visible region
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub center: GeoPoint,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

/// Camera framing two points, e.g. driver and pickup
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraFrame {
    pub center: GeoPoint,
    pub zoom: f64,
    pub bearing: f64,
}

pub fn follow_camera(location: GeoPoint, heading: f64, zoom: ZoomLevel) -> CameraPose {
    CameraPose {
        center: location,
        heading,
        pitch: zoom.pitch_degrees(),
        zoom: zoom.zoom(),
        altitude_m: zoom.altitude_m(),
    }
}

pub fn region_for(location: GeoPoint, zoom: ZoomLevel) -> Region {
    Region {
        center: location,
        latitude_delta: zoom.region_delta(),
        longitude_delta: zoom.region_delta(),
    }
}

/// Midpoint framing with a zoom that steps out as the points separate
pub fn camera_for_two_points(a: GeoPoint, b: GeoPoint) -> CameraFrame {
    let distance_m = distance_meters(a, b);
    let zoom = if distance_m > 10_000.0 {
        11.0
    } else if distance_m > 5_000.0 {
        12.0
    } else if distance_m > 2_000.0 {
        13.0
    } else {
        14.0
    };

    CameraFrame {
        center: lerp_point(a, b, 0.5),
        zoom,
        bearing: bearing(a, b),
    }
}

/// Bounding box of a route grown by `padding_fraction` of its span per side
///
/// None for an empty route. A single point yields a degenerate box.
pub fn route_bounds(route: &[GeoPoint], padding_fraction: f64) -> Option<Rect<f64>> {
    let line: geo::LineString<f64> = route.iter().map(|p| Coord::from(*p)).collect();
    let rect = line.bounding_rect()?;

    let pad_x = rect.width() * padding_fraction.max(0.0);
    let pad_y = rect.height() * padding_fraction.max(0.0);
    Some(Rect::new(
        Coord {
            x: rect.min().x - pad_x,
            y: rect.min().y - pad_y,
        },
        Coord {
            x: rect.max().x + pad_x,
            y: rect.max().y + pad_y,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_follow_camera_presets() {
        let p = GeoPoint::new(12.97, 77.59);
        let pose = follow_camera(p, 45.0, ZoomLevel::Close);
        assert_eq!(pose.center, p);
        assert_eq!(pose.heading, 45.0);
        assert_eq!(pose.zoom, 17.0);
        assert_eq!(pose.pitch, 50.0);
        assert_eq!(pose.altitude_m, 500.0);

        let far = follow_camera(p, 0.0, ZoomLevel::Far);
        assert_eq!(far.zoom, 13.0);
        assert_eq!(far.pitch, 30.0);
    }

    #[test]
    fn test_region_deltas() {
        let p = GeoPoint::new(12.97, 77.59);
        assert_eq!(region_for(p, ZoomLevel::Close).latitude_delta, 0.027);
        assert_eq!(region_for(p, ZoomLevel::Medium).longitude_delta, 0.09);
        assert_eq!(region_for(p, ZoomLevel::Far).latitude_delta, 0.27);
    }

    #[test]
    fn test_two_point_zoom_steps() {
        let a = GeoPoint::new(12.0, 77.0);
        // ~1 km, ~3.3 km, ~6.7 km, ~22 km north
        assert_eq!(camera_for_two_points(a, GeoPoint::new(12.009, 77.0)).zoom, 14.0);
        assert_eq!(camera_for_two_points(a, GeoPoint::new(12.03, 77.0)).zoom, 13.0);
        assert_eq!(camera_for_two_points(a, GeoPoint::new(12.06, 77.0)).zoom, 12.0);
        assert_eq!(camera_for_two_points(a, GeoPoint::new(12.2, 77.0)).zoom, 11.0);
    }

    #[test]
    fn test_two_point_center_and_bearing() {
        let a = GeoPoint::new(12.0, 77.0);
        let b = GeoPoint::new(12.0, 77.02);
        let frame = camera_for_two_points(a, b);
        assert_abs_diff_eq!(frame.center.longitude, 77.01, epsilon = 1e-12);
        assert_abs_diff_eq!(frame.bearing, 90.0, epsilon = 0.01);
    }

    #[test]
    fn test_route_bounds_with_padding() {
        let route = [
            GeoPoint::new(12.0, 77.0),
            GeoPoint::new(12.1, 77.2),
            GeoPoint::new(12.05, 76.9),
        ];
        let rect = route_bounds(&route, 0.1).expect("non-empty");
        // lon span 0.3, lat span 0.1
        assert_abs_diff_eq!(rect.min().x, 76.87, epsilon = 1e-9);
        assert_abs_diff_eq!(rect.max().x, 77.23, epsilon = 1e-9);
        assert_abs_diff_eq!(rect.min().y, 11.99, epsilon = 1e-9);
        assert_abs_diff_eq!(rect.max().y, 12.11, epsilon = 1e-9);
    }

    #[test]
    fn test_route_bounds_empty_and_single() {
        assert!(route_bounds(&[], 0.2).is_none());
        let p = GeoPoint::new(12.0, 77.0);
        let rect = route_bounds(&[p], 0.2).expect("single point");
        assert_eq!(rect.min(), rect.max());
    }
}
