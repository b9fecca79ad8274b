use crate::error::{Result, TrackerError};
use crate::geodesy::normalize_bearing;
use geo::{Coord, Point};
use serde::{Deserialize, Serialize};

/// WGS-84 position in degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        GeoPoint {
            latitude,
            longitude,
        }
    }

    /// Finite and inside the lat/lon ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

// geo uses x = longitude, y = latitude
impl From<Coord<f64>> for GeoPoint {
    fn from(c: Coord<f64>) -> Self {
        GeoPoint::new(c.y, c.x)
    }
}

impl From<GeoPoint> for Coord<f64> {
    fn from(p: GeoPoint) -> Self {
        Coord {
            x: p.longitude,
            y: p.latitude,
        }
    }
}

impl From<Point<f64>> for GeoPoint {
    fn from(p: Point<f64>) -> Self {
        GeoPoint::from(p.0)
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(p: GeoPoint) -> Self {
        Point(p.into())
    }
}

/// Raw location sample from the device
///
/// Timestamps are carried through untouched; fixes may arrive out of order
/// and nothing here assumes otherwise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub timestamp: f64,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>, // m/s
}

impl Fix {
    pub fn new(timestamp: f64, latitude: f64, longitude: f64, speed: Option<f64>) -> Self {
        Fix {
            timestamp,
            latitude,
            longitude,
            speed,
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Speed sample usable for duration derivation (finite and positive)
    pub fn usable_speed(&self) -> Option<f64> {
        self.speed.filter(|s| s.is_finite() && *s > 0.0)
    }

    pub fn validate(&self) -> Result<()> {
        if self.point().is_valid() {
            Ok(())
        } else {
            Err(TrackerError::InvalidFix {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

/// Rendered marker: position plus heading in [0, 360)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub position: GeoPoint,
    pub bearing_degrees: f64,
}

impl AgentState {
    pub fn new(position: GeoPoint, bearing_degrees: f64) -> Self {
        AgentState {
            position,
            bearing_degrees: normalize_bearing(bearing_degrees),
        }
    }
}
