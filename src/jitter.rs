use crate::geodesy::distance_meters;
use crate::types::GeoPoint;

/// Default minimum movement treated as real (m)
pub const DEFAULT_JITTER_THRESHOLD_M: f64 = 5.0;

/// True when `next` moved at least `threshold_m` away from `prev`
///
/// NaN distances compare false, so malformed points never pass.
pub fn is_significant(prev: GeoPoint, next: GeoPoint, threshold_m: f64) -> bool {
    distance_meters(prev, next) >= threshold_m
}

/// GPS noise gate with a tunable threshold
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JitterFilter {
    threshold_m: f64,
}

impl Default for JitterFilter {
    fn default() -> Self {
        JitterFilter::new(DEFAULT_JITTER_THRESHOLD_M)
    }
}

impl JitterFilter {
    pub fn new(threshold_m: f64) -> Self {
        JitterFilter { threshold_m }
    }

    pub fn threshold_m(&self) -> f64 {
        self.threshold_m
    }

    pub fn is_significant(&self, prev: GeoPoint, next: GeoPoint) -> bool {
        is_significant(prev, next, self.threshold_m)
    }
}
