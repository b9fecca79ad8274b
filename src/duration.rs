//! Animation duration derived from physical speed.
//!
//! duration = distance / speed, clamped to [min, max]. Long hops cap out
//! instead of crawling and tiny moves still get a visible transition.

pub const DEFAULT_MIN_DURATION_MS: u64 = 300;
pub const DEFAULT_MAX_DURATION_MS: u64 = 2000;
/// 30 km/h, used when no speed sample is available
pub const DEFAULT_SPEED_MPS: f64 = 8.33;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DurationModel {
    pub min_ms: u64,
    pub max_ms: u64,
    pub default_speed_mps: f64,
}

impl Default for DurationModel {
    fn default() -> Self {
        DurationModel {
            min_ms: DEFAULT_MIN_DURATION_MS,
            max_ms: DEFAULT_MAX_DURATION_MS,
            default_speed_mps: DEFAULT_SPEED_MPS,
        }
    }
}

impl DurationModel {
    /// Duration in milliseconds for covering `distance_m`
    ///
    /// `speed_mps` is used only when finite and positive.
    pub fn duration_ms(&self, distance_m: f64, speed_mps: Option<f64>) -> u64 {
        let speed = speed_mps
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(self.default_speed_mps);

        let raw_ms = distance_m / speed * 1000.0;
        if raw_ms.is_nan() {
            return self.min_ms;
        }

        raw_ms
            .round()
            .max(self.min_ms as f64)
            .min(self.max_ms as f64) as u64
    }
}

/// [`DurationModel::duration_ms`] with the default bounds and cruising speed
pub fn animation_duration_ms(distance_m: f64, speed_mps: Option<f64>) -> u64 {
    DurationModel::default().duration_ms(distance_m, speed_mps)
}
