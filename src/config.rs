use crate::animation::Easing;
use crate::duration::{DurationModel, DEFAULT_MAX_DURATION_MS, DEFAULT_MIN_DURATION_MS, DEFAULT_SPEED_MPS};
use crate::error::{Result, TrackerError};
use crate::jitter::{JitterFilter, DEFAULT_JITTER_THRESHOLD_M};
use crate::route::DEFAULT_LOOK_AHEAD;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tunable constants for the live map engine
///
/// Missing JSON fields fall back to the defaults below.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum movement before a fix animates or re-splits the route (m)
    pub jitter_threshold_m: f64,
    /// Route vertices to bias the split point forward
    pub look_ahead: usize,
    pub min_duration_ms: u64,
    pub max_duration_ms: u64,
    /// Assumed speed when a fix carries none (m/s)
    pub default_speed_mps: f64,
    pub position_easing: Easing,
    pub heading_easing: Easing,
    /// 0 disables
    pub marker_throttle_ms: u64,
    /// 0 disables
    pub progress_throttle_ms: u64,
    pub settle_debounce_ms: u64,
}

/// Per-field overrides; `None` keeps the loaded value
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigOverrides {
    pub jitter_threshold_m: Option<f64>,
    pub look_ahead: Option<usize>,
    pub min_duration_ms: Option<u64>,
    pub max_duration_ms: Option<u64>,
    pub marker_throttle_ms: Option<u64>,
    pub progress_throttle_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            jitter_threshold_m: DEFAULT_JITTER_THRESHOLD_M,
            look_ahead: DEFAULT_LOOK_AHEAD,
            min_duration_ms: DEFAULT_MIN_DURATION_MS,
            max_duration_ms: DEFAULT_MAX_DURATION_MS,
            default_speed_mps: DEFAULT_SPEED_MPS,
            position_easing: Easing::EaseOutCubic,
            heading_easing: Easing::EaseInOutCubic,
            marker_throttle_ms: 0,
            progress_throttle_ms: 0,
            settle_debounce_ms: 300,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.jitter_threshold_m.is_finite() || self.jitter_threshold_m < 0.0 {
            return Err(TrackerError::InvalidConfig(format!(
                "jitter_threshold_m must be finite and >= 0, got {}",
                self.jitter_threshold_m
            )));
        }
        if self.min_duration_ms == 0 {
            return Err(TrackerError::InvalidConfig(
                "min_duration_ms must be > 0".to_string(),
            ));
        }
        if self.min_duration_ms > self.max_duration_ms {
            return Err(TrackerError::InvalidConfig(format!(
                "min_duration_ms ({}) exceeds max_duration_ms ({})",
                self.min_duration_ms, self.max_duration_ms
            )));
        }
        if !self.default_speed_mps.is_finite() || self.default_speed_mps <= 0.0 {
            return Err(TrackerError::InvalidConfig(format!(
                "default_speed_mps must be finite and > 0, got {}",
                self.default_speed_mps
            )));
        }
        Ok(())
    }

    /// Load and validate a JSON config file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of a loaded config, then re-validate
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Result<Self> {
        if let Some(v) = overrides.jitter_threshold_m {
            self.jitter_threshold_m = v;
        }
        if let Some(v) = overrides.look_ahead {
            self.look_ahead = v;
        }
        if let Some(v) = overrides.min_duration_ms {
            self.min_duration_ms = v;
        }
        if let Some(v) = overrides.max_duration_ms {
            self.max_duration_ms = v;
        }
        if let Some(v) = overrides.marker_throttle_ms {
            self.marker_throttle_ms = v;
        }
        if let Some(v) = overrides.progress_throttle_ms {
            self.progress_throttle_ms = v;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn jitter_filter(&self) -> JitterFilter {
        JitterFilter::new(self.jitter_threshold_m)
    }

    pub fn duration_model(&self) -> DurationModel {
        DurationModel {
            min_ms: self.min_duration_ms,
            max_ms: self.max_duration_ms,
            default_speed_mps: self.default_speed_mps,
        }
    }

    pub fn marker_throttle(&self) -> Option<Duration> {
        non_zero_ms(self.marker_throttle_ms)
    }

    pub fn progress_throttle(&self) -> Option<Duration> {
        non_zero_ms(self.progress_throttle_ms)
    }

    pub fn settle_wait(&self) -> Duration {
        Duration::from_millis(self.settle_debounce_ms)
    }
}

fn non_zero_ms(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}
