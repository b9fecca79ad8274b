use super::Easing;
use crate::interpolation::{lerp_bearing, lerp_point};
use crate::types::AgentState;
use std::time::{Duration, Instant};

/// One in-flight marker move from `from` to `to`
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationTransition {
    pub from: AgentState,
    pub to: AgentState,
    pub duration: Duration,
    pub started_at: Instant,
    pub generation: u64,
}

impl AnimationTransition {
    pub fn duration_ms(&self) -> u64 {
        self.duration.as_millis() as u64
    }

    /// Linear progress in [0, 1]; zero-length transitions are complete at once
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn is_complete(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    /// Interpolated marker state at `now`
    ///
    /// Position and heading advance together, each on its own curve.
    pub fn sample(&self, now: Instant, position: Easing, heading: Easing) -> AgentState {
        let t = self.progress(now);
        if t >= 1.0 {
            return self.to;
        }
        AgentState {
            position: lerp_point(self.from.position, self.to.position, position.apply(t)),
            bearing_degrees: lerp_bearing(
                self.from.bearing_degrees,
                self.to.bearing_degrees,
                heading.apply(t),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoPoint;
    use approx::assert_abs_diff_eq;

    fn transition(start: Instant, duration_ms: u64) -> AnimationTransition {
        AnimationTransition {
            from: AgentState::new(GeoPoint::new(12.0, 77.0), 350.0),
            to: AgentState::new(GeoPoint::new(12.001, 77.0), 10.0),
            duration: Duration::from_millis(duration_ms),
            started_at: start,
            generation: 1,
        }
    }

    #[test]
    fn test_progress_over_time() {
        let start = Instant::now();
        let t = transition(start, 1000);
        assert_eq!(t.progress(start), 0.0);
        assert_abs_diff_eq!(t.progress(start + Duration::from_millis(250)), 0.25, epsilon = 1e-9);
        assert_eq!(t.progress(start + Duration::from_millis(5000)), 1.0);
        assert!(t.is_complete(start + Duration::from_millis(1000)));
        assert!(!t.is_complete(start + Duration::from_millis(999)));
    }

    #[test]
    fn test_clock_before_start_reads_zero() {
        let start = Instant::now() + Duration::from_secs(1);
        let t = transition(start, 1000);
        assert_eq!(t.progress(start - Duration::from_millis(500)), 0.0);
    }

    #[test]
    fn test_zero_duration_is_complete() {
        let start = Instant::now();
        let t = transition(start, 0);
        assert!(t.is_complete(start));
        assert_eq!(t.sample(start, Easing::Linear, Easing::Linear), t.to);
    }

    #[test]
    fn test_sample_endpoints_and_heading_wrap() {
        let start = Instant::now();
        let t = transition(start, 1000);
        assert_eq!(t.sample(start, Easing::EaseOutCubic, Easing::EaseInOutCubic), t.from);
        assert_eq!(
            t.sample(start + Duration::from_millis(1000), Easing::EaseOutCubic, Easing::EaseInOutCubic),
            t.to
        );

        let mid = t.sample(start + Duration::from_millis(500), Easing::Linear, Easing::Linear);
        assert_abs_diff_eq!(mid.position.latitude, 12.0005, epsilon = 1e-9);
        // 350 -> 10 passes through north
        assert_abs_diff_eq!(mid.bearing_degrees, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ease_out_position_leads_linear() {
        let start = Instant::now();
        let t = transition(start, 1000);
        let at = start + Duration::from_millis(300);
        let eased = t.sample(at, Easing::EaseOutCubic, Easing::Linear);
        let linear = t.sample(at, Easing::Linear, Easing::Linear);
        assert!(eased.position.latitude > linear.position.latitude);
    }
}
