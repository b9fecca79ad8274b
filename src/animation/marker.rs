use super::{AnimationTransition, Easing};
use crate::config::EngineConfig;
use crate::duration::DurationModel;
use crate::geodesy::{bearing, distance_meters};
use crate::jitter::JitterFilter;
use crate::types::{AgentState, Fix, GeoPoint};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationPhase {
    Idle,
    Animating,
}

/// What the animator did with a fix
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FixOutcome {
    /// First valid fix: marker placed without animating
    Initialized,
    /// Malformed coordinates, dropped
    Rejected,
    /// Below the jitter threshold, dropped
    Filtered { distance_m: f64 },
    /// Dropped by a rate limiter before reaching the animator
    Throttled,
    Started { generation: u64, duration_ms: u64 },
    /// Replaced an in-flight transition (last fix wins)
    Superseded {
        generation: u64,
        duration_ms: u64,
        previous: u64,
    },
}

impl FixOutcome {
    /// True when the fix moved the marker's target
    pub fn accepted(&self) -> bool {
        matches!(
            self,
            FixOutcome::Initialized | FixOutcome::Started { .. } | FixOutcome::Superseded { .. }
        )
    }
}

/// Snapshot handed to the renderer once per tick
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub state: AgentState,
    pub phase: AnimationPhase,
    /// Generations of transitions that finished since the previous tick, oldest first
    pub completed: Vec<u64>,
}

/// Drives one marker toward the latest significant fix
///
/// # State machine
/// - Idle -> Animating on a significant fix
/// - Animating -> Animating when a newer fix supersedes the target
/// - Animating -> Idle when the transition's duration has elapsed
///
/// At most one transition exists at a time. A superseding transition starts
/// from wherever the marker is drawn at that instant, so the marker never
/// jumps. Each accepted fix bumps a generation counter that identifies its
/// transition.
///
/// Significance and heading are measured against the anchor, the most
/// recently accepted fix (the in-flight target while animating, else the
/// last completed one). Duration is derived from the distance actually left
/// to draw.
pub struct MarkerAnimator {
    jitter: JitterFilter,
    durations: DurationModel,
    position_easing: Easing,
    heading_easing: Easing,
    state: Option<AgentState>,
    anchor: Option<GeoPoint>,
    transition: Option<AnimationTransition>,
    generation: u64,
    pending_completions: Vec<u64>,
}

impl Default for MarkerAnimator {
    fn default() -> Self {
        MarkerAnimator::new(&EngineConfig::default())
    }
}

impl MarkerAnimator {
    pub fn new(config: &EngineConfig) -> Self {
        MarkerAnimator {
            jitter: config.jitter_filter(),
            durations: config.duration_model(),
            position_easing: config.position_easing,
            heading_easing: config.heading_easing,
            state: None,
            anchor: None,
            transition: None,
            generation: 0,
            pending_completions: Vec::new(),
        }
    }

    /// Feed a raw fix at time `now`
    pub fn on_fix(&mut self, fix: &Fix, now: Instant) -> FixOutcome {
        if let Err(e) = fix.validate() {
            log::debug!("Dropping fix at t={}: {}", fix.timestamp, e);
            return FixOutcome::Rejected;
        }
        let target = fix.point();

        self.advance(now);
        let (current, anchor) = match (self.state, self.anchor) {
            (Some(current), Some(anchor)) => (current, anchor),
            _ => {
                self.state = Some(AgentState::new(target, 0.0));
                self.anchor = Some(target);
                return FixOutcome::Initialized;
            }
        };

        let moved_m = distance_meters(anchor, target);
        if !self.jitter.is_significant(anchor, target) {
            return FixOutcome::Filtered {
                distance_m: moved_m,
            };
        }

        let heading = if moved_m > f64::EPSILON {
            bearing(anchor, target)
        } else {
            current.bearing_degrees
        };
        let travel_m = distance_meters(current.position, target);
        let duration_ms = self.durations.duration_ms(travel_m, fix.usable_speed());

        self.generation += 1;
        let next = AnimationTransition {
            from: current,
            to: AgentState::new(target, heading),
            duration: Duration::from_millis(duration_ms),
            started_at: now,
            generation: self.generation,
        };
        let previous = self.transition.replace(next).map(|t| t.generation);
        self.anchor = Some(target);

        match previous {
            Some(previous) => {
                log::debug!(
                    "Transition {} superseded by {} ({:.1} m in {} ms)",
                    previous,
                    self.generation,
                    travel_m,
                    duration_ms
                );
                FixOutcome::Superseded {
                    generation: self.generation,
                    duration_ms,
                    previous,
                }
            }
            None => FixOutcome::Started {
                generation: self.generation,
                duration_ms,
            },
        }
    }

    /// Advance to `now` and return the frame to draw
    ///
    /// None until the first valid fix.
    pub fn tick(&mut self, now: Instant) -> Option<Frame> {
        self.advance(now);
        let state = self.state?;
        let frame = Frame {
            state,
            phase: self.phase(),
            completed: std::mem::take(&mut self.pending_completions),
        };
        log::trace!(
            "Frame {:.6},{:.6} hdg {:.1} {:?}",
            state.position.latitude,
            state.position.longitude,
            state.bearing_degrees,
            frame.phase
        );
        Some(frame)
    }

    fn advance(&mut self, now: Instant) {
        let Some(transition) = &self.transition else {
            return;
        };
        if transition.is_complete(now) {
            self.state = Some(transition.to);
            self.pending_completions.push(transition.generation);
            self.transition = None;
        } else {
            self.state = Some(transition.sample(now, self.position_easing, self.heading_easing));
        }
    }

    /// Last computed marker state
    pub fn snapshot(&self) -> Option<AgentState> {
        self.state
    }

    pub fn phase(&self) -> AnimationPhase {
        if self.transition.is_some() {
            AnimationPhase::Animating
        } else {
            AnimationPhase::Idle
        }
    }

    pub fn transition(&self) -> Option<&AnimationTransition> {
        self.transition.as_ref()
    }

    /// Most recently accepted target position
    pub fn anchor(&self) -> Option<GeoPoint> {
        self.anchor
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Forget the marker entirely; the next fix initializes again
    pub fn reset(&mut self) {
        self.state = None;
        self.anchor = None;
        self.transition = None;
        self.pending_completions.clear();
    }
}
