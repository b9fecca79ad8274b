use crate::animation::{FixOutcome, Frame, MarkerAnimator};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::jitter::JitterFilter;
use crate::rate_limit::{Debouncer, Throttle};
use crate::route::{compute_progress, Route, RouteProgress};
use crate::types::{AgentState, Fix, GeoPoint};
use std::time::Instant;

/// Result of feeding one fix to the engine
#[derive(Clone, Debug, PartialEq)]
pub struct EngineUpdate {
    pub marker: FixOutcome,
    /// Fresh split when the fix was significant for the route
    pub progress: Option<RouteProgress>,
}

/// Live map engine for one driver on one trip
///
/// # Data flow
/// ```text
/// fix ──┬─> [marker throttle] ─> MarkerAnimator ─> tick() frames
///       ├─> [jitter gate] ─> [progress throttle] ─> compute_progress
///       └─> settle debouncer ─> poll_settled()
/// ```
///
/// Single owner, no interior locking; the host calls `on_fix` as fixes arrive
/// and `tick` once per frame from the same loop.
///
/// # Usage
/// ```no_run
/// use driver_tracker_rs::{EngineConfig, Fix, GeoPoint, LiveMapEngine, Route};
/// use std::time::Instant;
///
/// let route = Route::new(vec![GeoPoint::new(12.97, 77.59), GeoPoint::new(12.98, 77.60)]);
/// let mut engine = LiveMapEngine::new(EngineConfig::default(), route).unwrap();
///
/// let update = engine.on_fix(&Fix::new(0.0, 12.97, 77.59, Some(6.0)), Instant::now());
/// if let Some(progress) = update.progress {
///     println!("{:.0}% done", progress.progress_percent);
/// }
/// if let Some(frame) = engine.tick(Instant::now()) {
///     println!("draw marker at {:?}", frame.state);
/// }
/// ```
pub struct LiveMapEngine {
    config: EngineConfig,
    animator: MarkerAnimator,
    route: Route,
    progress_gate: JitterFilter,
    progress_anchor: Option<GeoPoint>,
    marker_throttle: Option<Throttle>,
    progress_throttle: Option<Throttle>,
    settle: Debouncer<Fix>,
    progress: RouteProgress,
}

impl LiveMapEngine {
    pub fn new(config: EngineConfig, route: Route) -> Result<Self> {
        config.validate()?;
        Ok(LiveMapEngine {
            animator: MarkerAnimator::new(&config),
            progress_gate: config.jitter_filter(),
            progress_anchor: None,
            marker_throttle: config.marker_throttle().map(Throttle::new),
            progress_throttle: config.progress_throttle().map(Throttle::new),
            settle: Debouncer::new(config.settle_wait()),
            progress: RouteProgress::empty(),
            route,
            config,
        })
    }

    pub fn on_fix(&mut self, fix: &Fix, now: Instant) -> EngineUpdate {
        if let Err(e) = fix.validate() {
            log::debug!("Ignoring fix at t={}: {}", fix.timestamp, e);
            return EngineUpdate {
                marker: FixOutcome::Rejected,
                progress: None,
            };
        }
        self.settle.call(now, fix.clone());

        let marker_allowed = self
            .marker_throttle
            .as_mut()
            .map_or(true, |gate| gate.try_acquire(now));
        let marker = if marker_allowed {
            self.animator.on_fix(fix, now)
        } else {
            FixOutcome::Throttled
        };

        EngineUpdate {
            marker,
            progress: self.update_progress(fix.point(), now),
        }
    }

    fn update_progress(&mut self, point: GeoPoint, now: Instant) -> Option<RouteProgress> {
        if let Some(anchor) = self.progress_anchor {
            if !self.progress_gate.is_significant(anchor, point) {
                return None;
            }
        }
        if let Some(gate) = self.progress_throttle.as_mut() {
            if !gate.try_acquire(now) {
                return None;
            }
        }

        self.progress_anchor = Some(point);
        self.progress = compute_progress(point, &self.route, self.config.look_ahead);
        Some(self.progress.clone())
    }

    /// Advance the marker animation; call once per rendered frame
    pub fn tick(&mut self, now: Instant) -> Option<Frame> {
        self.animator.tick(now)
    }

    /// Final fix of a burst once the stream has been quiet for the settle wait
    pub fn poll_settled(&mut self, now: Instant) -> Option<Fix> {
        self.settle.poll(now)
    }

    /// Start a new trip on `route`
    ///
    /// The split is recomputed right away from the latest known position:
    /// the last fix the progress path used, else the marker's target.
    pub fn set_route(&mut self, route: Route) -> &RouteProgress {
        log::info!(
            "Route set: {} vertices, {:.0} m",
            route.len(),
            route.length_m()
        );
        self.route = route;
        if let Some(gate) = self.progress_throttle.as_mut() {
            gate.reset();
        }
        self.progress_anchor = self.progress_anchor.or_else(|| self.animator.anchor());
        self.progress = match self.progress_anchor {
            Some(anchor) => compute_progress(anchor, &self.route, self.config.look_ahead),
            None => RouteProgress::empty(),
        };
        &self.progress
    }

    /// Latest split; neutral until the first accepted fix
    pub fn progress(&self) -> &RouteProgress {
        &self.progress
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn snapshot(&self) -> Option<AgentState> {
        self.animator.snapshot()
    }

    pub fn animator(&self) -> &MarkerAnimator {
        &self.animator
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
