//! Live driver-location animation and route progress.
//!
//! Turns a noisy stream of GPS fixes into smooth marker motion (position and
//! heading eased between fixes) and a travelled/remaining split of the trip
//! polyline. Everything is driven by the caller's clock; see [`LiveMapEngine`].

pub mod animation;
pub mod camera;
pub mod config;
pub mod duration;
pub mod engine;
pub mod error;
pub mod geodesy;
pub mod interpolation;
pub mod jitter;
pub mod rate_limit;
pub mod route;
pub mod types;

pub use animation::{AnimationPhase, Easing, FixOutcome, Frame, MarkerAnimator};
pub use config::{ConfigOverrides, EngineConfig};
pub use engine::{EngineUpdate, LiveMapEngine};
pub use error::{Result, TrackerError};
pub use route::{compute_progress, Route, RouteProgress};
pub use types::{AgentState, Fix, GeoPoint};
