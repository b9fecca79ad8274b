pub mod easing;
pub mod marker;
pub mod transition;

pub use easing::Easing;
pub use marker::{AnimationPhase, FixOutcome, Frame, MarkerAnimator};
pub use transition::AnimationTransition;
