pub mod polyline;
pub mod progress;

pub use polyline::Route;
pub use progress::{compute_progress, find_nearest_vertex, NearestVertex, RouteProgress, DEFAULT_LOOK_AHEAD};
