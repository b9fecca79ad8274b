use crate::geodesy::{distance_meters, path_length_meters};
use crate::types::GeoPoint;
use serde::{Deserialize, Serialize};

/// Route vertices the split point is pushed past the nearest match
pub const DEFAULT_LOOK_AHEAD: usize = 5;

/// Closest route vertex to a location
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NearestVertex {
    pub index: usize,
    pub distance_m: f64,
}

/// Travelled/remaining split of a route at the current position
///
/// A fresh snapshot per call. Both halves contain `current` at the seam
/// (last of `travelled`, first of `remaining`) so the two polylines meet at
/// the marker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteProgress {
    pub travelled: Vec<GeoPoint>,
    pub remaining: Vec<GeoPoint>,
    /// Split index after look-ahead
    pub nearest_index: usize,
    /// Raw nearest vertex before look-ahead
    pub matched_index: usize,
    /// None for an empty route
    pub distance_to_route_m: Option<f64>,
    /// [0, 100)
    pub progress_percent: f64,
}

impl Default for RouteProgress {
    fn default() -> Self {
        RouteProgress::empty()
    }
}

impl RouteProgress {
    /// Neutral "no route yet" result
    pub fn empty() -> Self {
        RouteProgress {
            travelled: Vec::new(),
            remaining: Vec::new(),
            nearest_index: 0,
            matched_index: 0,
            distance_to_route_m: None,
            progress_percent: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.travelled.is_empty() && self.remaining.is_empty()
    }

    /// Length of the remaining polyline from the marker (m)
    pub fn remaining_distance_m(&self) -> f64 {
        path_length_meters(&self.remaining)
    }
}

/// Linear scan for the closest vertex; ties go to the lowest index
///
/// None for an empty route.
pub fn find_nearest_vertex(location: GeoPoint, route: &[GeoPoint]) -> Option<NearestVertex> {
    let mut nearest: Option<NearestVertex> = None;
    for (index, vertex) in route.iter().enumerate() {
        let distance_m = distance_meters(location, *vertex);
        // NaN only ever loses to a finite distance
        let closer = nearest.map_or(true, |best| {
            distance_m < best.distance_m || (best.distance_m.is_nan() && !distance_m.is_nan())
        });
        if closer {
            nearest = Some(NearestVertex { index, distance_m });
        }
    }
    nearest
}

/// Split `route` at the current position
///
/// The split index is the nearest vertex pushed `look_ahead` vertices
/// forward (capped at the last vertex). A GPS fix that wobbles slightly
/// behind the driver then does not pull the split point backwards.
/// `progress_percent` = split index / route length * 100.
///
/// A malformed `current` yields the neutral result. O(route length).
pub fn compute_progress(current: GeoPoint, route: &[GeoPoint], look_ahead: usize) -> RouteProgress {
    if !current.is_valid() {
        return RouteProgress::empty();
    }
    let Some(nearest) = find_nearest_vertex(current, route) else {
        return RouteProgress::empty();
    };

    let split = nearest.index.saturating_add(look_ahead).min(route.len() - 1);

    let mut travelled = Vec::with_capacity(split + 1);
    travelled.extend_from_slice(&route[..split]);
    travelled.push(current);

    let mut remaining = Vec::with_capacity(route.len() - split + 1);
    remaining.push(current);
    remaining.extend_from_slice(&route[split..]);

    RouteProgress {
        travelled,
        remaining,
        nearest_index: split,
        matched_index: nearest.index,
        distance_to_route_m: Some(nearest.distance_m),
        progress_percent: split as f64 / route.len() as f64 * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// `n` points heading north, ~11 m apart
    fn straight_route(n: usize) -> Vec<GeoPoint> {
        (0..n)
            .map(|i| GeoPoint::new(12.0 + i as f64 * 0.0001, 77.0))
            .collect()
    }

    #[test]
    fn test_empty_route_is_neutral() {
        let progress = compute_progress(GeoPoint::new(12.0, 77.0), &[], 5);
        assert!(progress.travelled.is_empty());
        assert!(progress.remaining.is_empty());
        assert_eq!(progress.nearest_index, 0);
        assert_eq!(progress.progress_percent, 0.0);
        assert_eq!(progress, RouteProgress::empty());
        assert!(progress.is_empty());
    }

    #[test]
    fn test_look_ahead_at_vertex_forty() {
        let route = straight_route(100);
        let progress = compute_progress(route[40], &route, 5);
        assert_eq!(progress.matched_index, 40);
        assert_eq!(progress.nearest_index, 45);
        assert_abs_diff_eq!(progress.progress_percent, 45.0, epsilon = 1e-9);
        assert_eq!(progress.travelled.len(), 46);
        assert_eq!(progress.remaining.len(), 56);
        assert_eq!(progress.remaining[1], route[45]);
        assert_eq!(progress.distance_to_route_m, Some(0.0));
    }

    #[test]
    fn test_halves_meet_at_current() {
        let route = straight_route(20);
        let positions = [
            GeoPoint::new(11.9, 77.0),
            GeoPoint::new(12.00051, 77.00002),
            GeoPoint::new(12.0013, 76.9999),
            GeoPoint::new(12.5, 77.0),
        ];
        for current in positions {
            let progress = compute_progress(current, &route, DEFAULT_LOOK_AHEAD);
            assert_eq!(progress.travelled.last(), Some(&current));
            assert_eq!(progress.remaining.first(), Some(&current));
            // Every route vertex is in exactly one half
            assert_eq!(progress.travelled.len() + progress.remaining.len(), route.len() + 2);
        }
    }

    #[test]
    fn test_look_ahead_capped_at_last_vertex() {
        let route = straight_route(10);
        let progress = compute_progress(route[8], &route, 5);
        assert_eq!(progress.matched_index, 8);
        assert_eq!(progress.nearest_index, 9);
        assert_abs_diff_eq!(progress.progress_percent, 90.0, epsilon = 1e-9);
        assert_eq!(progress.remaining, vec![route[8], route[9]]);
    }

    #[test]
    fn test_progress_below_hundred_at_destination() {
        let route = straight_route(10);
        let progress = compute_progress(route[9], &route, 5);
        assert!(progress.progress_percent < 100.0);
    }

    #[test]
    fn test_single_vertex_route() {
        let route = vec![GeoPoint::new(12.0, 77.0)];
        let current = GeoPoint::new(12.001, 77.0);
        let progress = compute_progress(current, &route, 5);
        assert_eq!(progress.nearest_index, 0);
        assert_eq!(progress.progress_percent, 0.0);
        assert_eq!(progress.travelled, vec![current]);
        assert_eq!(progress.remaining, vec![current, route[0]]);
    }

    #[test]
    fn test_zero_look_ahead_uses_raw_match() {
        let route = straight_route(50);
        let progress = compute_progress(route[10], &route, 0);
        assert_eq!(progress.nearest_index, 10);
        assert_abs_diff_eq!(progress.progress_percent, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_huge_look_ahead_does_not_overflow() {
        let route = straight_route(5);
        let progress = compute_progress(route[1], &route, usize::MAX);
        assert_eq!(progress.nearest_index, 4);
    }

    #[test]
    fn test_tie_goes_to_first_vertex() {
        // Route that doubles back over the same point
        let a = GeoPoint::new(12.0, 77.0);
        let b = GeoPoint::new(12.001, 77.0);
        let route = vec![a, b, a, b];
        let nearest = find_nearest_vertex(b, &route).expect("non-empty");
        assert_eq!(nearest.index, 1);
        assert_eq!(nearest.distance_m, 0.0);
        assert!(find_nearest_vertex(a, &[]).is_none());
    }

    #[test]
    fn test_nan_current_is_neutral() {
        let route = straight_route(50);
        let progress = compute_progress(GeoPoint::new(f64::NAN, 77.0), &route, 5);
        assert_eq!(progress, RouteProgress::empty());
        let progress = compute_progress(GeoPoint::new(12.0, 181.0), &route, 5);
        assert_eq!(progress.progress_percent, 0.0);
    }

    #[test]
    fn test_nan_distances_keep_first_vertex() {
        let route = straight_route(50);
        let nearest = find_nearest_vertex(GeoPoint::new(f64::NAN, 77.0), &route).expect("non-empty");
        assert_eq!(nearest.index, 0);
        assert!(nearest.distance_m.is_nan());

        // A finite distance still beats an earlier NaN vertex
        let mut route = route;
        route[0] = GeoPoint::new(f64::NAN, 77.0);
        let nearest = find_nearest_vertex(route[30], &route).expect("non-empty");
        assert_eq!(nearest.index, 30);
    }

    #[test]
    fn test_monotonic_along_forward_trip() {
        let route = straight_route(60);
        let mut last = 0.0;
        for i in 0..60 {
            let p = GeoPoint::new(route[i].latitude + 0.00001, 77.00001);
            let progress = compute_progress(p, &route, 5);
            assert!(progress.progress_percent >= last);
            last = progress.progress_percent;
        }
    }

    #[test]
    fn test_remaining_distance_shrinks() {
        let route = straight_route(30);
        let early = compute_progress(route[2], &route, 5).remaining_distance_m();
        let late = compute_progress(route[20], &route, 5).remaining_distance_m();
        assert!(late < early);
    }
}
