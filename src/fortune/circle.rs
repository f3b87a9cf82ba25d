//! Circle event prediction
//!
//! Three consecutive arcs whose breakpoints converge squeeze the middle arc
//! out once the sweep line reaches the bottom of the circle through their
//! sites. That point of the circle's center becomes a Voronoi vertex.

use glam::DVec2;

use super::queue::SiteId;
use crate::geometry::{circumcircle, orientation, Circle};

/// Predict where the middle arc of a triple disappears
///
/// Returns `None` when the triple cannot produce a vertex:
/// - the outer arcs belong to the same site
/// - the sites are collinear within the relative `epsilon`, or the circle
///   is not finite
/// - the sites do not turn clockwise, so the breakpoints diverge
/// - the circle's bottom is above the sweep line by more than `tolerance`
pub fn predict(
    sites: [SiteId; 3],
    points: [DVec2; 3],
    sweep_y: f64,
    tolerance: f64,
    epsilon: f64,
) -> Option<Circle> {
    let [left, middle, right] = points;
    if sites[0] == sites[2] {
        return None;
    }

    if orientation(left, middle, right) >= 0.0 {
        return None;
    }

    // DegenerateGeometry is recovered here by not creating an event
    let circle = circumcircle(left, middle, right, epsilon).ok()?;

    if circle.bottom() > sweep_y + tolerance {
        return None;
    }

    Some(circle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;
    const EPS: f64 = 1e-9;

    #[test]
    fn test_converging_triple() {
        // left, middle, right along the beach line under a sweep at y = 0
        let points = [DVec2::new(0.0, 0.0), DVec2::new(5.0, 10.0), DVec2::new(10.0, 0.0)];
        let circle = predict([0, 1, 2], points, 0.0, TOL, EPS).unwrap();
        assert!((circle.center - DVec2::new(5.0, 3.75)).length() < 1e-12);
        assert!((circle.bottom() - (3.75 - 6.25)).abs() < 1e-12);
    }

    #[test]
    fn test_diverging_triple() {
        let points = [DVec2::new(10.0, 0.0), DVec2::new(5.0, 10.0), DVec2::new(0.0, 0.0)];
        assert!(predict([0, 1, 2], points, 0.0, TOL, EPS).is_none());
    }

    #[test]
    fn test_collinear_triple() {
        let points = [DVec2::new(0.0, 0.0), DVec2::new(1.0, 1.0), DVec2::new(2.0, 2.0)];
        assert!(predict([0, 1, 2], points, 0.0, TOL, EPS).is_none());
    }

    #[test]
    fn test_rounded_collinear_triple() {
        // clockwise after rounding, but collinear as written
        let points = [DVec2::new(1.003, 1.001), DVec2::new(1.002, 1.002), DVec2::new(1.001, 1.003)];
        assert!(predict([0, 1, 2], points, 1.0, TOL, EPS).is_none());
        let reversed = [points[2], points[1], points[0]];
        assert!(predict([0, 1, 2], reversed, 1.0, TOL, EPS).is_none());
    }

    #[test]
    fn test_repeated_site() {
        let points = [DVec2::new(0.0, 5.0), DVec2::new(1.0, 0.0), DVec2::new(0.0, 5.0)];
        assert!(predict([3, 1, 3], points, 0.0, TOL, EPS).is_none());
    }

    #[test]
    fn test_event_in_the_past() {
        // circle bottom at -2.5, sweep already below it
        let points = [DVec2::new(0.0, 0.0), DVec2::new(5.0, 10.0), DVec2::new(10.0, 0.0)];
        assert!(predict([0, 1, 2], points, -3.0, TOL, EPS).is_none());
        assert!(predict([0, 1, 2], points, -2.5, TOL, EPS).is_some());
    }
}
