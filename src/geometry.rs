//! Planar geometry primitives
//!
//! Parabola and bisector arithmetic for the sweep, circumcircles for circle
//! events, and the polygon helpers used when extracting cells.
//!
//! The sweep line moves from large y toward small y, so every arc is a
//! parabola opening toward +y with the sweep line as its directrix.

use glam::DVec2;

use crate::config::BoundingBox;
use crate::error::{Result, VoronoiError};

/// A circle through three sites
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: DVec2,
    pub radius: f64,
}

impl Circle {
    /// Lowest y on the circle, where the sweep line meets it last
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.center.y - self.radius
    }
}

/// Twice the signed area of the triangle `a, b, c`
///
/// Positive for a counter-clockwise turn, negative for clockwise.
#[inline]
pub fn orientation(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b - a).perp_dot(c - a)
}

/// Height of the parabola with `focus` and horizontal `directrix` at `x`
pub fn parabola_y(focus: DVec2, directrix: f64, x: f64) -> f64 {
    let d = focus.y - directrix;
    (x - focus.x).powi(2) / (2.0 * d) + directrix + d / 2.0
}

/// X coordinate of the breakpoint between the arc of `left` and the arc of
/// `right` (in that order along the beach line) for a sweep line at `directrix`
///
/// A site lying on the sweep line has a degenerate arc, a vertical ray at its
/// own x. Two sites at the same height meet halfway between them.
pub fn breakpoint_x(left: DVec2, right: DVec2, directrix: f64) -> f64 {
    let dl = left.y - directrix;
    let dr = right.y - directrix;

    if dl <= 0.0 && dr <= 0.0 {
        return (left.x + right.x) / 2.0;
    }
    if dl <= 0.0 {
        return left.x;
    }
    if dr <= 0.0 {
        return right.x;
    }

    // f(x) = parabola_left(x) - parabola_right(x); the wanted root is the one
    // where f goes from negative to positive.
    let a = 1.0 / (2.0 * dl) - 1.0 / (2.0 * dr);
    let b = right.x / dr - left.x / dl;
    let c = left.x * left.x / (2.0 * dl) - right.x * right.x / (2.0 * dr) + (dl - dr) / 2.0;

    if (dl - dr).abs() <= 1e-12 * dl.max(dr) {
        if b == 0.0 {
            return (left.x + right.x) / 2.0;
        }
        return -c / b;
    }

    // (-b + sqrt(disc)) / 2a, written to avoid cancellation when `a` is tiny
    let root = (b * b - 4.0 * a * c).max(0.0).sqrt();
    if b < 0.0 {
        return (root - b) / (2.0 * a);
    }
    if b + root == 0.0 {
        return 0.0;
    }
    -2.0 * c / (b + root)
}

/// Circle through three points
///
/// `epsilon` is the relative flatness below which the points count as
/// collinear: the distance of one point from the line through the other two,
/// over the longest side. It is never taken below machine precision.
///
/// # Errors
///
/// Returns `DegenerateGeometry` when the points are collinear or coincident,
/// or the center is not finite.
pub fn circumcircle(a: DVec2, b: DVec2, c: DVec2, epsilon: f64) -> Result<Circle> {
    let ab = b - a;
    let ac = c - a;
    let d = 2.0 * ab.perp_dot(ac);

    let longest = ab.length_squared().max(ac.length_squared()).max((c - b).length_squared());
    if d == 0.0 || d.abs() <= 2.0 * epsilon.max(f64::EPSILON) * longest {
        return Err(VoronoiError::DegenerateGeometry);
    }

    let ab2 = ab.length_squared();
    let ac2 = ac.length_squared();
    let offset = DVec2::new(ac.y * ab2 - ab.y * ac2, ab.x * ac2 - ac.x * ab2) / d;
    let center = a + offset;
    let radius = offset.length();

    if !center.is_finite() || !radius.is_finite() {
        return Err(VoronoiError::DegenerateGeometry);
    }

    Ok(Circle { center, radius })
}

/// Direction of the half-edge separating `site` (on its left) from `other`
#[inline]
pub fn bisector_direction(site: DVec2, other: DVec2) -> DVec2 {
    (other - site).perp()
}

/// Signed area of a polygon (positive when counter-clockwise)
pub fn polygon_area(polygon: &[DVec2]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..polygon.len() {
        let p = polygon[i];
        let q = polygon[(i + 1) % polygon.len()];
        area += p.perp_dot(q);
    }
    area / 2.0
}

/// Area centroid of a simple polygon
///
/// Falls back to the vertex average for polygons without area.
pub fn polygon_centroid(polygon: &[DVec2]) -> Option<DVec2> {
    if polygon.is_empty() {
        return None;
    }

    let area = polygon_area(polygon);
    if area.abs() <= f64::EPSILON {
        let sum: DVec2 = polygon.iter().copied().sum();
        return Some(sum / polygon.len() as f64);
    }

    let mut centroid = DVec2::ZERO;
    for i in 0..polygon.len() {
        let p = polygon[i];
        let q = polygon[(i + 1) % polygon.len()];
        centroid += (p + q) * p.perp_dot(q);
    }
    Some(centroid / (6.0 * area))
}

/// Even-odd point in polygon test
pub fn point_in_polygon(point: DVec2, polygon: &[DVec2]) -> bool {
    let mut inside = false;
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut j = n - 1;
    for i in 0..n {
        let pi = polygon[i];
        let pj = polygon[j];
        if (pi.y > point.y) != (pj.y > point.y) {
            let x = pj.x + (point.y - pj.y) * (pi.x - pj.x) / (pi.y - pj.y);
            if point.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Clip a convex polygon to a bounding box (Sutherland–Hodgman)
///
/// Returns an empty polygon when nothing remains.
pub fn clip_polygon(polygon: &[DVec2], bbox: &BoundingBox) -> Vec<DVec2> {
    let mut output = polygon.to_vec();

    // (axis, bound, keep the side with larger coordinates)
    let planes = [
        (0, bbox.left, true),
        (0, bbox.right, false),
        (1, bbox.top, true),
        (1, bbox.bottom, false),
    ];

    for (axis, bound, keep_greater) in planes {
        if output.is_empty() {
            break;
        }
        let input = std::mem::take(&mut output);
        let inside = |p: DVec2| {
            if keep_greater {
                p[axis] >= bound
            } else {
                p[axis] <= bound
            }
        };

        let mut previous = input[input.len() - 1];
        for &current in &input {
            let current_in = inside(current);
            let previous_in = inside(previous);
            if current_in {
                if !previous_in {
                    output.push(intersect_axis(previous, current, axis, bound));
                }
                output.push(current);
            } else if previous_in {
                output.push(intersect_axis(previous, current, axis, bound));
            }
            previous = current;
        }
    }

    dedup_polygon(output)
}

fn intersect_axis(a: DVec2, b: DVec2, axis: usize, bound: f64) -> DVec2 {
    let t = (bound - a[axis]) / (b[axis] - a[axis]);
    let mut p = a + (b - a) * t;
    p[axis] = bound;
    p
}

fn dedup_polygon(mut polygon: Vec<DVec2>) -> Vec<DVec2> {
    polygon.dedup_by(|a, b| a.distance_squared(*b) <= f64::EPSILON);
    while polygon.len() > 1 && polygon[0].distance_squared(polygon[polygon.len() - 1]) <= f64::EPSILON {
        polygon.pop();
    }
    if polygon.len() < 3 {
        polygon.clear();
    }
    polygon
}

/// Clip a segment to a bounding box (Liang–Barsky)
pub fn clip_segment(a: DVec2, b: DVec2, bbox: &BoundingBox) -> Option<(DVec2, DVec2)> {
    let d = b - a;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    let checks = [
        (-d.x, a.x - bbox.left),
        (d.x, bbox.right - a.x),
        (-d.y, a.y - bbox.top),
        (d.y, bbox.bottom - a.y),
    ];

    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some((a + d * t0, a + d * t1))
}
