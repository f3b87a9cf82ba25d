//! Golden-angle spiral site layouts
//!
//! Places points on a Vogel spiral: point `i` sits at angle `i * golden_angle`
//! and radius `sqrt(i / n)`, which spreads points evenly over a disk without
//! clustering. Random jitter breaks up the visible spiral arms so the
//! resulting cells look natural, then the disk is stretched to fill the box.

use std::f64::consts::PI;

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::BoundingBox;

/// Golden ratio φ = (1 + √5) / 2
const PHI: f64 = 1.618033988749895;

/// Jitter strength as fraction of average point spacing
/// 0.0 = no jitter (pure spiral)
const JITTER_STRENGTH: f64 = 0.35;

/// Generate evenly spread points filling a bounding box
///
/// Produces a near-uniform layout in O(n) time, a cheap alternative to
/// random points followed by Lloyd relaxation.
///
/// # Example
///
/// ```rust
/// use rust_voronoi_sweep::generation::spiral_points;
/// use rust_voronoi_sweep::BoundingBox;
///
/// let points = spiral_points(1000, &BoundingBox::default(), 42);
/// assert_eq!(points.len(), 1000);
/// ```
pub fn spiral_points(count: usize, bbox: &BoundingBox, seed: u64) -> Vec<DVec2> {
    if count == 0 {
        return Vec::new();
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let n = count as f64;
    let golden_angle = 2.0 * PI * (1.0 - 1.0 / PHI);

    // Average spacing on the unit disk
    let jitter_amount = (PI / n).sqrt() * JITTER_STRENGTH;

    let center = (bbox.min() + bbox.max()) / 2.0;
    let half = DVec2::new(bbox.width(), bbox.height()) / 2.0;

    (0..count)
        .map(|i| {
            let theta = i as f64 * golden_angle;
            let r = ((i as f64 + 0.5) / n).sqrt();
            let base = DVec2::new(r * theta.cos(), r * theta.sin());

            let jitter_theta: f64 = rng.gen_range(0.0..2.0 * PI);
            let jitter_mag: f64 = rng.gen_range(0.0..jitter_amount);
            let jittered = base + DVec2::new(jitter_theta.cos(), jitter_theta.sin()) * jitter_mag;

            // Disk to square, keeping the direction from the center
            let square = disk_to_square(jittered.clamp_length_max(1.0));
            center + square * half
        })
        .collect()
}

/// Stretch a point of the unit disk onto the square `[-1, 1]^2`
fn disk_to_square(p: DVec2) -> DVec2 {
    let max_axis = p.x.abs().max(p.y.abs());
    if max_axis == 0.0 {
        return p;
    }
    p * (p.length() / max_axis)
}
