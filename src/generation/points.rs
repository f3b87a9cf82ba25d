//! Uniform random site layouts

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::BoundingBox;

/// Generate uniformly distributed points inside a bounding box
///
/// The same seed always yields the same points.
///
/// # Example
///
/// ```rust
/// use rust_voronoi_sweep::*;
///
/// let bbox = BoundingBox::default();
/// let points = random_points(200, &bbox, 7);
/// assert_eq!(points.len(), 200);
/// assert!(points.iter().all(|p| bbox.contains(*p)));
/// ```
pub fn random_points(count: usize, bbox: &BoundingBox, seed: u64) -> Vec<DVec2> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let min = bbox.min();
    let max = bbox.max();

    (0..count)
        .map(|_| DVec2::new(rng.gen_range(min.x..max.x), rng.gen_range(min.y..max.y)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_points_in_box() {
        let bbox = BoundingBox::new(-20.0, 20.0, 5.0, 15.0).unwrap();
        let points = random_points(500, &bbox, 3);

        assert_eq!(points.len(), 500);
        for p in &points {
            assert!(bbox.contains(*p), "{:?} escaped the box", p);
        }
    }

    #[test]
    fn test_random_points_determinism() {
        let bbox = BoundingBox::default();
        assert_eq!(random_points(50, &bbox, 12345), random_points(50, &bbox, 12345));
        assert_ne!(random_points(50, &bbox, 12345), random_points(50, &bbox, 67890));
    }

    #[test]
    fn test_random_points_empty() {
        assert!(random_points(0, &BoundingBox::default(), 1).is_empty());
    }
}
