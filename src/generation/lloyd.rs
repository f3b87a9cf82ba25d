//! Lloyd's Relaxation for uniform point distribution
//!
//! Lloyd's Relaxation iteratively improves the uniformity of a point layout
//! by moving each point to the centroid of its Voronoi cell.

use std::collections::HashSet;
use std::time::Instant;

use glam::DVec2;

use crate::config::{BoundingBox, DiagramConfig};
use crate::diagram::Diagram;
use crate::error::Result;

/// Options for Lloyd's relaxation algorithm
#[derive(Debug, Clone, Copy)]
pub struct LloydOptions {
    /// Maximum number of iterations to run
    pub max_iterations: usize,
    /// Convergence threshold - stop when max displacement < this value
    /// Set to 0.0 to disable early termination
    pub convergence_threshold: f64,
}

impl Default for LloydOptions {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            // Relative to the box diagonal. For a 100 x 100 box this stops
            // once no point moves more than ~0.14 units.
            convergence_threshold: 0.001,
        }
    }
}

/// Apply Lloyd's Relaxation to improve point distribution uniformity
///
/// Lloyd's Relaxation iteratively moves each seed point to the centroid of its
/// Voronoi cell, creating a more uniform, honeycomb-like distribution.
///
/// # Algorithm
///
/// For each iteration:
/// 1. Build the diagram of the current points, clipped to the box
/// 2. Move each point to the area centroid of its clipped cell
///
/// # Arguments
///
/// * `points` - Initial point distribution
/// * `bbox` - Region the cells are clipped to
/// * `iterations` - Number of relaxation iterations (typically 3-5)
///
/// # Errors
///
/// Fails like [`Diagram::build`] when the points are empty or contain
/// duplicates.
pub fn lloyd_relaxation(points: Vec<DVec2>, bbox: &BoundingBox, iterations: usize) -> Result<Vec<DVec2>> {
    let options = LloydOptions {
        max_iterations: iterations,
        ..Default::default()
    };
    lloyd_relaxation_with_options(points, bbox, options)
}

/// Apply Lloyd's Relaxation with custom options
///
/// This variant allows fine-tuned control over convergence detection and
/// maximum iterations. Use `lloyd_relaxation` for the simple interface.
pub fn lloyd_relaxation_with_options(
    mut points: Vec<DVec2>,
    bbox: &BoundingBox,
    options: LloydOptions,
) -> Result<Vec<DVec2>> {
    let convergence_threshold = options.convergence_threshold * bbox.diagonal();
    let config = DiagramConfig {
        bounding_box: *bbox,
        ..Default::default()
    };
    let total_start = Instant::now();

    log::debug!(
        "lloyd: {} points, max {} iterations, threshold {:.4} (abs: {:.4})",
        points.len(),
        options.max_iterations,
        options.convergence_threshold,
        convergence_threshold
    );

    let mut iterations_run = 0;
    let mut converged = false;

    for iteration in 0..options.max_iterations {
        let iter_start = Instant::now();

        let diagram = Diagram::from_points(&points, config)?;
        let (new_points, max_displacement) = compute_new_points(&diagram, bbox);

        points = new_points;
        iterations_run = iteration + 1;

        log::debug!(
            "lloyd iteration {}: {:?}, max_disp={:.4}",
            iteration + 1,
            iter_start.elapsed(),
            max_displacement
        );

        // Early exit if converged
        if convergence_threshold > 0.0 && max_displacement < convergence_threshold {
            converged = true;
            break;
        }
    }

    log::debug!(
        "lloyd finished: {} iterations (of max {}), converged={}, total={:?}",
        iterations_run,
        options.max_iterations,
        converged,
        total_start.elapsed()
    );

    Ok(points)
}

/// Compute new point positions and track maximum displacement
fn compute_new_points(diagram: &Diagram<()>, bbox: &BoundingBox) -> (Vec<DVec2>, f64) {
    let mut max_displacement: f64 = 0.0;
    let mut taken: HashSet<[u64; 2]> = HashSet::with_capacity(diagram.cell_count());
    let center = (bbox.min() + bbox.max()) / 2.0;

    let new_points = diagram
        .cells()
        .iter()
        .map(|cell| {
            // Sites outside the box have empty cells and get pulled onto its edge
            let target = cell.centroid().clamp(bbox.min(), bbox.max());
            let new_point = claim(target, center, &mut taken);
            max_displacement = max_displacement.max(new_point.distance(cell.site));
            new_point
        })
        .collect();

    (new_points, max_displacement)
}

/// Take `target`, or the first free point stepping from it toward `center`
///
/// Several sites beyond the same side of the box clamp to one point.
fn claim(target: DVec2, center: DVec2, taken: &mut HashSet<[u64; 2]>) -> DVec2 {
    let key = |p: DVec2| [p.x.to_bits(), p.y.to_bits()];
    let mut point = target;
    let mut step = 0;
    while !taken.insert(key(point)) {
        step += 1;
        point = target.lerp(center, NUDGE * step as f64);
    }
    point
}

/// Fraction of the way to the box center a colliding point moves per step
const NUDGE: f64 = 1e-6;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::random_points;

    /// Variance of cell areas, lower is more uniform
    fn area_spread(points: &[DVec2], bbox: &BoundingBox) -> f64 {
        let config = DiagramConfig {
            bounding_box: *bbox,
            ..Default::default()
        };
        let diagram = Diagram::from_points(points, config).unwrap();
        let areas: Vec<f64> = diagram.cells().iter().map(|c| c.area()).collect();
        let mean = areas.iter().sum::<f64>() / areas.len() as f64;
        areas.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / areas.len() as f64
    }

    #[test]
    fn test_lloyd_relaxation() {
        let bbox = BoundingBox::default();
        let points = random_points(100, &bbox, 42);
        let before = area_spread(&points, &bbox);

        let relaxed = lloyd_relaxation(points, &bbox, 3).unwrap();

        assert_eq!(relaxed.len(), 100);
        for point in &relaxed {
            assert!(bbox.contains(*point));
        }
        assert!(area_spread(&relaxed, &bbox) < before);
    }

    #[test]
    fn test_lloyd_relaxation_determinism() {
        let bbox = BoundingBox::default();
        let relaxed1 = lloyd_relaxation(random_points(50, &bbox, 12345), &bbox, 2).unwrap();
        let relaxed2 = lloyd_relaxation(random_points(50, &bbox, 12345), &bbox, 2).unwrap();

        // Same input should produce identical output
        assert_eq!(relaxed1, relaxed2);
    }

    #[test]
    fn test_lloyd_relaxation_with_options() {
        let bbox = BoundingBox::new(-30.0, 30.0, -10.0, 10.0).unwrap();
        let options = LloydOptions {
            max_iterations: 10,
            convergence_threshold: 0.0001,
        };
        let relaxed = lloyd_relaxation_with_options(random_points(80, &bbox, 42), &bbox, options).unwrap();

        assert_eq!(relaxed.len(), 80);
        for point in &relaxed {
            assert!(bbox.contains(*point));
        }
    }

    #[test]
    fn test_lloyd_options_default() {
        let options = LloydOptions::default();
        assert_eq!(options.max_iterations, 5);
        assert!((options.convergence_threshold - 0.001).abs() < 1e-12);
    }

    #[test]
    fn test_lloyd_zero_iterations_is_identity() {
        let bbox = BoundingBox::default();
        let points = random_points(20, &bbox, 5);
        assert_eq!(lloyd_relaxation(points.clone(), &bbox, 0).unwrap(), points);
    }

    #[test]
    fn test_lloyd_pulls_outside_points_into_box() {
        let bbox = BoundingBox::default();
        let points = vec![DVec2::new(50.0, 50.0), DVec2::new(20.0, 30.0), DVec2::new(250.0, 50.0)];
        let relaxed = lloyd_relaxation(points, &bbox, 1).unwrap();
        assert!(relaxed.iter().all(|p| bbox.contains(*p)));
    }

    #[test]
    fn test_lloyd_separates_sites_clamped_to_one_point() {
        let bbox = BoundingBox::default();
        // both outside sites clamp to (100, 50)
        let points = vec![
            DVec2::new(50.0, 50.0),
            DVec2::new(20.0, 30.0),
            DVec2::new(250.0, 50.0),
            DVec2::new(300.0, 50.0),
        ];
        let relaxed = lloyd_relaxation(points, &bbox, 2).unwrap();

        assert_eq!(relaxed.len(), 4);
        assert!(relaxed.iter().all(|p| bbox.contains(*p)));
        for i in 0..relaxed.len() {
            for j in i + 1..relaxed.len() {
                assert_ne!(relaxed[i], relaxed[j]);
            }
        }
    }

    #[test]
    fn test_claim_steps_toward_center() {
        let mut taken = HashSet::new();
        let target = DVec2::new(100.0, 50.0);
        let center = DVec2::new(50.0, 50.0);

        assert_eq!(claim(target, center, &mut taken), target);
        let second = claim(target, center, &mut taken);
        let third = claim(target, center, &mut taken);
        assert!(second.x < target.x && third.x < second.x);
        assert_eq!(second.y, 50.0);
    }

    #[test]
    fn test_lloyd_rejects_empty_input() {
        assert!(lloyd_relaxation(Vec::new(), &BoundingBox::default(), 2).is_err());
    }
}
