//! Voronoi Cell Structure
//!
//! The region owned by one site, clipped to the diagram's bounding box.

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{point_in_polygon, polygon_area, polygon_centroid};

/// The ownership region of a single site
///
/// Each cell carries:
/// - The ID of its site (its index in the input)
/// - The site position and the caller's attribute payload
/// - Neighbor connectivity from the Voronoi graph
/// - The boundary polygon, clipped to the bounding box
///
/// # Design Notes
///
/// Cells are snapshots taken after the mesh is closed. They are rebuilt
/// whenever the diagram is rebuilt; there is no incremental update.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct VoronoiCell<T> {
    /// Index of the site in the input (0 to cell_count-1)
    pub id: usize,

    /// Position of the site that owns this cell
    pub site: DVec2,

    /// Payload supplied with the site (owner, team, planet data...)
    pub attributes: T,

    /// IDs of cells sharing a boundary edge with this one, sorted
    ///
    /// Taken from the full diagram, so two sites whose shared edge lies
    /// outside the bounding box are still neighbors.
    pub neighbors: Vec<usize>,

    /// Boundary polygon, counter-clockwise in a y-up frame
    ///
    /// Empty when the cell lies entirely outside the bounding box.
    pub vertices: Vec<DVec2>,
}

impl<T> VoronoiCell<T> {
    /// Create a new Voronoi cell
    ///
    /// This is typically called while building a diagram, not by user code.
    pub fn new(id: usize, site: DVec2, attributes: T, neighbors: Vec<usize>, vertices: Vec<DVec2>) -> Self {
        Self {
            id,
            site,
            attributes,
            neighbors,
            vertices,
        }
    }

    #[inline]
    pub fn neighbor_count(&self) -> usize {
        self.neighbors.len()
    }

    #[inline]
    pub fn is_neighbor_of(&self, other_cell_id: usize) -> bool {
        self.neighbors.binary_search(&other_cell_id).is_ok()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// True when nothing of the cell remains inside the bounding box
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.len() < 3
    }

    /// Area of the clipped polygon
    pub fn area(&self) -> f64 {
        polygon_area(&self.vertices).abs()
    }

    /// Area centroid of the clipped polygon
    ///
    /// Falls back to the site for empty cells.
    pub fn centroid(&self) -> DVec2 {
        polygon_centroid(&self.vertices).unwrap_or(self.site)
    }

    /// Check whether a point lies inside the clipped polygon
    pub fn contains(&self, point: DVec2) -> bool {
        point_in_polygon(point, &self.vertices)
    }

    /// Straight-line distance between the two sites
    pub fn distance_to(&self, other: &VoronoiCell<T>) -> f64 {
        self.site.distance(other.site)
    }
}
