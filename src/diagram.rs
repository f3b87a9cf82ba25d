//! Diagram main structure

use std::collections::HashSet;

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cell::VoronoiCell;
use crate::config::{BoundingBox, DiagramConfig};
use crate::dcel::Dcel;
use crate::error::{Result, VoronoiError};
use crate::fortune::Sweep;
use crate::frame::{self, Frame};
use crate::geometry::{clip_polygon, clip_segment};

#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;

/// An input point with its payload
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Site<T> {
    pub position: DVec2,
    pub attributes: T,
}

impl<T> Site<T> {
    pub fn new(x: f64, y: f64, attributes: T) -> Self {
        Self {
            position: DVec2::new(x, y),
            attributes,
        }
    }
}

impl From<DVec2> for Site<()> {
    fn from(position: DVec2) -> Self {
        Self {
            position,
            attributes: (),
        }
    }
}

/// A boundary segment between two cells, clipped to the bounding box
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// The two cells on either side, smaller ID first
    pub cells: (usize, usize),
    pub start: DVec2,
    pub end: DVec2,
}

impl Edge {
    #[inline]
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }
}

/// A Voronoi diagram of sites in a bounded region
///
/// Generic over the site payload `T`. Cells are stored in input order, so the
/// cell of site `i` has ID `i`.
///
/// # Examples
///
/// ```
/// use rust_voronoi_sweep::*;
///
/// let sites = vec![
///     Site::new(20.0, 20.0, "red"),
///     Site::new(80.0, 30.0, "blue"),
///     Site::new(50.0, 80.0, "green"),
/// ];
/// let diagram = Diagram::build(sites, DiagramConfig::default()).unwrap();
///
/// assert_eq!(diagram.cell_count(), 3);
/// assert_eq!(diagram.vertices().len(), 1);
/// assert_eq!(diagram.get_cell(1).unwrap().attributes, "blue");
/// ```
#[derive(Clone)]
pub struct Diagram<T> {
    /// Configuration used to build this diagram
    config: DiagramConfig,

    /// One cell per site (indexed by cell ID)
    cells: Vec<VoronoiCell<T>>,

    /// Voronoi vertices in the order the sweep found them
    vertices: Vec<DVec2>,

    /// Closed half-edge mesh
    dcel: Dcel<T>,

    /// Rectangle the infinite edges were capped at
    frame: Frame,

    /// Absolute tolerance derived from the site coordinates
    tolerance: f64,

    /// Nearest-site lookup (optional, requires spatial-index feature)
    #[cfg(feature = "spatial-index")]
    spatial_index: SpatialIndex,
}

impl Diagram<()> {
    /// Build a diagram of bare points
    pub fn from_points(points: &[DVec2], config: DiagramConfig) -> Result<Self> {
        Self::build(points.iter().map(|&p| Site::from(p)), config)
    }
}

impl<T: Clone> Diagram<T> {
    /// Sweep the sites, close the mesh and extract the clipped cells
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty, non-finite or duplicated site set, or a
    ///   bounding box without area
    /// - `BrokenTopology` if the finished mesh fails validation
    pub fn build<I>(sites: I, config: DiagramConfig) -> Result<Self>
    where
        I: IntoIterator<Item = Site<T>>,
    {
        let bbox = config.bounding_box;
        let bbox = BoundingBox::new(bbox.left, bbox.right, bbox.top, bbox.bottom)?;

        let sites: Vec<(DVec2, T)> = sites.into_iter().map(|s| (s.position, s.attributes)).collect();
        let positions: Vec<DVec2> = sites.iter().map(|(p, _)| *p).collect();
        let tolerance = config.tolerance(&positions);

        let output = Sweep::new(sites, &config)?.run()?;
        let frame = Frame::enclosing(&bbox, &positions, &output.vertices, config.frame_margin);
        let mut dcel = output.dcel;
        frame::close(&mut dcel, &frame)?;
        dcel.validate()?;

        let cells = extract_cells(&dcel, &bbox, tolerance)?;

        #[cfg(feature = "spatial-index")]
        let spatial_index = SpatialIndex::new(&positions);

        log::debug!(
            "built diagram: {} cells, {} vertices, {} half-edges",
            cells.len(),
            output.vertices.len(),
            dcel.half_edge_count()
        );

        Ok(Self {
            config,
            cells,
            vertices: output.vertices,
            dcel,
            frame,
            tolerance,
            #[cfg(feature = "spatial-index")]
            spatial_index,
        })
    }

    #[inline]
    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    /// Absolute tolerance derived from the site coordinates
    #[inline]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    #[inline]
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.config.bounding_box
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Get a cell by ID
    ///
    /// Returns `None` if the cell ID is out of bounds.
    #[inline]
    pub fn get_cell(&self, id: usize) -> Option<&VoronoiCell<T>> {
        self.cells.get(id)
    }

    /// Get a cell by ID, failing with `CellNotFound`
    pub fn cell(&self, id: usize) -> Result<&VoronoiCell<T>> {
        self.cells.get(id).ok_or(VoronoiError::CellNotFound(id))
    }

    #[inline]
    pub fn cells(&self) -> &[VoronoiCell<T>] {
        &self.cells
    }

    /// Neighbor IDs of a cell
    ///
    /// Returns an empty slice if the cell ID is invalid.
    pub fn get_neighbors(&self, cell_id: usize) -> &[usize] {
        self.cells
            .get(cell_id)
            .map(|c| c.neighbors.as_slice())
            .unwrap_or(&[])
    }

    /// Voronoi vertices in acceptance order
    ///
    /// Frame corners and caps are not included.
    #[inline]
    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices
    }

    /// The closed half-edge mesh, one face per site
    #[inline]
    pub fn dcel(&self) -> &Dcel<T> {
        &self.dcel
    }

    /// The rectangle infinite edges were cut at
    #[inline]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Boundary segments between cells, clipped to the bounding box
    pub fn edges(&self) -> Vec<Edge> {
        let bbox = &self.config.bounding_box;
        let mut edges = Vec::new();

        for (id, h) in self.dcel.half_edges() {
            if id > h.twin {
                continue;
            }
            let (a, b) = match (h.face, self.dcel.face_of(h.twin)) {
                (Some(a), Some(b)) => (a.index(), b.index()),
                _ => continue,
            };
            let (start, end) = match (self.dcel.origin_position(id), self.dcel.origin_position(h.twin)) {
                (Some(start), Some(end)) => (start, end),
                _ => continue,
            };
            if let Some((start, end)) = clip_segment(start, end, bbox) {
                if start.distance(end) > self.tolerance {
                    edges.push(Edge {
                        cells: (a.min(b), a.max(b)),
                        start,
                        end,
                    });
                }
            }
        }

        edges
    }

    /// Find the cell containing a position (requires spatial-index feature)
    ///
    /// Returns the ID of the nearest site, which owns the position.
    #[cfg(feature = "spatial-index")]
    pub fn find_cell_at(&self, position: DVec2) -> usize {
        self.spatial_index.find_nearest(position)
    }

    /// Find cells within a given hop count from a center cell (BFS)
    ///
    /// Returns the IDs in ascending order, including the center cell, or an
    /// empty vec if `center_id` is invalid.
    pub fn find_cells_within_radius(&self, center_id: usize, hops: usize) -> Vec<usize> {
        if center_id >= self.cells.len() {
            return vec![];
        }

        let mut visited = HashSet::new();
        let mut current = vec![center_id];
        visited.insert(center_id);

        for _ in 0..hops {
            let mut next = Vec::new();
            for &cell_id in &current {
                for &neighbor in self.get_neighbors(cell_id) {
                    if visited.insert(neighbor) {
                        next.push(neighbor);
                    }
                }
            }
            current = next;
        }

        let mut found: Vec<usize> = visited.into_iter().collect();
        found.sort_unstable();
        found
    }
}

/// Voronoi vertices of a point set, in the order the sweep accepts them
///
/// # Errors
///
/// Returns `InvalidInput` for an empty, non-finite or duplicated point set.
///
/// # Example
///
/// ```
/// use glam::DVec2;
/// use rust_voronoi_sweep::compute_vertices;
///
/// let points = [DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0), DVec2::new(5.0, 10.0)];
/// let vertices = compute_vertices(&points).unwrap();
/// assert_eq!(vertices.len(), 1);
/// ```
pub fn compute_vertices(points: &[DVec2]) -> Result<Vec<DVec2>> {
    let sites = points.iter().map(|&p| (p, ()));
    Ok(Sweep::new(sites, &DiagramConfig::default())?.run()?.vertices)
}

/// One clipped cell per face of a closed mesh
fn extract_cells<T: Clone>(dcel: &Dcel<T>, bbox: &BoundingBox, tolerance: f64) -> Result<Vec<VoronoiCell<T>>> {
    let mut cells = Vec::with_capacity(dcel.face_count());

    for (id, face) in dcel.faces() {
        let mut neighbors = Vec::new();
        for h in dcel.face_loop(id)? {
            let twin = dcel.twin(h);
            let other = match dcel.face_of(twin) {
                Some(other) if other != id => other,
                _ => continue,
            };
            // coincident vertices of cocircular sites leave zero-length edges
            let length = match (dcel.origin_position(h), dcel.origin_position(twin)) {
                (Some(a), Some(b)) => a.distance(b),
                _ => 0.0,
            };
            if length > tolerance {
                neighbors.push(other.index());
            }
        }
        neighbors.sort_unstable();
        neighbors.dedup();

        let polygon = dcel.face_polygon(id)?;
        let vertices = clip_polygon(&polygon, bbox);

        cells.push(VoronoiCell::new(
            id.index(),
            face.site,
            face.attributes.clone(),
            neighbors,
            vertices,
        ));
    }

    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiagramConfigBuilder;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Team {
        Red,
        Blue,
    }

    fn grid_diagram() -> Diagram<()> {
        let points: Vec<DVec2> = (0..4)
            .flat_map(|i| (0..4).map(move |j| DVec2::new(12.5 + 25.0 * i as f64, 12.5 + 25.0 * j as f64)))
            .collect();
        Diagram::from_points(&points, DiagramConfig::default()).unwrap()
    }

    #[test]
    fn test_triangle_diagram() {
        let sites = vec![
            Site::new(0.0, 0.0, Team::Red),
            Site::new(10.0, 0.0, Team::Blue),
            Site::new(5.0, 10.0, Team::Red),
        ];
        let config = DiagramConfigBuilder::new()
            .bounding_box(BoundingBox::new(-10.0, 20.0, -10.0, 20.0).unwrap())
            .build()
            .unwrap();
        let diagram = Diagram::build(sites, config).unwrap();

        assert_eq!(diagram.vertices().len(), 1);
        assert!((diagram.vertices()[0] - DVec2::new(5.0, 3.75)).length() < 1e-9);
        assert_eq!(diagram.get_cell(1).unwrap().attributes, Team::Blue);
        for cell in diagram.cells() {
            assert_eq!(cell.neighbor_count(), 2);
            assert!(cell.contains(cell.site));
        }
        assert_eq!(diagram.edges().len(), 3);
    }

    #[test]
    fn test_two_sites_split_the_box() {
        let points = [DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0)];
        let config = DiagramConfigBuilder::new()
            .bounding_box(BoundingBox::new(-10.0, 20.0, -10.0, 10.0).unwrap())
            .build()
            .unwrap();
        let diagram = Diagram::from_points(&points, config).unwrap();

        assert!(diagram.vertices().is_empty());
        assert!((diagram.cells()[0].area() - 15.0 * 20.0).abs() < 1e-9);
        assert!((diagram.cells()[1].area() - 15.0 * 20.0).abs() < 1e-9);

        let edges = diagram.edges();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].cells, (0, 1));
        assert!((edges[0].length() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_get_cell() {
        let diagram = grid_diagram();

        assert!(diagram.get_cell(0).is_some());
        assert!(diagram.get_cell(diagram.cell_count()).is_none());
        assert_eq!(diagram.cell(99).unwrap_err(), VoronoiError::CellNotFound(99));
    }

    #[test]
    fn test_grid_neighbors() {
        let diagram = grid_diagram();

        // corner, edge and inner cells of a 4x4 grid; diagonal contacts are points
        assert_eq!(diagram.get_neighbors(0), &[1, 4]);
        assert_eq!(diagram.get_neighbors(1), &[0, 2, 5]);
        assert_eq!(diagram.get_neighbors(5), &[1, 4, 6, 9]);
        for cell in diagram.cells() {
            assert!((cell.area() - 625.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_find_cells_within_radius() {
        let diagram = grid_diagram();

        assert_eq!(diagram.find_cells_within_radius(0, 0), vec![0]);
        assert_eq!(diagram.find_cells_within_radius(0, 1), vec![0, 1, 4]);
        assert_eq!(diagram.find_cells_within_radius(0, 2), vec![0, 1, 2, 4, 5, 8]);
        assert!(diagram.find_cells_within_radius(999, 3).is_empty());
        assert!(diagram.get_neighbors(999).is_empty());
    }

    #[cfg(feature = "spatial-index")]
    #[test]
    fn test_find_cell_at() {
        let diagram = grid_diagram();
        for cell in diagram.cells() {
            assert_eq!(diagram.find_cell_at(cell.site), cell.id);
            assert_eq!(diagram.find_cell_at(cell.centroid()), cell.id);
        }
    }

    #[test]
    fn test_compute_vertices() {
        let points = [
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 10.0),
            DVec2::new(0.0, 10.0),
            DVec2::new(5.0, 20.0),
        ];
        let vertices = compute_vertices(&points).unwrap();
        assert!(!vertices.is_empty());
        assert!(compute_vertices(&[]).is_err());
    }

    #[test]
    fn test_rejects_bad_input() {
        let mut config = DiagramConfig::default();
        config.bounding_box.right = config.bounding_box.left;
        assert!(matches!(
            Diagram::from_points(&[DVec2::ZERO], config),
            Err(VoronoiError::InvalidInput(_))
        ));
        assert!(matches!(
            Diagram::from_points(&[DVec2::ONE, DVec2::ONE], DiagramConfig::default()),
            Err(VoronoiError::InvalidInput(_))
        ));
    }
}
