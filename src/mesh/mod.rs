//! Mesh generation for Voronoi diagrams
//!
//! Generates engine-agnostic vertex buffers from the cells of a diagram.

mod colors;

pub use colors::{ColorMapper, PaletteColorMapper, RegionColor, UniformColorMapper};

use std::collections::HashSet;

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::diagram::Diagram;

/// Engine-agnostic mesh data output
///
/// Contains raw vertex data suitable for any rendering engine:
/// - WebGL / wgpu: upload directly as vertex and index buffers
/// - Bevy: convert to a `Mesh` with custom attributes
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    /// Vertex positions (2D coordinates)
    pub positions: Vec<[f32; 2]>,
    /// Vertex colors (RGBA)
    pub colors: Vec<[f32; 4]>,
    /// Owning cell of each vertex; `-1` on the rim so a shader can fade
    /// between the site and the boundary
    pub cell_ids: Vec<i32>,
    /// Triangle indices
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Shape of the generated triangle fans
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshOptions {
    /// Fraction of the way each rim vertex is pulled toward its site,
    /// leaving gaps between neighboring regions (clamped to `[0, 1)`)
    pub inset: f64,
    /// Add a rim vertex halfway along every boundary edge
    pub edge_midpoints: bool,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            inset: 0.0,
            edge_midpoints: false,
        }
    }
}

/// Generate mesh from diagram with color mapping
///
/// Each cell is triangulated as a fan from its site to its clipped boundary.
/// All vertices of a cell get the same color.
pub fn generate_mesh<T, C>(diagram: &Diagram<T>, color_mapper: &C) -> MeshData
where
    T: Clone,
    C: ColorMapper<T>,
{
    generate_mesh_with_options(diagram, color_mapper, &MeshOptions::default())
}

/// Generate mesh with custom fan options
pub fn generate_mesh_with_options<T, C>(diagram: &Diagram<T>, color_mapper: &C, options: &MeshOptions) -> MeshData
where
    T: Clone,
    C: ColorMapper<T>,
{
    build_mesh(diagram, color_mapper, None, [0.0, 0.0, 0.0, 1.0], options)
}

/// Generate mesh with fog of war support
///
/// # Arguments
/// * `diagram` - The diagram to generate a mesh for
/// * `color_mapper` - Maps site attributes to colors
/// * `visible_cells` - Optional slice of visible cell IDs. If None, all cells are visible.
/// * `hidden_color` - Color for hidden cells (typically black)
pub fn generate_mesh_with_visibility<T, C>(
    diagram: &Diagram<T>,
    color_mapper: &C,
    visible_cells: Option<&[usize]>,
    hidden_color: RegionColor,
) -> MeshData
where
    T: Clone,
    C: ColorMapper<T>,
{
    build_mesh(diagram, color_mapper, visible_cells, hidden_color, &MeshOptions::default())
}

fn build_mesh<T, C>(
    diagram: &Diagram<T>,
    color_mapper: &C,
    visible_cells: Option<&[usize]>,
    hidden_color: RegionColor,
    options: &MeshOptions,
) -> MeshData
where
    T: Clone,
    C: ColorMapper<T>,
{
    let mut mesh = MeshData::default();

    let visible_set: Option<HashSet<usize>> = visible_cells.map(|cells| cells.iter().copied().collect());

    for cell in diagram.cells() {
        // Cells outside the bounding box have nothing to draw
        if cell.is_empty() {
            continue;
        }

        let is_visible = visible_set
            .as_ref()
            .map(|set| set.contains(&cell.id))
            .unwrap_or(true);

        let color = if is_visible {
            color_mapper.map_color(&cell.attributes)
        } else {
            hidden_color
        };

        let rim = rim_points(cell.site, &cell.vertices, diagram.tolerance(), options);
        if rim.len() < 3 {
            continue;
        }
        triangulate_cell(cell.id, cell.site, &rim, color, &mut mesh);
    }

    log::debug!(
        "generated mesh: {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    mesh
}

/// Boundary of a fan, with optional midpoints, pulled toward the site
///
/// Boundary points closer than `tolerance` to the previous one are merged
/// first, so no rim segment has zero length.
fn rim_points(site: DVec2, vertices: &[DVec2], tolerance: f64, options: &MeshOptions) -> Vec<DVec2> {
    let keep = 1.0 - options.inset.clamp(0.0, 1.0 - f64::EPSILON);

    let mut corners: Vec<DVec2> = Vec::with_capacity(vertices.len());
    for &vertex in vertices {
        if corners.last().map_or(true, |last| last.distance(vertex) > tolerance) {
            corners.push(vertex);
        }
    }
    while corners.len() > 1 && corners[0].distance(corners[corners.len() - 1]) <= tolerance {
        corners.pop();
    }

    let mut rim = Vec::with_capacity(corners.len() * 2);
    for (i, &vertex) in corners.iter().enumerate() {
        rim.push(vertex);
        if options.edge_midpoints {
            let next = corners[(i + 1) % corners.len()];
            rim.push((vertex + next) / 2.0);
        }
    }

    for point in &mut rim {
        *point = site + (*point - site) * keep;
    }
    rim
}

/// Triangulate a single cell as a triangle fan
fn triangulate_cell(id: usize, site: DVec2, rim: &[DVec2], color: RegionColor, mesh: &mut MeshData) {
    let base_idx = mesh.positions.len() as u32;

    // Center vertex carries the owning cell
    mesh.positions.push([site.x as f32, site.y as f32]);
    mesh.colors.push(color);
    mesh.cell_ids.push(id as i32);

    for point in rim {
        mesh.positions.push([point.x as f32, point.y as f32]);
        mesh.colors.push(color);
        mesh.cell_ids.push(-1);
    }

    let count = rim.len();
    for i in 0..count {
        let next_i = (i + 1) % count;
        mesh.indices.push(base_idx);
        mesh.indices.push(base_idx + 1 + i as u32);
        mesh.indices.push(base_idx + 1 + next_i as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiagramConfig;
    use crate::diagram::Site;
    use crate::generation::random_points;

    fn owned_diagram() -> Diagram<Option<usize>> {
        let bbox = DiagramConfig::default().bounding_box;
        let sites = random_points(40, &bbox, 42)
            .into_iter()
            .enumerate()
            .map(|(i, p)| Site {
                position: p,
                attributes: if i % 3 == 0 { None } else { Some(i % 4) },
            });
        Diagram::build(sites, DiagramConfig::default()).unwrap()
    }

    #[test]
    fn test_generate_mesh() {
        let diagram = owned_diagram();
        let mesh = generate_mesh(&diagram, &PaletteColorMapper::default());

        assert!(!mesh.is_empty());
        assert_eq!(mesh.positions.len(), mesh.colors.len());
        assert_eq!(mesh.positions.len(), mesh.cell_ids.len());
        assert_eq!(mesh.indices.len() % 3, 0);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));

        // one center per cell, the rest rim
        let centers = mesh.cell_ids.iter().filter(|&&id| id >= 0).count();
        assert_eq!(centers, diagram.cell_count());

        let rim_total: usize = diagram.cells().iter().map(|c| c.vertex_count()).sum();
        assert_eq!(mesh.triangle_count(), rim_total);
    }

    #[test]
    fn test_mesh_with_fog_of_war() {
        let diagram = owned_diagram();
        let hidden = [0.0, 0.0, 0.0, 1.0];

        let visible: Vec<usize> = (0..10).collect();
        let mesh = generate_mesh_with_visibility(&diagram, &UniformColorMapper([1.0; 4]), Some(&visible), hidden);

        let lit = mesh.colors.iter().filter(|&&c| c == [1.0; 4]).count();
        let dark = mesh.colors.iter().filter(|&&c| c == hidden).count();
        assert!(lit > 0);
        assert!(dark > lit);
        assert_eq!(lit + dark, mesh.vertex_count());
    }

    #[test]
    fn test_inset_and_midpoints() {
        let points = [DVec2::new(25.0, 50.0), DVec2::new(75.0, 50.0)];
        let diagram = Diagram::from_points(&points, DiagramConfig::default()).unwrap();
        let options = MeshOptions {
            inset: 0.5,
            edge_midpoints: true,
        };
        let mesh = generate_mesh_with_options(&diagram, &UniformColorMapper::default(), &options);

        // two rectangles, four corners and four midpoints each
        assert_eq!(mesh.vertex_count(), 2 * (1 + 8));
        assert_eq!(mesh.triangle_count(), 16);

        // the left cell spans [0, 50] x [0, 100]; halfway to its site
        let left_rim = &mesh.positions[1..9];
        for p in left_rim {
            assert!(p[0] >= 12.5 - 1e-4 && p[0] <= 37.5 + 1e-4);
            assert!(p[1] >= 25.0 - 1e-4 && p[1] <= 75.0 + 1e-4);
        }
    }

    #[test]
    fn test_cocircular_sites_have_no_degenerate_triangles() {
        // all four cells meet at (50, 50)
        let points = [
            DVec2::new(25.0, 25.0),
            DVec2::new(75.0, 25.0),
            DVec2::new(75.0, 75.0),
            DVec2::new(25.0, 75.0),
        ];
        let diagram = Diagram::from_points(&points, DiagramConfig::default()).unwrap();
        let mesh = generate_mesh(&diagram, &UniformColorMapper::default());

        assert_eq!(mesh.triangle_count(), 16);
        for triangle in mesh.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|k| {
                let p = mesh.positions[triangle[k] as usize];
                DVec2::new(p[0] as f64, p[1] as f64)
            });
            assert!((b - a).perp_dot(c - a).abs() > 1.0);
        }
    }

    #[test]
    fn test_rim_merges_close_points() {
        let site = DVec2::new(1.0, 1.0);
        let square = [
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(2.0, 2.0),
            DVec2::new(2.0, 2.0 + 1e-12),
            DVec2::new(0.0, 2.0),
            DVec2::new(1e-12, 0.0),
        ];
        let rim = rim_points(site, &square, 1e-9, &MeshOptions::default());
        assert_eq!(rim.len(), 4);

        let with_midpoints = MeshOptions {
            inset: 0.0,
            edge_midpoints: true,
        };
        assert_eq!(rim_points(site, &square, 1e-9, &with_midpoints).len(), 8);
    }

    #[test]
    fn test_mesh_consistency() {
        let diagram = owned_diagram();
        let mapper = PaletteColorMapper::default();

        let mesh1 = generate_mesh(&diagram, &mapper);
        let mesh2 = generate_mesh(&diagram, &mapper);

        assert_eq!(mesh1.positions, mesh2.positions);
        assert_eq!(mesh1.indices, mesh2.indices);
    }
}
