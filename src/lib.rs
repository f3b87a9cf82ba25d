//! Bounded planar Voronoi diagrams via Fortune's sweep
//!
//! A standalone library for partitioning a rectangle into the regions owned
//! by a set of sites, suitable for territory maps, procedural levels and
//! nearest-site lookups in any game engine (Bevy, Godot, etc.)
//!
//! # Quick Start
//!
//! ```rust
//! use rust_voronoi_sweep::*;
//!
//! // Spread some sites over the default 100 x 100 box
//! let config = DiagramConfigBuilder::new()
//!     .bounding_box(BoundingBox::from_viewbox(0.0, 0.0, 100.0, 100.0).unwrap())
//!     .build()
//!     .unwrap();
//! let points = random_points(50, &config.bounding_box, 42);
//! let points = lloyd_relaxation(points, &config.bounding_box, 3).unwrap();
//!
//! // Tag each site with an owner and build the diagram
//! let sites = points
//!     .iter()
//!     .enumerate()
//!     .map(|(i, p)| Site::new(p.x, p.y, Some(i % 4)));
//! let diagram = Diagram::build(sites, config).unwrap();
//!
//! // Generate mesh for rendering
//! let mesh = generate_mesh(&diagram, &PaletteColorMapper::default());
//! println!("Generated {} triangles", mesh.triangle_count());
//! ```
//!
//! # Layers
//!
//! - [`fortune`]: the sweep itself, producing Voronoi vertices and a half-edge mesh
//! - [`frame`]: caps infinite edges so every face becomes a closed loop
//! - [`Diagram`]: clipped cells, neighbors and queries
//! - [`mesh`]: triangle buffers for rendering
//!
//! # Features
//!
//! - `spatial-index` (default): Enables O(log n) position-to-cell lookups using KD-tree
//! - `serde`: Enables serialization support for configuration, cells and meshes

// Modules
pub mod error;
pub mod config;
pub mod geometry;
pub mod dcel;
pub mod fortune;
pub mod frame;
pub mod cell;
pub mod diagram;
pub mod generation;
pub mod mesh;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{VoronoiError, Result};
pub use config::{BoundingBox, DiagramConfig, DiagramConfigBuilder};
pub use dcel::{Dcel, FaceId, HalfEdgeId, TwinSide, VertexId};
pub use fortune::{Sweep, SweepOutput, SweepState};
pub use frame::Frame;
pub use cell::VoronoiCell;
pub use diagram::{compute_vertices, Diagram, Edge, Site};
pub use mesh::{
    generate_mesh, generate_mesh_with_options, generate_mesh_with_visibility, ColorMapper, MeshData, MeshOptions,
    PaletteColorMapper, RegionColor, UniformColorMapper,
};
pub use generation::{lloyd_relaxation, lloyd_relaxation_with_options, random_points, spiral_points, LloydOptions};

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;

// Re-export glam::DVec2 for convenience
pub use glam::DVec2;
