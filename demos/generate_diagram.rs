//! Complete workflow demonstration for rust_voronoi_sweep

use rust_voronoi_sweep::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Owner {
    Neutral,
    Player(usize),
}

fn main() -> Result<()> {
    println!("=== rust_voronoi_sweep Demo ===\n");

    // Step 1: Configure the region
    println!("Step 1: Configuring diagram...");
    let config = DiagramConfigBuilder::new()
        .bounding_box(BoundingBox::from_viewbox(0.0, 0.0, 800.0, 600.0)?)
        .frame_margin(0.25)?
        .build()?;
    let bbox = config.bounding_box;
    println!("  Box: {} x {}", bbox.width(), bbox.height());

    // Step 2: Lay out and relax the sites
    println!("\nStep 2: Generating sites...");
    let points = random_points(300, &bbox, 12345);
    let points = lloyd_relaxation(points, &bbox, 5)?;
    println!("  {} sites after relaxation", points.len());

    // Step 3: Build the diagram
    println!("\nStep 3: Building diagram...");
    let sites = points.iter().enumerate().map(|(i, p)| {
        let owner = if i % 5 == 0 { Owner::Neutral } else { Owner::Player(i % 3) };
        Site::new(p.x, p.y, owner)
    });
    let diagram = Diagram::build(sites, config)?;

    let total_neighbors: usize = diagram.cells().iter().map(|c| c.neighbor_count()).sum();
    println!("  Cells: {}", diagram.cell_count());
    println!("  Voronoi vertices: {}", diagram.vertices().len());
    println!("  Boundary edges: {}", diagram.edges().len());
    println!(
        "  Average neighbors per cell: {:.2}",
        total_neighbors as f64 / diagram.cell_count() as f64
    );

    // Step 4: Queries
    println!("\nStep 4: Queries:");
    #[cfg(feature = "spatial-index")]
    {
        let click = DVec2::new(400.0, 300.0);
        let cell = diagram.cell(diagram.find_cell_at(click))?;
        println!("  Position {} -> Cell {} ({:?})", click, cell.id, cell.attributes);
    }
    let reach = diagram.find_cells_within_radius(0, 2);
    println!("  Cells within 2 hops of cell 0: {}", reach.len());

    // Step 5: Generate mesh
    println!("\nStep 5: Generating mesh...");
    let color = |owner: &Owner| -> RegionColor {
        match owner {
            Owner::Neutral => [0.35, 0.35, 0.35, 1.0],
            Owner::Player(0) => [0.89, 0.29, 0.20, 1.0],
            Owner::Player(1) => [0.22, 0.49, 0.72, 1.0],
            Owner::Player(_) => [0.30, 0.69, 0.29, 1.0],
        }
    };
    let options = MeshOptions {
        inset: 0.05,
        edge_midpoints: true,
    };
    let mesh = generate_mesh_with_options(&diagram, &color, &options);
    println!("  Vertices: {}", mesh.vertex_count());
    println!("  Triangles: {}", mesh.triangle_count());

    // Memory estimate
    let mem = (mesh.positions.len() * 8 + mesh.colors.len() * 16 + mesh.cell_ids.len() * 4 + mesh.indices.len() * 4)
        as f64
        / 1024.0;
    println!("  Memory: {:.1} KB", mem);

    println!("\n=== Demo Complete ===");
    Ok(())
}
