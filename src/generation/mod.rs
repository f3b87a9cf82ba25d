//! Site generation
//!
//! Seeded point layouts for building diagrams, plus Lloyd's relaxation to
//! even them out.

mod lloyd;
mod points;
mod spiral;

pub use lloyd::{lloyd_relaxation, lloyd_relaxation_with_options, LloydOptions};
pub use points::random_points;
pub use spiral::spiral_points;
