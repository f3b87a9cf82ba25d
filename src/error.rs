//! Error types for diagram construction

use std::fmt;

/// Errors that can occur while building or querying a diagram
#[derive(Debug, Clone, PartialEq)]
pub enum VoronoiError {
    /// Input rejected before the sweep starts (no sites, bad coordinates, bad box)
    InvalidInput(String),
    /// Configuration validation failed
    InvalidConfig(String),
    /// Three points are collinear or coincident, so no circumcircle exists
    ///
    /// The sweep recovers from this locally by not creating a circle event.
    DegenerateGeometry,
    /// The event queue was popped while empty
    EmptyQueue,
    /// A beach line operation found no tree to work on
    EmptyBeachLine,
    /// Mesh or beach line links are inconsistent
    BrokenTopology(String),
    /// Requested cell ID does not exist
    CellNotFound(usize),
}

impl fmt::Display for VoronoiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoronoiError::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            VoronoiError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            VoronoiError::DegenerateGeometry => write!(f, "degenerate geometry: points are collinear or coincident"),
            VoronoiError::EmptyQueue => write!(f, "event queue is empty"),
            VoronoiError::EmptyBeachLine => write!(f, "beach line is empty"),
            VoronoiError::BrokenTopology(msg) => write!(f, "broken topology: {}", msg),
            VoronoiError::CellNotFound(id) => write!(f, "cell not found: {}", id),
        }
    }
}

impl std::error::Error for VoronoiError {}

/// Result type alias for voronoi operations
pub type Result<T> = std::result::Result<T, VoronoiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            VoronoiError::InvalidInput("no sites".into()).to_string(),
            "invalid input: no sites"
        );
        assert_eq!(VoronoiError::EmptyQueue.to_string(), "event queue is empty");
        assert_eq!(VoronoiError::CellNotFound(7).to_string(), "cell not found: 7");
    }
}
