//! Diagram configuration and builder
//!
//! This module provides the bounding box that clips cells and the numeric
//! settings used by the sweep.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::DVec2;

use crate::error::{Result, VoronoiError};

/// Axis-aligned region the diagram is clipped to
///
/// Follows the viewbox convention of the renderer: `top` is the smaller y
/// and `bottom` the larger one.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Smallest x
    pub left: f64,
    /// Largest x
    pub right: f64,
    /// Smallest y
    pub top: f64,
    /// Largest y
    pub bottom: f64,
}

impl BoundingBox {
    /// Create a bounding box from its four sides
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the width or height is not positive, or a
    /// side is not finite.
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Result<Self> {
        if ![left, right, top, bottom].iter().all(|v| v.is_finite()) {
            return Err(VoronoiError::InvalidInput(format!(
                "bounding box sides must be finite (got {}, {}, {}, {})",
                left, right, top, bottom
            )));
        }
        if right <= left {
            return Err(VoronoiError::InvalidInput(format!(
                "bounding box width must be positive (got {})",
                right - left
            )));
        }
        if bottom <= top {
            return Err(VoronoiError::InvalidInput(format!(
                "bounding box height must be positive (got {})",
                bottom - top
            )));
        }
        Ok(Self { left, right, top, bottom })
    }

    /// Create a bounding box from a viewbox `[x, y, width, height]`
    pub fn from_viewbox(x: f64, y: f64, width: f64, height: f64) -> Result<Self> {
        Self::new(x, x + width, y, y + height)
    }

    /// Corner with the smallest coordinates
    #[inline]
    pub fn min(&self) -> DVec2 {
        DVec2::new(self.left, self.top)
    }

    /// Corner with the largest coordinates
    #[inline]
    pub fn max(&self) -> DVec2 {
        DVec2::new(self.right, self.bottom)
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Area of the box
    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Length of the diagonal
    #[inline]
    pub fn diagonal(&self) -> f64 {
        (self.max() - self.min()).length()
    }

    /// Check whether a point lies inside or on the box
    #[inline]
    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            left: 0.0,
            right: 100.0,
            top: 0.0,
            bottom: 100.0,
        }
    }
}

/// Configuration for building a diagram
///
/// # Example
///
/// ```rust
/// use rust_voronoi_sweep::*;
///
/// let config = DiagramConfigBuilder::new()
///     .bounding_box(BoundingBox::new(-50.0, 50.0, -50.0, 50.0).unwrap())
///     .epsilon(1e-8)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(config.bounding_box.width(), 100.0);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagramConfig {
    /// Region cells are clipped to
    pub bounding_box: BoundingBox,

    /// Relative tolerance for near-coincident events
    ///
    /// Scaled by the magnitude of the input coordinates. Circle events whose
    /// bottom lies within this tolerance of the sweep line are treated as
    /// current rather than past.
    pub epsilon: f64,

    /// Extra room around the bounding box used to cap infinite edges
    ///
    /// Fraction of the larger side of the region spanned by the box, the
    /// sites and the Voronoi vertices.
    pub frame_margin: f64,
}

impl DiagramConfig {
    /// Absolute tolerance for a set of sites
    pub fn tolerance(&self, sites: &[DVec2]) -> f64 {
        let scale = sites
            .iter()
            .fold(1.0_f64, |acc, p| acc.max(p.x.abs()).max(p.y.abs()));
        self.epsilon * scale
    }
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            bounding_box: BoundingBox::default(),
            epsilon: 1e-9,
            frame_margin: 0.25,
        }
    }
}

/// Builder for creating a `DiagramConfig` with validation
#[derive(Debug, Clone)]
pub struct DiagramConfigBuilder {
    bounding_box: BoundingBox,
    epsilon: f64,
    frame_margin: f64,
}

impl DiagramConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - bounding_box: `[0, 100] x [0, 100]`
    /// - epsilon: 1e-9
    /// - frame_margin: 0.25
    pub fn new() -> Self {
        let defaults = DiagramConfig::default();
        Self {
            bounding_box: defaults.bounding_box,
            epsilon: defaults.epsilon,
            frame_margin: defaults.frame_margin,
        }
    }

    /// Set the clipping region
    pub fn bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = bounding_box;
        self
    }

    /// Set the relative numeric tolerance
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if epsilon is negative, not finite, or >= 1e-3
    pub fn epsilon(mut self, epsilon: f64) -> Result<Self> {
        if !epsilon.is_finite() || !(0.0..1e-3).contains(&epsilon) {
            return Err(VoronoiError::InvalidConfig(format!(
                "epsilon must be in [0, 1e-3) (got {})",
                epsilon
            )));
        }
        self.epsilon = epsilon;
        Ok(self)
    }

    /// Set the frame margin
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the margin is not strictly positive and finite
    pub fn frame_margin(mut self, margin: f64) -> Result<Self> {
        if !margin.is_finite() || margin <= 0.0 {
            return Err(VoronoiError::InvalidConfig(format!(
                "frame margin must be positive (got {})",
                margin
            )));
        }
        self.frame_margin = margin;
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<DiagramConfig> {
        Ok(DiagramConfig {
            bounding_box: self.bounding_box,
            epsilon: self.epsilon,
            frame_margin: self.frame_margin,
        })
    }
}

impl Default for DiagramConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
