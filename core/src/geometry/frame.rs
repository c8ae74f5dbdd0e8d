use super::{Geometry, Point};
use crate::error::{Result, ScintiError};

/// Display-pixel extent of the image a lesion was drawn on
///
/// Gestures arrive in display pixels; regions store normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct DisplayFrame {
    pub width: f64,
    pub height: f64,
}

impl DisplayFrame {
    /// Creates a frame, rejecting empty or non-finite extents
    pub fn new(width: f64, height: f64) -> Result<Self> {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return Err(ScintiError::InvalidGeometry(format!(
                "display frame must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self { width, height })
    }

    /// Converts display-pixel geometry into unit-square geometry
    pub fn to_normalized(&self, geometry: &Geometry) -> Geometry {
        geometry.map_points(|p| Point::new(p.x / self.width, p.y / self.height))
    }

    /// Converts unit-square geometry back into display pixels
    pub fn to_display(&self, geometry: &Geometry) -> Geometry {
        geometry.map_points(|p| Point::new(p.x * self.width, p.y * self.height))
    }
}
