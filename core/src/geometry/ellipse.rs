use super::{Geometry, Point, EPS};
use crate::error::{Result, ScintiError};
use std::f64::consts::TAU;

/// Builds the closed overlay polygon for an ellipse whose long axis is `start → end`
///
/// The minor axis is `minor_ratio` times the major axis; a ratio of 1.0
/// yields a circle. Vertices run counter-clockwise starting at `end`.
///
/// # Errors
///
/// Returns an error if the axis has zero length, the ratio is not
/// positive, or fewer than 8 vertices are requested.
pub fn ellipse_from_axis(
    start: &Point,
    end: &Point,
    minor_ratio: f64,
    vertices: usize,
) -> Result<Geometry> {
    let length = start.distance(end);
    if length <= EPS {
        return Err(ScintiError::InvalidGeometry(
            "ellipse axis has zero length".to_string(),
        ));
    }
    if !(minor_ratio > 0.0 && minor_ratio.is_finite()) {
        return Err(ScintiError::InvalidGeometry(format!(
            "ellipse minor ratio must be positive, got {}",
            minor_ratio
        )));
    }
    if vertices < 8 {
        return Err(ScintiError::InvalidGeometry(format!(
            "ellipse needs at least 8 vertices, got {}",
            vertices
        )));
    }

    let center = start.midpoint(end);
    let a = 0.5 * length;
    let b = a * minor_ratio;
    let angle = (end.y - start.y).atan2(end.x - start.x);
    let (sin, cos) = angle.sin_cos();

    let points = (0..vertices)
        .map(|i| {
            let t = TAU * i as f64 / vertices as f64;
            let (lx, ly) = (a * t.cos(), b * t.sin());
            Point::new(center.x + lx * cos - ly * sin, center.y + lx * sin + ly * cos)
        })
        .collect();

    Ok(Geometry::polygon(points))
}
