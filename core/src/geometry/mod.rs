//! Region geometry in normalized image coordinates
//!
//! All geometry stored in regions lives in the unit square `[0,1]×[0,1]`,
//! with the anterior/posterior midline at `x = 0.5`.

mod ellipse;
mod frame;
mod mirror;

pub use ellipse::ellipse_from_axis;
pub use frame::DisplayFrame;

use crate::error::{Result, ScintiError};

/// Coordinate tolerance used when comparing geometries
pub const EPS: f64 = 1e-9;

/// A point in normalized or display coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn approx_eq(&self, other: &Point) -> bool {
        (self.x - other.x).abs() <= EPS && (self.y - other.y).abs() <= EPS
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new(0.5 * (self.x + other.x), 0.5 * (self.y + other.y))
    }
}

/// Shape of a region
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(tag = "kind", rename_all = "lowercase"))]
pub enum Geometry {
    Point { at: Point },
    Segment { start: Point, end: Point },
    Polygon { vertices: Vec<Point> },
}

impl Geometry {
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point {
            at: Point::new(x, y),
        }
    }

    pub fn segment(start: Point, end: Point) -> Self {
        Geometry::Segment { start, end }
    }

    pub fn polygon(vertices: Vec<Point>) -> Self {
        Geometry::Polygon { vertices }
    }

    /// Returns the kind name for logging
    pub fn kind_name(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "point",
            Geometry::Segment { .. } => "segment",
            Geometry::Polygon { .. } => "polygon",
        }
    }

    /// Iterates over every vertex of the geometry
    pub fn vertices(&self) -> Box<dyn Iterator<Item = &Point> + '_> {
        match self {
            Geometry::Point { at } => Box::new(std::iter::once(at)),
            Geometry::Segment { start, end } => Box::new([start, end].into_iter()),
            Geometry::Polygon { vertices } => Box::new(vertices.iter()),
        }
    }

    /// Applies `f` to every vertex
    pub fn map_points<F>(&self, mut f: F) -> Geometry
    where
        F: FnMut(&Point) -> Point,
    {
        match self {
            Geometry::Point { at } => Geometry::Point { at: f(at) },
            Geometry::Segment { start, end } => Geometry::Segment {
                start: f(start),
                end: f(end),
            },
            Geometry::Polygon { vertices } => Geometry::Polygon {
                vertices: vertices.iter().map(f).collect(),
            },
        }
    }

    /// Checks that the geometry can be stored in a region
    ///
    /// # Errors
    ///
    /// Returns an error for non-finite coordinates or a polygon with fewer
    /// than three vertices.
    pub fn validate(&self) -> Result<()> {
        if let Some(bad) = self.vertices().find(|p| !p.is_finite()) {
            return Err(ScintiError::InvalidGeometry(format!(
                "non-finite coordinate ({}, {}) in {}",
                bad.x,
                bad.y,
                self.kind_name()
            )));
        }
        if let Geometry::Polygon { vertices } = self {
            if vertices.len() < 3 {
                return Err(ScintiError::InvalidGeometry(format!(
                    "polygon needs at least 3 vertices, got {}",
                    vertices.len()
                )));
            }
        }
        Ok(())
    }

    /// Compares two geometries vertex by vertex within [`EPS`]
    pub fn approx_eq(&self, other: &Geometry) -> bool {
        match (self, other) {
            (Geometry::Point { at: a }, Geometry::Point { at: b }) => a.approx_eq(b),
            (
                Geometry::Segment { start: s1, end: e1 },
                Geometry::Segment { start: s2, end: e2 },
            ) => s1.approx_eq(s2) && e1.approx_eq(e2),
            (Geometry::Polygon { vertices: v1 }, Geometry::Polygon { vertices: v2 }) => {
                v1.len() == v2.len() && v1.iter().zip(v2).all(|(a, b)| a.approx_eq(b))
            }
            _ => false,
        }
    }

    /// Returns the centroid of the vertices
    pub fn center(&self) -> Point {
        let (mut sx, mut sy, mut n) = (0.0, 0.0, 0.0);
        for p in self.vertices() {
            sx += p.x;
            sy += p.y;
            n += 1.0;
        }
        if n == 0.0 {
            Point::default()
        } else {
            Point::new(sx / n, sy / n)
        }
    }
}
