use super::{Geometry, Point};

impl Point {
    /// Reflects the point across the vertical midline (`x → 1 - x`)
    pub fn mirrored(&self) -> Point {
        Point::new(1.0 - self.x, self.y)
    }
}

impl Geometry {
    /// Returns the left-right mirror image across `x = 0.5`
    ///
    /// Points and segments reflect vertex by vertex. Polygons are translated
    /// by (-1, 0) and then flipped with a (-1, 1) scale, the same operations
    /// the host applies to freehand regions; the composition is `x → 1 - x`.
    pub fn mirrored(&self) -> Geometry {
        match self {
            Geometry::Point { at } => Geometry::Point { at: at.mirrored() },
            Geometry::Segment { start, end } => Geometry::Segment {
                start: start.mirrored(),
                end: end.mirrored(),
            },
            Geometry::Polygon { .. } => self.displace(-1.0, 0.0).scale(-1.0, 1.0),
        }
    }

    /// Translates every vertex by (dx, dy)
    pub fn displace(&self, dx: f64, dy: f64) -> Geometry {
        self.map_points(|p| Point::new(p.x + dx, p.y + dy))
    }

    /// Scales every vertex about the origin
    pub fn scale(&self, sx: f64, sy: f64) -> Geometry {
        self.map_points(|p| Point::new(p.x * sx, p.y * sy))
    }

    /// Returns whether `other` is the mirror image of this geometry
    pub fn is_mirror_of(&self, other: &Geometry) -> bool {
        self.mirrored().approx_eq(other)
    }
}
