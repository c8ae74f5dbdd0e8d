use crate::geometry::Geometry;
use std::fmt;

/// Side of the body a zone belongs to
///
/// Zones on the midline (spine, sternum, skull) carry no laterality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum Laterality {
    None,
    Left,
    Right,
}

impl Laterality {
    /// Returns whether this is a unilateral (left or right) laterality
    pub fn is_unilateral(&self) -> bool {
        matches!(self, Laterality::Left | Laterality::Right)
    }

    /// Returns the opposite laterality
    ///
    /// Mirroring a lesion across the midline swaps its side.
    pub fn opposite(&self) -> Self {
        match self {
            Laterality::Left => Laterality::Right,
            Laterality::Right => Laterality::Left,
            Laterality::None => Laterality::None,
        }
    }

    /// Returns the suffix used in zone labels ("L", "R" or "")
    pub fn suffix(&self) -> &'static str {
        match self {
            Laterality::Left => "L",
            Laterality::Right => "R",
            Laterality::None => "",
        }
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            Laterality::Left => "left",
            Laterality::Right => "right",
            Laterality::None => "none",
        }
    }
}

impl fmt::Display for Laterality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Drawing style chosen for a new lesion
///
/// `Circle` and `Ellipse` are drawn as a line (the long axis) and get an
/// auxiliary polygon overlay generated from that axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum LesionStyle {
    #[default]
    Point,
    Line,
    Circle,
    Ellipse,
    Freehand,
}

impl LesionStyle {
    /// Plain style matching a geometry kind
    pub fn for_geometry(geometry: &Geometry) -> Self {
        match geometry {
            Geometry::Point { .. } => LesionStyle::Point,
            Geometry::Segment { .. } => LesionStyle::Line,
            Geometry::Polygon { .. } => LesionStyle::Freehand,
        }
    }

    /// Returns whether lesions of this style carry an overlay region
    pub fn has_overlay(&self) -> bool {
        matches!(self, LesionStyle::Circle | LesionStyle::Ellipse)
    }

    /// Ratio between the overlay's minor and major axes
    ///
    /// Circles ignore the configured ratio.
    pub fn minor_ratio(&self, configured: f64) -> f64 {
        match self {
            LesionStyle::Circle => 1.0,
            _ => configured,
        }
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            LesionStyle::Point => "point",
            LesionStyle::Line => "line",
            LesionStyle::Circle => "circle",
            LesionStyle::Ellipse => "ellipse",
            LesionStyle::Freehand => "freehand",
        }
    }

    /// Parses lesion style from string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "point" | "dot" => Some(LesionStyle::Point),
            "line" | "segment" => Some(LesionStyle::Line),
            "circle" => Some(LesionStyle::Circle),
            "ellipse" | "oval" => Some(LesionStyle::Ellipse),
            "freehand" | "polygon" => Some(LesionStyle::Freehand),
            _ => None,
        }
    }
}

impl fmt::Display for LesionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Result of the style-selection dialog shown before placing a lesion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct StyleChoice {
    /// Lesion involves more than half of its zone
    pub score3: bool,
    pub style: LesionStyle,
}

impl StyleChoice {
    pub fn new(style: LesionStyle, score3: bool) -> Self {
        Self { score3, style }
    }

    /// Plain style for `geometry`, no overlay
    pub fn plain(geometry: &Geometry, score3: bool) -> Self {
        Self::new(LesionStyle::for_geometry(geometry), score3)
    }
}
