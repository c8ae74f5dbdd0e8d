use super::Laterality;
use crate::error::{Result, ScintiError};
use log::warn;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Attribute value written for lesions without a zone
pub const UNASSIGNED: &str = "unassigned";

/// Anatomic zone taxonomy for whole-body scintigraphy
///
/// Zones 3, 5, 6, 7, 8 and 9 are bilateral; 1, 2, 4 and 10 sit on the
/// midline. Zone 10 is reserved for soft-tissue lesions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(into = "String"))]
pub enum Zone {
    Z1,
    Z2,
    Z3L,
    Z3R,
    Z4,
    Z5L,
    Z5R,
    Z6L,
    Z6R,
    Z7L,
    Z7R,
    Z8L,
    Z8R,
    Z9L,
    Z9R,
    Z10,
}

/// Every zone in taxonomy order
pub const ALL_ZONES: [Zone; 16] = [
    Zone::Z1,
    Zone::Z2,
    Zone::Z3L,
    Zone::Z3R,
    Zone::Z4,
    Zone::Z5L,
    Zone::Z5R,
    Zone::Z6L,
    Zone::Z6R,
    Zone::Z7L,
    Zone::Z7R,
    Zone::Z8L,
    Zone::Z8R,
    Zone::Z9L,
    Zone::Z9R,
    Zone::Z10,
];

impl Zone {
    /// Zone used for soft-tissue lesions
    pub const SOFT_TISSUE: Zone = Zone::Z10;

    /// Returns the label written to the `zone` attribute
    pub fn label(&self) -> &'static str {
        match self {
            Zone::Z1 => "1",
            Zone::Z2 => "2",
            Zone::Z3L => "3L",
            Zone::Z3R => "3R",
            Zone::Z4 => "4",
            Zone::Z5L => "5L",
            Zone::Z5R => "5R",
            Zone::Z6L => "6L",
            Zone::Z6R => "6R",
            Zone::Z7L => "7L",
            Zone::Z7R => "7R",
            Zone::Z8L => "8L",
            Zone::Z8R => "8R",
            Zone::Z9L => "9L",
            Zone::Z9R => "9R",
            Zone::Z10 => "10",
        }
    }

    /// Parses a zone label ("3L", "4", " 7r ")
    pub fn parse(s: &str) -> Result<Self> {
        let normalized = s.trim().to_uppercase();
        ALL_ZONES
            .iter()
            .copied()
            .find(|zone| zone.label() == normalized)
            .ok_or_else(|| ScintiError::InvalidZone(s.to_string()))
    }

    /// Parses a zone label, dropping a side suffix on a midline zone
    ///
    /// "4R" resolves to zone 4. Side suffixes on zones that have no sides
    /// are logged and ignored; anything else must be a valid label.
    pub fn parse_lenient(s: &str) -> Result<Self> {
        if let Ok(zone) = Zone::parse(s) {
            return Ok(zone);
        }
        let trimmed = s.trim();
        let general = GeneralZone::from_label(trimmed)
            .filter(|general| !general.is_bilateral())
            .ok_or_else(|| ScintiError::InvalidZone(s.to_string()))?;
        let suffix = trimmed.trim_start_matches(|c: char| c.is_ascii_digit());
        if !matches!(suffix, "L" | "R" | "l" | "r") {
            return Err(ScintiError::InvalidZone(s.to_string()));
        }
        warn!("Zone {} has no sides, ignoring suffix of {:?}", general, s);
        Zone::parse(&general.label())
    }

    /// Returns the zone with laterality stripped
    pub fn general(&self) -> GeneralZone {
        // Labels always start with their digit run
        GeneralZone::from_label(self.label()).unwrap_or(GeneralZone(0))
    }

    /// Returns the side this zone belongs to
    pub fn laterality(&self) -> Laterality {
        if self.label().ends_with('L') {
            Laterality::Left
        } else if self.label().ends_with('R') {
            Laterality::Right
        } else {
            Laterality::None
        }
    }

    /// Returns the zone on the other side of the midline
    ///
    /// Midline zones map to themselves.
    pub fn contralateral(&self) -> Zone {
        let general = self.general();
        let wanted = self.laterality().opposite();
        ALL_ZONES
            .iter()
            .copied()
            .find(|zone| zone.general() == general && zone.laterality() == wanted)
            .unwrap_or(*self)
    }

    /// Returns whether this is the soft-tissue zone
    pub fn is_soft_tissue(&self) -> bool {
        *self == Zone::SOFT_TISSUE
    }
}

impl From<Zone> for String {
    fn from(zone: Zone) -> Self {
        zone.label().to_string()
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Zone number with laterality stripped (3L and 3R both map to 3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(transparent))]
pub struct GeneralZone(u8);

impl GeneralZone {
    /// Extracts the leading digit run of a zone label
    pub fn from_label(s: &str) -> Option<Self> {
        static REGEX: OnceLock<Regex> = OnceLock::new();
        let re = REGEX.get_or_init(|| Regex::new(r"^\s*(\d+)").expect("Failed to compile regex"));

        re.captures(s)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u8>().ok())
            .filter(|n| (1..=10).contains(n))
            .map(GeneralZone)
    }

    /// Returns the numeric zone
    pub fn number(&self) -> u8 {
        self.0
    }

    /// Returns the label written to the `generalzone` attribute
    pub fn label(&self) -> String {
        self.0.to_string()
    }

    /// Returns whether this general zone has left and right variants
    pub fn is_bilateral(&self) -> bool {
        ALL_ZONES
            .iter()
            .any(|zone| zone.general() == *self && zone.laterality().is_unilateral())
    }
}

impl fmt::Display for GeneralZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Zone state of a lesion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ZoneAssignment {
    #[default]
    Unassigned,
    Assigned(Zone),
}

impl ZoneAssignment {
    /// Parses the `zone` attribute value
    pub fn parse(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case(UNASSIGNED) {
            Ok(ZoneAssignment::Unassigned)
        } else {
            Zone::parse(s).map(ZoneAssignment::Assigned)
        }
    }

    /// Returns the assigned zone, if any
    pub fn zone(&self) -> Option<Zone> {
        match self {
            ZoneAssignment::Assigned(zone) => Some(*zone),
            ZoneAssignment::Unassigned => None,
        }
    }

    /// Value for the `zone` attribute
    pub fn zone_attr(&self) -> String {
        match self {
            ZoneAssignment::Assigned(zone) => zone.label().to_string(),
            ZoneAssignment::Unassigned => UNASSIGNED.to_string(),
        }
    }

    /// Value for the `generalzone` attribute
    pub fn general_attr(&self) -> String {
        match self {
            ZoneAssignment::Assigned(zone) => zone.general().label(),
            ZoneAssignment::Unassigned => UNASSIGNED.to_string(),
        }
    }

    pub fn is_soft_tissue(&self) -> bool {
        matches!(self, ZoneAssignment::Assigned(zone) if zone.is_soft_tissue())
    }
}

impl From<Zone> for ZoneAssignment {
    fn from(zone: Zone) -> Self {
        ZoneAssignment::Assigned(zone)
    }
}

impl fmt::Display for ZoneAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.zone_attr())
    }
}
