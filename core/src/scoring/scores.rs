use crate::types::{GeneralZone, Zone, ALL_ZONES};
use std::collections::BTreeMap;
use std::fmt;

/// Severity of one zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(into = "u8"))]
pub enum ZoneScore {
    /// No lesion in the zone
    #[default]
    None,
    /// One or more lesions, none extensive
    Present,
    /// Not produced by the current scoring rule
    Reserved,
    /// At least one lesion involving more than half of the zone
    Extensive,
}

impl ZoneScore {
    pub fn value(&self) -> u8 {
        match self {
            ZoneScore::None => 0,
            ZoneScore::Present => 1,
            ZoneScore::Reserved => 2,
            ZoneScore::Extensive => 3,
        }
    }

    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(ZoneScore::None),
            1 => Some(ZoneScore::Present),
            2 => Some(ZoneScore::Reserved),
            3 => Some(ZoneScore::Extensive),
            _ => None,
        }
    }
}

impl From<ZoneScore> for u8 {
    fn from(score: ZoneScore) -> Self {
        score.value()
    }
}

impl fmt::Display for ZoneScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Scores for every zone of one case
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ZoneScores {
    zones: BTreeMap<Zone, ZoneScore>,
    general: BTreeMap<GeneralZone, ZoneScore>,
    counts: BTreeMap<Zone, usize>,
    unassigned: usize,
}

impl ZoneScores {
    /// Every zone at 0
    pub fn empty() -> Self {
        let zones = ALL_ZONES.iter().map(|z| (*z, ZoneScore::None)).collect();
        let general = ALL_ZONES
            .iter()
            .map(|z| (z.general(), ZoneScore::None))
            .collect();
        let counts = ALL_ZONES.iter().map(|z| (*z, 0)).collect();
        Self {
            zones,
            general,
            counts,
            unassigned: 0,
        }
    }

    /// Records one lesion in `zone`; scores only ever go up
    pub(crate) fn raise(&mut self, zone: Zone, level: ZoneScore) {
        let slot = self.zones.entry(zone).or_default();
        *slot = (*slot).max(level);
        let general = self.general.entry(zone.general()).or_default();
        *general = (*general).max(level);
        *self.counts.entry(zone).or_default() += 1;
    }

    pub(crate) fn count_unassigned(&mut self) {
        self.unassigned += 1;
    }

    pub fn zone(&self, zone: Zone) -> ZoneScore {
        self.zones.get(&zone).copied().unwrap_or_default()
    }

    pub fn general(&self, zone: GeneralZone) -> ZoneScore {
        self.general.get(&zone).copied().unwrap_or_default()
    }

    /// Looks up a score by label: a zone ("5L", "4") or a general zone ("5")
    pub fn score(&self, label: &str) -> Option<u8> {
        if let Ok(zone) = Zone::parse(label) {
            return Some(self.zone(zone).value());
        }
        let trimmed = label.trim();
        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            return GeneralZone::from_label(trimmed).map(|g| self.general(g).value());
        }
        None
    }

    /// Number of lesions assigned to `zone`
    pub fn lesion_count(&self, zone: Zone) -> usize {
        self.counts.get(&zone).copied().unwrap_or(0)
    }

    /// Number of lesions without a zone
    pub fn unassigned(&self) -> usize {
        self.unassigned
    }

    /// Sum of the per-zone scores
    pub fn total(&self) -> u32 {
        self.zones.values().map(|s| u32::from(s.value())).sum()
    }

    /// Zones in taxonomy order with their scores
    pub fn iter(&self) -> impl Iterator<Item = (Zone, ZoneScore)> + '_ {
        self.zones.iter().map(|(z, s)| (*z, *s))
    }

    /// General zones in numeric order with their aggregate scores
    pub fn iter_general(&self) -> impl Iterator<Item = (GeneralZone, ZoneScore)> + '_ {
        self.general.iter().map(|(g, s)| (*g, *s))
    }
}

impl Default for ZoneScores {
    fn default() -> Self {
        Self::empty()
    }
}
