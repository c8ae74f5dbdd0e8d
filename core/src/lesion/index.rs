use crate::config::TieBreak;
use crate::store::{Region, RegionStore};
use crate::types::{keys, LesionId};
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

/// What a region position represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionRole {
    /// One half of a lesion
    Lesion(LesionId),
    /// Circle/ellipse overlay drawn for a lesion
    Overlay(LesionId),
    /// Anything the engine did not create
    Other,
}

/// Mapping from lesion id to the positions of its regions
///
/// Built in one pass over the store and never updated in place: any
/// structural change to the store makes it stale and it is rebuilt on the
/// next read. Within each lesion the original half comes first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LesionIndex {
    lesions: BTreeMap<LesionId, Vec<usize>>,
    overlays: BTreeMap<LesionId, Vec<usize>>,
    roles: Vec<RegionRole>,
}

impl LesionIndex {
    /// Scans the store and groups regions by their `id` attribute
    pub fn build<S: RegionStore + ?Sized>(store: &S, tie_break: TieBreak) -> Self {
        let mut lesions: BTreeMap<LesionId, Vec<usize>> = BTreeMap::new();
        let mut overlays: BTreeMap<LesionId, Vec<usize>> = BTreeMap::new();
        let mut roles = Vec::with_capacity(store.count());

        for i in 0..store.count() {
            let role = store.get(i).map_or(RegionRole::Other, classify);
            match role {
                RegionRole::Lesion(id) => lesions.entry(id).or_default().push(i),
                RegionRole::Overlay(id) => overlays.entry(id).or_default().push(i),
                RegionRole::Other => {}
            }
            roles.push(role);
        }

        for positions in lesions.values_mut().chain(overlays.values_mut()) {
            order_original_first(store, positions, tie_break);
        }

        debug!(
            "Built lesion index: {} lesions, {} overlays over {} regions",
            lesions.len(),
            overlays.len(),
            roles.len()
        );

        Self {
            lesions,
            overlays,
            roles,
        }
    }

    /// Every lesion id with at least one region
    pub fn all_ids(&self) -> BTreeSet<LesionId> {
        self.lesions.keys().copied().collect()
    }

    pub fn contains(&self, id: LesionId) -> bool {
        self.lesions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lesions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lesions.is_empty()
    }

    /// (original, peer) positions of a complete lesion
    pub fn regions_for(&self, id: LesionId) -> Option<(usize, usize)> {
        match self.lesions.get(&id).map(Vec::as_slice) {
            Some([original, peer]) => Some((*original, *peer)),
            _ => None,
        }
    }

    /// All positions carrying this lesion id, original first
    pub fn positions(&self, id: LesionId) -> &[usize] {
        self.lesions.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Overlay positions drawn for this lesion, original side first
    pub fn overlays_for(&self, id: LesionId) -> &[usize] {
        self.overlays.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Position of the original half
    pub fn original(&self, id: LesionId) -> Option<usize> {
        self.positions(id).first().copied()
    }

    /// (id, original position) for every lesion
    pub fn originals(&self) -> impl Iterator<Item = (LesionId, usize)> + '_ {
        self.lesions
            .iter()
            .filter_map(|(id, positions)| positions.first().map(|p| (*id, *p)))
    }

    pub fn role(&self, index: usize) -> RegionRole {
        self.roles.get(index).copied().unwrap_or(RegionRole::Other)
    }

    /// Highest id in use by a lesion or an overlay
    pub fn max_id(&self) -> Option<LesionId> {
        let lesion_max = self.lesions.keys().next_back().copied();
        let overlay_max = self.overlays.keys().next_back().copied();
        lesion_max.max(overlay_max)
    }

    /// Lesions left with a single region
    pub fn orphans(&self) -> BTreeSet<LesionId> {
        self.lesions
            .iter()
            .filter(|(_, positions)| positions.len() == 1)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Lesions with more than two regions (duplicated by the host)
    pub fn overfull(&self) -> BTreeSet<LesionId> {
        self.lesions
            .iter()
            .filter(|(_, positions)| positions.len() > 2)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Overlays whose lesion is gone or orphaned
    pub fn stray_overlays(&self) -> BTreeSet<LesionId> {
        self.overlays
            .keys()
            .filter(|id| self.positions(**id).len() != 2)
            .copied()
            .collect()
    }
}

fn classify(region: &Region) -> RegionRole {
    if let Some(raw) = region.text_attribute(keys::ID) {
        return match LesionId::parse(raw) {
            Ok(id) => RegionRole::Lesion(id),
            Err(e) => {
                warn!("Ignoring region with unusable id attribute: {}", e);
                RegionRole::Other
            }
        };
    }
    match region.text_attribute(keys::ELLIPSE_ID).map(LesionId::parse) {
        Some(Ok(id)) => RegionRole::Overlay(id),
        _ => RegionRole::Other,
    }
}

fn order_original_first<S: RegionStore + ?Sized>(
    store: &S,
    positions: &mut [usize],
    tie_break: TieBreak,
) {
    positions.sort_by_key(|&i| {
        let region = store.get(i);
        let not_original = !region.is_some_and(|r| r.flag(keys::ORIGINAL));
        let side = match tie_break {
            TieBreak::LowerIndexFirst => false,
            TieBreak::LeftHalfFirst => region.is_some_and(|r| r.geometry.center().x >= 0.5),
        };
        (not_original, side, i)
    });
}
