//! Creation, deletion and mirror synchronisation of lesion pairs

use super::engine::LesionEngine;
use super::index::RegionRole;
use crate::error::{Result, ScintiError};
use crate::geometry::{ellipse_from_axis, DisplayFrame, Geometry};
use crate::store::{Region, RegionStore};
use crate::types::{keys, AttrValue, LesionId, LesionStyle, StyleChoice, Zone, ZoneAssignment};
use log::{debug, info, warn};
use std::collections::BTreeSet;

/// Attributes both halves of a lesion must agree on, zone keys first
const SHARED_KEYS: [&str; 5] = [
    keys::ZONE,
    keys::GENERAL_ZONE,
    keys::SCORE3,
    keys::HIDDEN,
    keys::STYLE,
];

fn lesion_region(
    geometry: Geometry,
    id: LesionId,
    zone: ZoneAssignment,
    choice: StyleChoice,
) -> Region {
    Region::new(geometry)
        .with_attribute(keys::ID, id.to_string())
        .with_attribute(keys::ZONE, zone.zone_attr())
        .with_attribute(keys::GENERAL_ZONE, zone.general_attr())
        .with_attribute(keys::SCORE3, choice.score3)
        .with_attribute(keys::STYLE, choice.style.simple_name())
}

fn is_soft_tissue_region(region: &Region) -> bool {
    region
        .text_attribute(keys::ZONE)
        .and_then(|raw| ZoneAssignment::parse(raw).ok())
        .is_some_and(|zone| zone.is_soft_tissue())
}

/// Makes `names` on `target` match `source`, returning whether anything changed
fn sync_keys(source: &Region, target: &mut Region, names: &[&str]) -> bool {
    let mut wrote = false;
    for &key in names {
        match source.get_attribute(key) {
            Some(value) if target.get_attribute(key) != Some(value) => {
                target.set_attribute(key, value.clone());
                wrote = true;
            }
            None if target.has_attribute(key) => {
                target.remove_attribute(key);
                wrote = true;
            }
            _ => {}
        }
    }
    wrote
}

fn overlay_region(geometry: Geometry, id: LesionId) -> Region {
    Region::new(geometry).with_attribute(keys::ELLIPSE_ID, id.to_string())
}

impl<S: RegionStore> LesionEngine<S> {
    /// Creates a lesion from normalized geometry and returns its id
    ///
    /// Both halves are appended before any listener runs. Soft-tissue
    /// lesions start in zone 10, all others unassigned.
    ///
    /// # Errors
    ///
    /// Returns [`ScintiError::InvalidGeometry`] for non-finite or degenerate
    /// geometry; the store is left untouched.
    pub fn add_new_lesion(
        &mut self,
        geometry: Geometry,
        soft_tissue: bool,
        score3: bool,
        notify: bool,
    ) -> Result<LesionId> {
        let choice = StyleChoice::plain(&geometry, score3);
        self.add_new_lesion_styled(geometry, soft_tissue, choice, notify)
    }

    /// Creates a lesion drawn in the style picked by the user
    ///
    /// Circle and ellipse lesions must be drawn as a line (their long axis)
    /// and get an overlay polygon on each side.
    pub fn add_new_lesion_styled(
        &mut self,
        geometry: Geometry,
        soft_tissue: bool,
        choice: StyleChoice,
        notify: bool,
    ) -> Result<LesionId> {
        let id = self.create_lesion(geometry, soft_tissue, choice)?;
        self.note_list_change();
        self.finish(notify);
        Ok(id)
    }

    /// Creates a lesion from geometry in display pixels
    pub fn add_new_lesion_from_display(
        &mut self,
        geometry: &Geometry,
        frame: &DisplayFrame,
        soft_tissue: bool,
        choice: StyleChoice,
        notify: bool,
    ) -> Result<LesionId> {
        self.add_new_lesion_styled(frame.to_normalized(geometry), soft_tissue, choice, notify)
    }

    pub(super) fn create_lesion(
        &mut self,
        geometry: Geometry,
        soft_tissue: bool,
        choice: StyleChoice,
    ) -> Result<LesionId> {
        geometry.validate()?;
        // Computed up front so a bad axis cannot leave a half-written lesion
        let overlay = if choice.style.has_overlay() {
            Some(self.overlay_for(&geometry, choice.style)?)
        } else {
            None
        };

        let id = match self.index().max_id() {
            None => LesionId::new(1),
            Some(max) => max.next().ok_or_else(|| {
                ScintiError::InvalidLesionId(format!("no lesion id left after {}", max))
            })?,
        };
        let zone = if soft_tissue {
            ZoneAssignment::Assigned(Zone::SOFT_TISSUE)
        } else {
            ZoneAssignment::Unassigned
        };

        let peer = geometry.mirrored();
        self.store
            .append(lesion_region(geometry, id, zone, choice).with_attribute(keys::ORIGINAL, true));
        self.store.append(lesion_region(peer, id, zone, choice));
        if let Some(overlay) = overlay {
            let mirrored = overlay.mirrored();
            self.store
                .append(overlay_region(overlay, id).with_attribute(keys::ORIGINAL, true));
            self.store.append(overlay_region(mirrored, id));
        }
        self.structure_written();

        info!(
            "Created lesion {} ({}, zone {}, score3 {})",
            id, choice.style, zone, choice.score3
        );
        Ok(id)
    }

    /// Deletes both halves of a lesion and its overlays
    ///
    /// # Errors
    ///
    /// Returns [`ScintiError::UnknownLesion`] (logged) if no region carries `id`.
    pub fn delete_lesion(&mut self, id: LesionId, notify: bool) -> Result<()> {
        self.require(id)?;
        self.remove_lesions(&BTreeSet::from([id]));
        self.note_list_change();
        self.note_selection_change();
        self.finish(notify);
        Ok(())
    }

    /// Deletes several lesions with a single store removal
    ///
    /// Unknown ids are logged and skipped. Returns the number of lesions
    /// deleted.
    pub fn delete_lesions(&mut self, ids: &BTreeSet<LesionId>, notify: bool) -> usize {
        let index = self.index();
        let (known, unknown): (BTreeSet<LesionId>, BTreeSet<LesionId>) =
            ids.iter().partition(|id| index.contains(**id));
        for id in unknown {
            self.misuse(ScintiError::UnknownLesion(id));
        }

        if !known.is_empty() {
            self.remove_lesions(&known);
        }
        self.note_list_change();
        self.note_selection_change();
        self.finish(notify);
        known.len()
    }

    pub(super) fn remove_lesions(&mut self, ids: &BTreeSet<LesionId>) {
        let index = self.index();
        let doomed: BTreeSet<usize> = ids
            .iter()
            .flat_map(|id| {
                index
                    .positions(*id)
                    .iter()
                    .chain(index.overlays_for(*id))
                    .copied()
            })
            .collect();
        self.store.remove_at(&doomed);
        self.structure_written();
        info!("Deleted lesions {:?} ({} regions)", ids, doomed.len());
    }

    /// Geometry of the original half, in normalized coordinates
    pub fn lesion_geometry(&self, id: LesionId) -> Option<Geometry> {
        let position = self.index().original(id)?;
        self.store.get(position).map(|r| r.geometry.clone())
    }

    /// Replaces a lesion's geometry, re-mirroring the peer and overlays
    pub fn set_lesion_geometry(&mut self, id: LesionId, geometry: Geometry, notify: bool) -> Result<()> {
        if self.write_lesion_geometry(id, geometry)? {
            self.note_changed([id]);
        }
        self.finish(notify);
        Ok(())
    }

    /// Writes `geometry` to the original half and its mirror to the peer
    ///
    /// Returns whether anything in the store changed.
    pub(super) fn write_lesion_geometry(&mut self, id: LesionId, geometry: Geometry) -> Result<bool> {
        geometry.validate()?;
        self.require(id)?;
        let (original, peer) = self.regions_for(id).ok_or_else(|| {
            ScintiError::InvalidGeometry(format!("lesion {} is not a complete pair", id))
        })?;

        let mirrored = geometry.mirrored();
        let mut wrote = self.write_geometry(original, geometry.clone());
        wrote |= self.write_geometry(peer, mirrored);
        wrote |= self.regenerate_overlays(id, &geometry);
        Ok(wrote)
    }

    /// Re-mirrors the lesion owning the region at `position` from that region
    ///
    /// Returns the lesion id when the store was written.
    pub(super) fn resync_region(&mut self, position: usize) -> Result<Option<LesionId>> {
        let index = self.index();
        let id = match index.role(position) {
            RegionRole::Lesion(id) => id,
            RegionRole::Overlay(id) => {
                debug!("Overlay of lesion {} edited directly, leaving it", id);
                return Ok(None);
            }
            RegionRole::Other => return Ok(None),
        };
        let Some((original, peer)) = index.regions_for(id) else {
            debug!("Lesion {} is not a complete pair, skipping resync", id);
            return Ok(None);
        };
        let target = if position == original { peer } else { original };

        let source = self
            .store
            .get(position)
            .cloned()
            .ok_or(ScintiError::UnknownLesion(id))?;

        let mut wrote = self.write_geometry(target, source.geometry.mirrored());
        let zone_locked = match self.store.get(target) {
            Some(peer) => is_soft_tissue_region(&source) != is_soft_tissue_region(peer),
            None => false,
        };
        if zone_locked {
            // Soft tissue is fixed at creation, so the edited half takes the zone back
            self.misuse(ScintiError::SoftTissueImmutable(id));
            wrote |= self.restore_zone(target, position);
        }
        wrote |= self.copy_shared_attributes(&source, target, zone_locked);

        let original_geometry = if position == original {
            source.geometry
        } else {
            source.geometry.mirrored()
        };
        wrote |= self.regenerate_overlays(id, &original_geometry);

        if wrote {
            self.invalidate();
            debug!("Resynced lesion {} from region {}", id, position);
            Ok(Some(id))
        } else {
            Ok(None)
        }
    }

    fn write_geometry(&mut self, position: usize, geometry: Geometry) -> bool {
        match self.store.get_mut(position) {
            Some(region) if !region.geometry.approx_eq(&geometry) => {
                region.geometry = geometry;
                true
            }
            _ => false,
        }
    }

    fn restore_zone(&mut self, from: usize, to: usize) -> bool {
        let Some(kept) = self.store.get(from).cloned() else {
            return false;
        };
        match self.store.get_mut(to) {
            Some(region) => sync_keys(&kept, region, &[keys::ZONE, keys::GENERAL_ZONE]),
            None => false,
        }
    }

    fn copy_shared_attributes(&mut self, source: &Region, target: usize, skip_zone: bool) -> bool {
        let Some(region) = self.store.get_mut(target) else {
            return false;
        };
        let shared = if skip_zone {
            &SHARED_KEYS[2..]
        } else {
            &SHARED_KEYS[..]
        };
        sync_keys(source, region, shared)
    }

    /// Writes `values` to every position that differs
    ///
    /// Returns whether anything changed.
    pub(super) fn write_attributes(
        &mut self,
        positions: &[usize],
        values: &[(&str, AttrValue)],
    ) -> bool {
        let mut wrote = false;
        for &position in positions {
            let Some(region) = self.store.get_mut(position) else {
                continue;
            };
            for (key, value) in values {
                if region.get_attribute(key) != Some(value) {
                    region.set_attribute(key, value.clone());
                    wrote = true;
                }
            }
        }
        wrote
    }

    fn overlay_for(&self, axis: &Geometry, style: LesionStyle) -> Result<Geometry> {
        match axis {
            Geometry::Segment { start, end } => ellipse_from_axis(
                start,
                end,
                style.minor_ratio(self.config.ellipse_minor_ratio),
                self.config.ellipse_vertices,
            ),
            other => Err(ScintiError::InvalidGeometry(format!(
                "{} lesions are drawn as a line, got a {}",
                style,
                other.kind_name()
            ))),
        }
    }

    /// Rebuilds the overlays of `id` from the original half's geometry
    fn regenerate_overlays(&mut self, id: LesionId, original: &Geometry) -> bool {
        let index = self.index();
        let overlays = index.overlays_for(id);
        if overlays.is_empty() {
            return false;
        }

        let style = index
            .original(id)
            .and_then(|p| self.store.get(p))
            .and_then(|r| r.text_attribute(keys::STYLE))
            .and_then(LesionStyle::from_str)
            .filter(LesionStyle::has_overlay)
            .unwrap_or(LesionStyle::Ellipse);

        let overlay = match self.overlay_for(original, style) {
            Ok(overlay) => overlay,
            Err(e) => {
                warn!("Could not regenerate overlay of lesion {}: {}", id, e);
                return false;
            }
        };

        let mut wrote = false;
        if let Some(&first) = overlays.first() {
            wrote |= self.write_geometry(first, overlay.clone());
        }
        if let Some(&second) = overlays.get(1) {
            wrote |= self.write_geometry(second, overlay.mirrored());
        }
        wrote
    }

    /// Deletes surviving halves of broken pairs and overlays without a lesion
    ///
    /// All removals go through one `remove_at` call.
    pub(super) fn heal_orphans(&mut self) {
        let index = self.index();
        let orphans = index.orphans();
        let strays = index.stray_overlays();
        if orphans.is_empty() && strays.is_empty() {
            return;
        }

        let doomed: BTreeSet<usize> = orphans
            .iter()
            .flat_map(|id| index.positions(*id).iter().copied())
            .chain(strays.iter().flat_map(|id| index.overlays_for(*id).iter().copied()))
            .collect();

        info!(
            "Healing {} orphaned lesions {:?}, removing {} regions",
            orphans.len(),
            orphans,
            doomed.len()
        );
        self.store.remove_at(&doomed);
        self.structure_written();
    }
}
