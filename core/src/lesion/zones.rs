use super::engine::LesionEngine;
use crate::error::{Result, ScintiError};
use crate::store::RegionStore;
use crate::types::{keys, AttrValue, LesionId, Zone, ZoneAssignment};
use log::debug;
use std::collections::BTreeSet;

impl<S: RegionStore> LesionEngine<S> {
    /// Assigns `zone` to both halves of a lesion
    ///
    /// Assigning the zone a lesion already has is a no-op and fires nothing.
    ///
    /// # Errors
    ///
    /// All errors are logged and leave the store untouched:
    /// [`ScintiError::UnknownLesion`], [`ScintiError::SoftTissueImmutable`]
    /// for zone 10 lesions, and [`ScintiError::InvalidZone`] when `zone` is
    /// zone 10 itself.
    pub fn assign_zone_to_lesion(&mut self, zone: Zone, id: LesionId, notify: bool) -> Result<()> {
        let result = self.write_zone(id, ZoneAssignment::Assigned(zone));
        if let Ok(true) = result {
            self.note_changed([id]);
        }
        self.finish(notify);
        result.map(|_| ())
    }

    /// Assigns a zone given by its label ("3L", "4")
    ///
    /// A side suffix on a midline zone is dropped, so "4R" assigns zone 4.
    pub fn assign_zone_label(&mut self, label: &str, id: LesionId, notify: bool) -> Result<()> {
        let zone = Zone::parse_lenient(label).map_err(|e| self.misuse(e))?;
        self.assign_zone_to_lesion(zone, id, notify)
    }

    /// Assigns `zone` to every lesion in `ids`, firing at most one event
    ///
    /// Lesions that cannot take the zone are logged and skipped. Returns the
    /// number of lesions whose zone changed.
    pub fn assign_zone_to_lesions(
        &mut self,
        zone: Zone,
        ids: &BTreeSet<LesionId>,
        notify: bool,
    ) -> usize {
        self.write_zone_bulk(ids, ZoneAssignment::Assigned(zone), notify)
    }

    /// Resets the zone of every lesion in `ids` to unassigned
    ///
    /// Soft-tissue and unknown lesions are logged and skipped. Returns the
    /// number of lesions whose zone changed.
    pub fn remove_zone_from_lesions(&mut self, ids: &BTreeSet<LesionId>, notify: bool) -> usize {
        self.write_zone_bulk(ids, ZoneAssignment::Unassigned, notify)
    }

    /// Sets or clears the score3 flag on both halves
    pub fn set_lesion_score3_type(&mut self, id: LesionId, score3: bool, notify: bool) -> Result<()> {
        let positions = self.require(id)?;
        if self.write_attributes(&positions, &[(keys::SCORE3, AttrValue::Flag(score3))]) {
            self.invalidate_scores();
            self.note_changed([id]);
        }
        self.finish(notify);
        Ok(())
    }

    /// Hides or shows lesions; both halves carry the `hidden` flag
    ///
    /// Returns the number of lesions whose visibility changed.
    pub fn set_lesions_hidden(&mut self, ids: &BTreeSet<LesionId>, hidden: bool, notify: bool) -> usize {
        let mut changed = BTreeSet::new();
        for &id in ids {
            let Ok(positions) = self.require(id) else {
                continue;
            };
            if self.write_attributes(&positions, &[(keys::HIDDEN, AttrValue::Flag(hidden))]) {
                changed.insert(id);
            }
        }
        let count = changed.len();
        self.note_changed(changed);
        self.finish(notify);
        count
    }

    fn write_zone_bulk(&mut self, ids: &BTreeSet<LesionId>, zone: ZoneAssignment, notify: bool) -> usize {
        let mut changed = BTreeSet::new();
        for &id in ids {
            // Misuse is logged by write_zone
            if let Ok(true) = self.write_zone(id, zone) {
                changed.insert(id);
            }
        }
        let count = changed.len();
        debug!("Set zone {} on {} of {} lesions", zone, count, ids.len());
        self.note_changed(changed);
        self.finish(notify);
        count
    }

    /// Writes `zone` and its general zone to both halves
    ///
    /// Returns whether the stored value changed.
    fn write_zone(&mut self, id: LesionId, zone: ZoneAssignment) -> Result<bool> {
        let positions = self.require(id)?;
        if self.is_soft_tissue(id) {
            return Err(self.misuse(ScintiError::SoftTissueImmutable(id)));
        }
        if zone.is_soft_tissue() {
            return Err(self.misuse(ScintiError::InvalidZone(format!(
                "zone {} is only set when a soft-tissue lesion is created",
                zone
            ))));
        }

        let values = [
            (keys::ZONE, AttrValue::from(zone.zone_attr())),
            (keys::GENERAL_ZONE, AttrValue::from(zone.general_attr())),
        ];
        let wrote = self.write_attributes(&positions, &values);
        if wrote {
            self.invalidate_scores();
            debug!("Lesion {} zone set to {}", id, zone);
        }
        Ok(wrote)
    }
}
