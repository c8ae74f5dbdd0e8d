use super::engine::LesionEngine;
use super::index::RegionRole;
use crate::error::ScintiError;
use crate::store::RegionStore;
use crate::types::LesionId;
use log::debug;
use std::collections::BTreeSet;

impl<S: RegionStore> LesionEngine<S> {
    /// Lesions whose regions are selected in the host
    ///
    /// Selecting an overlay counts as selecting its lesion. If any selected
    /// region is not part of a lesion the result is empty: a selection is
    /// either all lesions or nothing.
    pub fn get_selected_lesion_ids(&self) -> BTreeSet<LesionId> {
        let index = self.index();
        let mut ids = BTreeSet::new();
        for position in self.store.selected_indices() {
            match index.role(position) {
                RegionRole::Lesion(id) | RegionRole::Overlay(id) => {
                    ids.insert(id);
                }
                RegionRole::Other => return BTreeSet::new(),
            }
        }
        ids
    }

    /// Replaces the host selection with every region of the given lesions
    ///
    /// Unknown ids are logged and skipped. Returns the number of lesions
    /// selected.
    pub fn select_lesions(&mut self, ids: &BTreeSet<LesionId>, notify: bool) -> usize {
        let index = self.index();
        let mut positions = BTreeSet::new();
        let mut selected = 0;
        for &id in ids {
            if !index.contains(id) {
                self.misuse(ScintiError::UnknownLesion(id));
                continue;
            }
            positions.extend(index.positions(id).iter().copied());
            positions.extend(index.overlays_for(id).iter().copied());
            selected += 1;
        }

        self.store.select(&positions);
        self.note_selection_change();
        self.finish(notify);
        selected
    }

    /// Adds the other half of every partly selected lesion to the selection
    pub(super) fn expand_selection_to_peers(&mut self) {
        let index = self.index();
        let current = self.store.selected_indices();
        let mut wanted = current.clone();
        for &position in &current {
            if let RegionRole::Lesion(id) = index.role(position) {
                wanted.extend(index.positions(id).iter().copied());
            }
        }
        if wanted != current {
            debug!(
                "Extending selection to mirror peers ({} -> {} regions)",
                current.len(),
                wanted.len()
            );
            self.store.select(&wanted);
        }
    }
}
