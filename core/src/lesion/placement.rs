use super::engine::LesionEngine;
use crate::error::{Result, ScintiError};
use crate::geometry::Geometry;
use crate::store::RegionStore;
use crate::types::{LesionId, StyleChoice};
use log::{debug, info, warn};
use std::collections::BTreeSet;

/// Interactive placement: press creates the lesion, drag reshapes it, release
/// fires a single placed event.
impl<S: RegionStore> LesionEngine<S> {
    /// Starts a placement gesture and creates the lesion right away
    ///
    /// A gesture already in progress is finished first.
    pub fn begin_placement(
        &mut self,
        geometry: Geometry,
        soft_tissue: bool,
        choice: StyleChoice,
    ) -> Result<LesionId> {
        if let Some(previous) = self.placement {
            warn!(
                "Placement of lesion {} still in progress, finishing it",
                previous
            );
            if let Err(e) = self.finish_placement() {
                warn!("Could not finish placement of lesion {}: {}", previous, e);
            }
        }

        let id = self.create_lesion(geometry, soft_tissue, choice)?;
        self.placement = Some(id);
        self.note_list_change();
        self.finish(true);
        debug!("Placement of lesion {} started", id);
        Ok(id)
    }

    /// Reshapes the lesion being placed
    ///
    /// No changed event fires while the gesture is in progress.
    pub fn update_placement(&mut self, geometry: Geometry) -> Result<()> {
        let id = self.placement.ok_or(ScintiError::NoActivePlacement)?;
        match self.write_lesion_geometry(id, geometry) {
            Err(ScintiError::UnknownLesion(_)) => {
                // Deleted by the host mid-gesture
                self.placement = None;
                Err(ScintiError::UnknownLesion(id))
            }
            other => other.map(|_| ()),
        }
    }

    /// Ends the gesture and fires one placed event
    pub fn finish_placement(&mut self) -> Result<LesionId> {
        let id = self.placement.take().ok_or(ScintiError::NoActivePlacement)?;
        if !self.index().contains(id) {
            return Err(self.misuse(ScintiError::UnknownLesion(id)));
        }
        self.invalidate_scores();
        self.events.queue_mut().push_placed(id);
        self.finish(true);
        info!("Placed lesion {}", id);
        Ok(id)
    }

    /// Aborts the gesture and deletes the lesion it created
    pub fn cancel_placement(&mut self) -> Result<()> {
        let id = self.placement.take().ok_or(ScintiError::NoActivePlacement)?;
        if self.index().contains(id) {
            self.remove_lesions(&BTreeSet::from([id]));
            self.note_list_change();
            self.note_selection_change();
        }
        self.finish(true);
        debug!("Placement of lesion {} cancelled", id);
        Ok(())
    }

    /// Lesion currently being placed
    pub fn placement(&self) -> Option<LesionId> {
        self.placement
    }
}
