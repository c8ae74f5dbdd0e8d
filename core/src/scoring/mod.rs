//! Per-zone severity scoring
//!
//! Scores are derived from the lesions present, never stored. Only the
//! original half of each lesion is counted, so a lesion contributes once
//! even though it is drawn on both sides of the midline.

mod scores;

pub use scores::{ZoneScore, ZoneScores};

use crate::lesion::LesionIndex;
use crate::store::RegionStore;
use crate::types::{keys, ZoneAssignment};
use log::{debug, warn};

/// Computes zone scores from the original regions in `index`
///
/// A zone with any score3 lesion scores 3; otherwise any lesion scores 1;
/// an empty zone scores 0. Bilateral zones also raise their general-zone
/// aggregate (3L and 3R both feed zone 3).
pub fn compute_zone_scores<S: RegionStore + ?Sized>(store: &S, index: &LesionIndex) -> ZoneScores {
    let mut scores = ZoneScores::empty();

    for (id, position) in index.originals() {
        let Some(region) = store.get(position) else {
            continue;
        };
        let assignment = match region.text_attribute(keys::ZONE) {
            Some(raw) => ZoneAssignment::parse(raw).unwrap_or_else(|e| {
                warn!("Lesion {} has an unreadable zone, scoring as unassigned: {}", id, e);
                ZoneAssignment::Unassigned
            }),
            None => ZoneAssignment::Unassigned,
        };

        match assignment {
            ZoneAssignment::Unassigned => scores.count_unassigned(),
            ZoneAssignment::Assigned(zone) => {
                let level = if region.flag(keys::SCORE3) {
                    ZoneScore::Extensive
                } else {
                    ZoneScore::Present
                };
                scores.raise(zone, level);
            }
        }
    }

    debug!(
        "Computed zone scores over {} lesions (total {})",
        index.len(),
        scores.total()
    );
    scores
}
