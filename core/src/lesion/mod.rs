//! Lesion model over a host region store
//!
//! A lesion is two regions sharing an `id` attribute: the user-authored
//! original (flagged `original`) and its peer mirrored across the vertical
//! midline. Circle and ellipse lesions add one overlay polygon per side,
//! tagged `ellipseid`.
//!
//! [`LesionEngine`] owns the cached [`LesionIndex`], the listener registry and
//! the pending events for one open case.

mod engine;
mod index;
mod pairing;
mod placement;
mod selection;
mod zones;

#[cfg(test)]
mod tests;

pub use engine::{LesionEngine, LesionEngineBuilder};
pub use index::{LesionIndex, RegionRole};
