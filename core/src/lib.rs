pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod lesion;
pub mod logging;
pub mod scoring;
pub mod store;
pub mod types;
pub mod worklist;

pub use cli::report::{WorklistReport, ZoneScoreReport};
pub use config::{EngineConfig, TieBreak};
pub use error::{Result, ScintiError};
pub use events::{EventKind, LesionEvent, ListenerHandle};
pub use geometry::{DisplayFrame, Geometry, Point};
pub use lesion::{LesionEngine, LesionEngineBuilder, LesionIndex, RegionRole};
pub use scoring::{compute_zone_scores, ZoneScore, ZoneScores};
pub use store::{MemoryRegionStore, Region, RegionStore};
pub use types::*;
