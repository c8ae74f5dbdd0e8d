//! Core type definitions for lesion annotation
//!
//! This module provides the fundamental types used throughout the scintimark library:
//! - [`LesionId`]: Stable identifier shared by both halves of a lesion
//! - [`Zone`]: The 16-entry anatomic zone taxonomy
//! - [`GeneralZone`]: Zone number with laterality stripped
//! - [`ZoneAssignment`]: A lesion's zone, or unassigned
//! - [`Laterality`]: Side of the body a zone belongs to
//! - [`LesionStyle`] / [`StyleChoice`]: How a new lesion is drawn
//! - [`AttrValue`]: Values stored in a region's attribute bag

mod attribute;
mod enums;
mod lesion;
mod zone;

pub use attribute::{keys, AttrValue};
pub use enums::{Laterality, LesionStyle, StyleChoice};
pub use lesion::LesionId;
pub use zone::{GeneralZone, Zone, ZoneAssignment, ALL_ZONES, UNASSIGNED};
