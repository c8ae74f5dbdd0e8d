//! Region store boundary
//!
//! The host application owns a flat, ordered list of regions. The lesion
//! engine reads and writes through [`RegionStore`] and never assumes it owns
//! the list: positions shift on every insertion or removal, and the host may
//! delete regions behind the engine's back.

mod memory;
mod region;

pub use memory::MemoryRegionStore;
pub use region::Region;

use std::collections::BTreeSet;

/// Minimal contract the host's region list must fulfil
///
/// Positions are 0-based and only valid until the next structural change.
pub trait RegionStore {
    /// Number of regions in the list
    fn count(&self) -> usize;

    fn get(&self, index: usize) -> Option<&Region>;

    fn get_mut(&mut self, index: usize) -> Option<&mut Region>;

    /// Appends a region and returns its position
    fn append(&mut self, region: Region) -> usize;

    /// Removes every region whose position is in `indices`
    ///
    /// Implementations must treat positions as referring to the list before
    /// any removal, e.g. by removing in descending order.
    fn remove_at(&mut self, indices: &BTreeSet<usize>);

    fn selected_indices(&self) -> BTreeSet<usize>;

    /// Replaces the selection with exactly `indices`
    fn select(&mut self, indices: &BTreeSet<usize>);
}

impl<S: RegionStore + ?Sized> RegionStore for &mut S {
    fn count(&self) -> usize {
        (**self).count()
    }

    fn get(&self, index: usize) -> Option<&Region> {
        (**self).get(index)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut Region> {
        (**self).get_mut(index)
    }

    fn append(&mut self, region: Region) -> usize {
        (**self).append(region)
    }

    fn remove_at(&mut self, indices: &BTreeSet<usize>) {
        (**self).remove_at(indices)
    }

    fn selected_indices(&self) -> BTreeSet<usize> {
        (**self).selected_indices()
    }

    fn select(&mut self, indices: &BTreeSet<usize>) {
        (**self).select(indices)
    }
}

impl<S: RegionStore + ?Sized> RegionStore for Box<S> {
    fn count(&self) -> usize {
        (**self).count()
    }

    fn get(&self, index: usize) -> Option<&Region> {
        (**self).get(index)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut Region> {
        (**self).get_mut(index)
    }

    fn append(&mut self, region: Region) -> usize {
        (**self).append(region)
    }

    fn remove_at(&mut self, indices: &BTreeSet<usize>) {
        (**self).remove_at(indices)
    }

    fn selected_indices(&self) -> BTreeSet<usize> {
        (**self).selected_indices()
    }

    fn select(&mut self, indices: &BTreeSet<usize>) {
        (**self).select(indices)
    }
}
