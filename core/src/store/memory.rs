use super::{Region, RegionStore};
use std::collections::BTreeSet;

/// Vec-backed region store
///
/// Stands in for the host's list in tests and in the command-line tool,
/// where a snapshot of a case's regions is loaded from disk.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(transparent))]
pub struct MemoryRegionStore {
    regions: Vec<Region>,
}

impl MemoryRegionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_regions(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn into_regions(self) -> Vec<Region> {
        self.regions
    }

    /// Loads a JSON snapshot (an array of regions)
    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[cfg(feature = "json")]
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl RegionStore for MemoryRegionStore {
    fn count(&self) -> usize {
        self.regions.len()
    }

    fn get(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut Region> {
        self.regions.get_mut(index)
    }

    fn append(&mut self, region: Region) -> usize {
        self.regions.push(region);
        self.regions.len() - 1
    }

    fn remove_at(&mut self, indices: &BTreeSet<usize>) {
        for &index in indices.iter().rev() {
            if index < self.regions.len() {
                self.regions.remove(index);
            }
        }
    }

    fn selected_indices(&self) -> BTreeSet<usize> {
        self.regions
            .iter()
            .enumerate()
            .filter(|(_, r)| r.selected)
            .map(|(i, _)| i)
            .collect()
    }

    fn select(&mut self, indices: &BTreeSet<usize>) {
        for (i, region) in self.regions.iter_mut().enumerate() {
            region.selected = indices.contains(&i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::types::keys;

    fn store_with(n: usize) -> MemoryRegionStore {
        let mut store = MemoryRegionStore::new();
        for i in 0..n {
            store.append(
                Region::new(Geometry::point(0.1, 0.1)).with_attribute(keys::ID, i.to_string()),
            );
        }
        store
    }

    #[test]
    fn test_remove_at_uses_original_positions() {
        let mut store = store_with(5);
        store.remove_at(&BTreeSet::from([1, 3]));
        let ids: Vec<&str> = store
            .regions()
            .iter()
            .filter_map(|r| r.text_attribute(keys::ID))
            .collect();
        assert_eq!(ids, vec!["0", "2", "4"]);
    }

    #[test]
    fn test_remove_at_ignores_out_of_range() {
        let mut store = store_with(2);
        store.remove_at(&BTreeSet::from([7]));
        assert_eq!(store.count(), 2);
    }

    #[test]
    fn test_select_replaces_selection() {
        let mut store = store_with(4);
        store.select(&BTreeSet::from([0, 2]));
        store.select(&BTreeSet::from([3]));
        assert_eq!(store.selected_indices(), BTreeSet::from([3]));
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_json_snapshot() {
        let json = r#"[
            {"geometry": {"kind": "point", "at": {"x": 0.2, "y": 0.5}},
             "attributes": [["id", "1"], ["original", true]]}
        ]"#;
        let store = MemoryRegionStore::from_json(json).unwrap();
        assert_eq!(store.count(), 1);
        assert!(store.get(0).unwrap().flag(keys::ORIGINAL));
        let reloaded = MemoryRegionStore::from_json(&store.to_json().unwrap()).unwrap();
        assert_eq!(reloaded, store);
    }
}
