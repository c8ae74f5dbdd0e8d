use crate::geometry::Geometry;
use crate::types::AttrValue;

/// A host-owned shape with an ordered attribute bag
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct Region {
    pub geometry: Geometry,
    #[cfg_attr(feature = "json", serde(default))]
    attributes: Vec<(String, AttrValue)>,
    #[cfg_attr(feature = "json", serde(default))]
    pub selected: bool,
}

impl Region {
    /// Creates an unselected region without attributes
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            attributes: Vec::new(),
            selected: false,
        }
    }

    /// Builder: add an attribute
    pub fn with_attribute(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn get_attribute(&self, key: &str) -> Option<&AttrValue> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Sets an attribute, keeping its position if it already exists
    pub fn set_attribute(&mut self, key: &str, value: impl Into<AttrValue>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    pub fn remove_attribute(&mut self, key: &str) -> Option<AttrValue> {
        let pos = self.attributes.iter().position(|(k, _)| k == key)?;
        Some(self.attributes.remove(pos).1)
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.get_attribute(key).is_some()
    }

    /// Returns a text attribute; flags are not coerced
    pub fn text_attribute(&self, key: &str) -> Option<&str> {
        self.get_attribute(key).and_then(AttrValue::as_text)
    }

    /// Returns whether a flag attribute is present and truthy
    pub fn flag(&self, key: &str) -> bool {
        self.get_attribute(key).is_some_and(AttrValue::is_truthy)
    }

    /// Attributes in insertion order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }
}
