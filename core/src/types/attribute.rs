use std::fmt;

/// Attribute keys layered onto host regions
pub mod keys {
    /// Lesion identifier, shared by both halves
    pub const ID: &str = "id";
    /// Present (true) on the user-authored half
    pub const ORIGINAL: &str = "original";
    pub const ZONE: &str = "zone";
    pub const GENERAL_ZONE: &str = "generalzone";
    /// More than half of the zone is involved
    pub const SCORE3: &str = "score3";
    /// Marks an overlay region; value is the owning lesion id
    pub const ELLIPSE_ID: &str = "ellipseid";
    pub const HIDDEN: &str = "hidden";
    /// Drawing style, used to regenerate overlays
    pub const STYLE: &str = "style";
}

/// Value stored in a region's attribute bag
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(untagged))]
pub enum AttrValue {
    Flag(bool),
    Text(String),
}

impl AttrValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            AttrValue::Flag(_) => None,
        }
    }

    /// Truthiness as the host evaluates it: flags as-is, text "true"/"1"
    pub fn is_truthy(&self) -> bool {
        match self {
            AttrValue::Flag(b) => *b,
            AttrValue::Text(s) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("true") || s == "1"
            }
        }
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Flag(b)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Flag(b) => write!(f, "{}", b),
            AttrValue::Text(s) => write!(f, "{}", s),
        }
    }
}
