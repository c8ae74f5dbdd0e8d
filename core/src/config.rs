/// How the index orders a pair when the `original` flag does not decide it
///
/// Neither half flagged happens with geometry imported from files; both
/// flagged happens when a host copies a region with its attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "kebab-case"))]
pub enum TieBreak {
    /// The region earlier in the store is the original
    #[default]
    LowerIndexFirst,
    /// The region on the left half of the image (`x < 0.5`) is the original;
    /// falls back to the lower index when both sit on the same side
    LeftHalfFirst,
}

/// Configuration for a lesion engine
///
/// # Example
///
/// ```
/// use scintimark_core::EngineConfig;
///
/// let config = EngineConfig::default()
///     .ellipse_vertices(48)
///     .mirror_selection(false);
///
/// assert_eq!(config.ellipse_vertices, 48);
/// assert!(!config.mirror_selection);
/// assert!(config.heal_orphans);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct EngineConfig {
    /// Vertex count of generated circle/ellipse overlays
    pub ellipse_vertices: usize,

    /// Minor/major axis ratio for ellipse overlays
    pub ellipse_minor_ratio: f64,

    /// Selecting one half of a lesion selects its peer as well
    pub mirror_selection: bool,

    /// Delete the surviving half when the host removes one half of a pair
    pub heal_orphans: bool,

    /// Ordering of pairs the `original` flag does not decide
    pub tie_break: TieBreak,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ellipse_vertices: 32,
            ellipse_minor_ratio: 0.6,
            mirror_selection: true,
            heal_orphans: true,
            tie_break: TieBreak::LowerIndexFirst,
        }
    }
}

impl EngineConfig {
    /// Builder: Set overlay vertex count
    pub fn ellipse_vertices(mut self, vertices: usize) -> Self {
        self.ellipse_vertices = vertices;
        self
    }

    /// Builder: Set ellipse minor/major ratio
    ///
    /// # Example
    ///
    /// ```
    /// use scintimark_core::EngineConfig;
    ///
    /// let config = EngineConfig::default().ellipse_minor_ratio(0.5);
    /// assert_eq!(config.ellipse_minor_ratio, 0.5);
    /// ```
    pub fn ellipse_minor_ratio(mut self, ratio: f64) -> Self {
        self.ellipse_minor_ratio = ratio;
        self
    }

    /// Builder: Mirror selections onto peers
    pub fn mirror_selection(mut self, mirror: bool) -> Self {
        self.mirror_selection = mirror;
        self
    }

    /// Builder: Heal orphaned halves on list changes
    pub fn heal_orphans(mut self, heal: bool) -> Self {
        self.heal_orphans = heal;
        self
    }

    /// Builder: Set pair tie-break
    pub fn tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Loads a config from a JSON file; missing fields take their defaults
    #[cfg(feature = "json")]
    pub fn from_json_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
