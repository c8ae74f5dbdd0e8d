use crate::error::Result;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Reading pass a case goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum Stage {
    First,
    Second,
}

impl Stage {
    pub fn number(&self) -> u8 {
        match self {
            Stage::First => 1,
            Stage::Second => 2,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Stage::First),
            2 => Some(Stage::Second),
            _ => None,
        }
    }

    /// Suffix appended to the case file name to mark it done
    pub fn flag_suffix(&self) -> &'static str {
        match self {
            Stage::First => ".stage1.done",
            Stage::Second => ".stage2.done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage {}", self.number())
    }
}

/// One image file in the worklist
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct CaseEntry {
    pub path: PathBuf,
}

impl CaseEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File name shown in the worklist
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Path of the flag file marking `stage` done
    pub fn flag_path(&self, stage: Stage) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(stage.flag_suffix());
        self.path.with_file_name(name)
    }

    pub fn is_complete(&self, stage: Stage) -> bool {
        self.flag_path(stage).is_file()
    }

    /// Creates the flag file for `stage`
    pub fn mark_complete(&self, stage: Stage) -> Result<()> {
        File::create(self.flag_path(stage))?;
        Ok(())
    }

    pub fn directory(&self) -> Option<&Path> {
        self.path.parent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case(Stage::First, "case01.dcm.stage1.done")]
    #[case(Stage::Second, "case01.dcm.stage2.done")]
    fn test_flag_path(#[case] stage: Stage, #[case] expected: &str) {
        let case = CaseEntry::new("/data/wb/case01.dcm");
        assert_eq!(case.flag_path(stage), PathBuf::from("/data/wb").join(expected));
    }

    #[test]
    fn test_mark_complete_per_stage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scan.dcm");
        File::create(&path).unwrap();
        let case = CaseEntry::new(&path);

        assert!(!case.is_complete(Stage::First));
        case.mark_complete(Stage::First).unwrap();
        assert!(case.is_complete(Stage::First));
        assert!(!case.is_complete(Stage::Second));
        assert_eq!(case.name(), "scan.dcm");
        assert_eq!(case.directory(), Some(temp_dir.path()));
    }

    #[test]
    fn test_stage_numbers() {
        assert_eq!(Stage::from_number(2), Some(Stage::Second));
        assert_eq!(Stage::from_number(3), None);
        assert_eq!(Stage::First.to_string(), "stage 1");
    }
}
