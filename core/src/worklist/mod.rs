//! Case worklist over a directory of scans
//!
//! Cases are the `*.dcm` files of a directory; their content is never read.
//! Progress is kept as empty flag files next to each case, one per stage.

mod case;

pub use case::{CaseEntry, Stage};

use crate::error::Result;
use log::{debug, info};
use std::fs;
use std::path::Path;

/// Lists the cases in `directory`, sorted by path
///
/// Only regular files with a `.dcm` extension (any case) are returned.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn scan_cases(directory: &Path) -> Result<Vec<CaseEntry>> {
    let mut cases = Vec::new();

    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("dcm") => cases.push(CaseEntry::new(path)),
            _ => debug!("Skipping non-case file: {}", path.display()),
        }
    }

    cases.sort();
    info!("Found {} cases in {}", cases.len(), directory.display());
    Ok(cases)
}

/// First case not yet done for `stage`
pub fn next_pending(cases: &[CaseEntry], stage: Stage) -> Option<&CaseEntry> {
    cases.iter().find(|case| !case.is_complete(stage))
}

/// Marks `case` done for `stage`
pub fn mark_complete(case: &CaseEntry, stage: Stage) -> Result<()> {
    case.mark_complete(stage)?;
    info!("Marked {} complete for {}", case.name(), stage);
    Ok(())
}

/// Number of cases done for `stage`
pub fn completed_count(cases: &[CaseEntry], stage: Stage) -> usize {
    cases.iter().filter(|case| case.is_complete(stage)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn worklist_dir(names: &[&str]) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        for name in names {
            File::create(temp_dir.path().join(name)).unwrap();
        }
        temp_dir
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let temp_dir = worklist_dir(&["b.dcm", "a.DCM", "notes.txt", "c.dcm.stage1.done"]);
        fs::create_dir(temp_dir.path().join("sub.dcm")).unwrap();

        let cases = scan_cases(temp_dir.path()).unwrap();
        let names: Vec<String> = cases.iter().map(CaseEntry::name).collect();
        assert_eq!(names, vec!["a.DCM", "b.dcm"]);
    }

    #[test]
    fn test_scan_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(scan_cases(&temp_dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_next_pending_follows_flags() {
        let temp_dir = worklist_dir(&["1.dcm", "2.dcm", "3.dcm"]);
        let cases = scan_cases(temp_dir.path()).unwrap();

        assert_eq!(next_pending(&cases, Stage::First), Some(&cases[0]));
        mark_complete(&cases[0], Stage::First).unwrap();
        mark_complete(&cases[1], Stage::First).unwrap();
        assert_eq!(next_pending(&cases, Stage::First), Some(&cases[2]));
        assert_eq!(next_pending(&cases, Stage::Second), Some(&cases[0]));
        assert_eq!(completed_count(&cases, Stage::First), 2);

        mark_complete(&cases[2], Stage::First).unwrap();
        assert_eq!(next_pending(&cases, Stage::First), None);
    }

    #[test]
    fn test_flag_files_are_not_cases() {
        let temp_dir = worklist_dir(&["1.dcm"]);
        let cases = scan_cases(temp_dir.path()).unwrap();
        mark_complete(&cases[0], Stage::Second).unwrap();

        assert_eq!(scan_cases(temp_dir.path()).unwrap().len(), 1);
    }
}
