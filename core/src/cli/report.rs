use crate::scoring::ZoneScores;
use crate::worklist::{CaseEntry, Stage};
use std::fmt;

/// Text report formatter for zone scores
pub struct ZoneScoreReport<'a> {
    scores: &'a ZoneScores,
}

impl<'a> ZoneScoreReport<'a> {
    /// Creates a new text report
    pub fn new(scores: &'a ZoneScores) -> Self {
        Self { scores }
    }
}

impl<'a> fmt::Display for ZoneScoreReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Zone Scores")?;
        writeln!(f, "===========")?;
        writeln!(f)?;
        writeln!(f, "Zone  Score  Lesions")?;
        for (zone, score) in self.scores.iter() {
            writeln!(
                f,
                "{:<5} {:<6} {}",
                zone.label(),
                score.value(),
                self.scores.lesion_count(zone)
            )?;
        }
        writeln!(f)?;

        writeln!(f, "General Zones")?;
        writeln!(f, "-------------")?;
        for (general, score) in self.scores.iter_general() {
            writeln!(f, "{:<5} {}", general.number(), score)?;
        }
        writeln!(f)?;

        writeln!(f, "Unassigned:     {}", self.scores.unassigned())?;
        writeln!(f, "Total:          {}", self.scores.total())?;

        Ok(())
    }
}

/// Text report formatter for a case worklist
pub struct WorklistReport<'a> {
    cases: &'a [CaseEntry],
    stage: Stage,
}

impl<'a> WorklistReport<'a> {
    pub fn new(cases: &'a [CaseEntry], stage: Stage) -> Self {
        Self { cases, stage }
    }
}

impl<'a> fmt::Display for WorklistReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let done = self
            .cases
            .iter()
            .filter(|case| case.is_complete(self.stage))
            .count();
        writeln!(f, "Worklist ({})", self.stage)?;
        writeln!(f, "{} of {} cases done", done, self.cases.len())?;
        writeln!(f)?;
        for case in self.cases {
            let mark = if case.is_complete(self.stage) { "x" } else { " " };
            writeln!(f, "[{}] {}", mark, case.name())?;
        }
        Ok(())
    }
}
