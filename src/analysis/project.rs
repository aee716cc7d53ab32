//! Grouping of mutants by source file.

use std::collections::BTreeMap;
use std::ops::AddAssign;

use serde::Serialize;

use crate::domain::{Mutant, MutantStatus};

/// Per-category mutant counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MutationCounts {
    /// All mutants.
    pub total: usize,
    /// Mutants flagged `detected`.
    pub detected: usize,
    /// Status `KILLED`.
    pub killed: usize,
    /// Status `SURVIVED`.
    pub survived: usize,
    /// Status `NO_COVERAGE`.
    pub no_coverage: usize,
    /// Status `MEMORY_ERROR`.
    pub memory_error: usize,
    /// Status `TIMED_OUT`.
    pub timed_out: usize,
    /// Any other status.
    pub unknown: usize,
}

impl MutationCounts {
    /// Count one mutant.
    pub fn record(&mut self, mutant: &Mutant) {
        self.total += 1;
        if mutant.detected() {
            self.detected += 1;
        }
        match mutant.status() {
            MutantStatus::Killed => self.killed += 1,
            MutantStatus::Survived => self.survived += 1,
            MutantStatus::NoCoverage => self.no_coverage += 1,
            MutantStatus::MemoryError => self.memory_error += 1,
            MutantStatus::TimedOut => self.timed_out += 1,
            MutantStatus::Unknown => self.unknown += 1,
        }
    }

    /// Counts for a collection of mutants.
    pub fn of<'a>(mutants: impl IntoIterator<Item = &'a Mutant>) -> Self {
        let mut counts = Self::default();
        for mutant in mutants {
            counts.record(mutant);
        }
        counts
    }

    /// `100 * detected / total`, or `None` without mutants.
    pub fn detected_percent(&self) -> Option<f64> {
        percent(self.detected, self.total)
    }

    /// `100 * killed / total`, or `None` without mutants.
    pub fn killed_percent(&self) -> Option<f64> {
        percent(self.killed, self.total)
    }
}

fn percent(part: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| part as f64 * 100.0 / total as f64)
}

impl AddAssign for MutationCounts {
    fn add_assign(&mut self, other: Self) {
        self.total += other.total;
        self.detected += other.detected;
        self.killed += other.killed;
        self.survived += other.survived;
        self.no_coverage += other.no_coverage;
        self.memory_error += other.memory_error;
        self.timed_out += other.timed_out;
        self.unknown += other.unknown;
    }
}

/// Mutants that share one source path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceFileReport {
    relative_path: String,
    counts: MutationCounts,
    mutants: Vec<Mutant>,
}

impl SourceFileReport {
    fn new(relative_path: String, mutants: Vec<Mutant>) -> Self {
        let counts = MutationCounts::of(&mutants);
        Self {
            relative_path,
            counts,
            mutants,
        }
    }

    /// Source path shared by every mutant in the group.
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    /// Mutants in report order.
    pub fn mutants(&self) -> &[Mutant] {
        &self.mutants
    }

    /// Category counts.
    pub fn counts(&self) -> &MutationCounts {
        &self.counts
    }

    /// Number of mutants.
    pub fn mutations_total(&self) -> usize {
        self.counts.total
    }

    /// Number of mutants flagged detected.
    pub fn mutations_detected(&self) -> usize {
        self.counts.detected
    }

    /// Compact JSON rendering, used in diagnostics.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| format!("{{\"error\":\"{err}\"}}"))
    }
}

/// All source file reports of one analysis run, keyed by relative path.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectReport {
    files: BTreeMap<String, SourceFileReport>,
}

impl ProjectReport {
    /// Group `mutants` by [`Mutant::source_relative_path`].
    pub fn build(mutants: impl IntoIterator<Item = Mutant>) -> Self {
        let mut groups: BTreeMap<String, Vec<Mutant>> = BTreeMap::new();
        for mutant in mutants {
            groups
                .entry(mutant.source_relative_path().to_string())
                .or_default()
                .push(mutant);
        }
        let files = groups
            .into_iter()
            .map(|(path, mutants)| (path.clone(), SourceFileReport::new(path, mutants)))
            .collect();
        Self { files }
    }

    /// File reports ordered by path.
    pub fn source_file_reports(&self) -> impl Iterator<Item = &SourceFileReport> {
        self.files.values()
    }

    /// Report for one path.
    pub fn source_file_report(&self, relative_path: &str) -> Option<&SourceFileReport> {
        self.files.get(relative_path)
    }

    /// Number of distinct source files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True when the report held no mutants.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Counts over every file.
    pub fn totals(&self) -> MutationCounts {
        let mut totals = MutationCounts::default();
        for file in self.files.values() {
            totals += file.counts;
        }
        totals
    }
}
