//! Outcome of a single mutant as reported by PIT.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Detection status of a mutant.
///
/// Parsing is an exact, case-sensitive match against the status strings PIT writes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutantStatus {
    /// A test failed with the mutant in place.
    Killed,
    /// Every test passed with the mutant in place.
    Survived,
    /// No test executes the mutated code.
    NoCoverage,
    /// The test run exceeded its time budget.
    TimedOut,
    /// The test run ran out of memory.
    MemoryError,
    /// Anything PIT reported that is not one of the above.
    #[default]
    Unknown,
}

impl MutantStatus {
    /// Every status, in report order.
    pub const ALL: [MutantStatus; 6] = [
        Self::Killed,
        Self::Survived,
        Self::NoCoverage,
        Self::TimedOut,
        Self::MemoryError,
        Self::Unknown,
    ];

    /// Parse a PIT status attribute. Absent, empty, or differently-cased input yields `Unknown`.
    pub fn parse<'a>(value: impl Into<Option<&'a str>>) -> Self {
        match value.into() {
            Some("KILLED") => Self::Killed,
            Some("SURVIVED") => Self::Survived,
            Some("NO_COVERAGE") => Self::NoCoverage,
            Some("TIMED_OUT") => Self::TimedOut,
            Some("MEMORY_ERROR") => Self::MemoryError,
            _ => Self::Unknown,
        }
    }

    /// The PIT spelling of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Killed => "KILLED",
            Self::Survived => "SURVIVED",
            Self::NoCoverage => "NO_COVERAGE",
            Self::TimedOut => "TIMED_OUT",
            Self::MemoryError => "MEMORY_ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for MutantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
