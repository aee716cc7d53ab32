//! Survived-mutant and insufficient-coverage rules.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use super::project::SourceFileReport;
use crate::domain::MutantStatus;

/// Rule repository key.
pub const REPOSITORY_KEY: &str = "pitest";
/// Name of the coverage rule's threshold parameter.
pub const COVERAGE_RATIO_PARAM: &str = "minimumMutationCoverage";

/// Identity of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleKey {
    /// One finding per survived mutant.
    SurvivedMutant,
    /// One finding per file under the coverage threshold.
    InsufficientMutationCoverage,
}

impl RuleKey {
    /// Every rule.
    pub const ALL: [RuleKey; 2] = [Self::SurvivedMutant, Self::InsufficientMutationCoverage];

    /// Stable rule key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SurvivedMutant => "pitest.survived.mutant",
            Self::InsufficientMutationCoverage => "pitest.insufficient.mutation.coverage",
        }
    }

    /// Short rule title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::SurvivedMutant => "Survived mutant",
            Self::InsufficientMutationCoverage => "Insufficient mutation coverage",
        }
    }

    /// One-sentence rule explanation.
    pub fn explanation(&self) -> &'static str {
        match self {
            Self::SurvivedMutant => {
                "A mutation that was not caught by any test, indicating a gap in the test suite."
            }
            Self::InsufficientMutationCoverage => {
                "The share of detected mutants in the file is below the configured minimum."
            }
        }
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RuleKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single issue raised against a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Rule that raised it.
    pub rule: RuleKey,
    /// Relative path of the file.
    pub path: String,
    /// Line, for line-level findings.
    pub line: Option<u32>,
    /// Human-readable message.
    pub message: String,
}

/// Invalid coverage threshold configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThresholdError {
    /// Not an integer.
    #[error("coverage threshold `{value}` is not an integer")]
    NotANumber {
        /// Raw configured value.
        value: String,
    },
    /// Outside 0..=100.
    #[error("coverage threshold {value} is outside 0..=100")]
    OutOfRange {
        /// Parsed value.
        value: i64,
    },
}

/// Minimum detected-mutant percentage, validated to 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct CoverageThreshold(u8);

impl CoverageThreshold {
    /// Build from a percentage.
    pub fn new(percent: u8) -> Result<Self, ThresholdError> {
        if percent > 100 {
            return Err(ThresholdError::OutOfRange {
                value: i64::from(percent),
            });
        }
        Ok(Self(percent))
    }

    /// The percentage.
    pub fn percent(&self) -> u8 {
        self.0
    }
}

impl FromStr for CoverageThreshold {
    type Err = ThresholdError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value: i64 = raw.trim().parse().map_err(|_| ThresholdError::NotANumber {
            value: raw.to_string(),
        })?;
        let percent = u8::try_from(value).map_err(|_| ThresholdError::OutOfRange { value })?;
        Self::new(percent).map_err(|_| ThresholdError::OutOfRange { value })
    }
}

/// Which rules apply to a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActiveRules {
    /// Survived-mutant rule on/off.
    pub survived_mutant: bool,
    /// Coverage rule threshold, when the rule is on.
    pub insufficient_coverage: Option<CoverageThreshold>,
}

impl Default for ActiveRules {
    fn default() -> Self {
        Self {
            survived_mutant: true,
            insufficient_coverage: None,
        }
    }
}

impl ActiveRules {
    /// No rule active.
    pub fn none() -> Self {
        Self {
            survived_mutant: false,
            insufficient_coverage: None,
        }
    }

    /// Evaluate every active rule against one file.
    pub fn evaluate(&self, file: &SourceFileReport) -> Vec<Finding> {
        let mut findings = Vec::new();
        if self.survived_mutant {
            findings.extend(survived_mutant_findings(file));
        }
        if let Some(threshold) = self.insufficient_coverage {
            findings.extend(insufficient_coverage_finding(file, threshold));
        }
        findings
    }
}

/// One finding per `SURVIVED` mutant, at the mutant's line.
pub fn survived_mutant_findings(file: &SourceFileReport) -> Vec<Finding> {
    file.mutants()
        .iter()
        .filter(|mutant| mutant.status() == MutantStatus::Survived)
        .map(|mutant| Finding {
            rule: RuleKey::SurvivedMutant,
            path: file.relative_path().to_string(),
            line: Some(mutant.line_number()),
            message: mutant.violation_description(),
        })
        .collect()
}

/// At most one file-level finding when the detected share is below `threshold`.
pub fn insufficient_coverage_finding(
    file: &SourceFileReport,
    threshold: CoverageThreshold,
) -> Option<Finding> {
    let total = file.mutations_total();
    let detected = file.mutations_detected();
    if total == 0 {
        return None;
    }
    let threshold = usize::from(threshold.percent());
    if (detected as f64) * 100.0 / (total as f64) >= threshold as f64 {
        return None;
    }
    let missing = (total * threshold / 100).saturating_sub(detected).max(1);
    Some(Finding {
        rule: RuleKey::InsufficientMutationCoverage,
        path: file.relative_path().to_string(),
        line: None,
        message: format!(
            "{missing} more mutants need to be covered by unit tests to reach the minimum threshold of {threshold}% mutant coverage"
        ),
    })
}
