//! Numeric measures emitted for each resolved source file and for the project.

use serde::Serialize;

use super::project::MutationCounts;

/// Metric domain label.
pub const PITEST_DOMAIN: &str = "Mutation analysis";

/// Metric key.
pub const MUTATIONS_TOTAL_KEY: &str = "pitest_mutations_total";
/// Metric key.
pub const MUTATIONS_DETECTED_KEY: &str = "pitest_mutations_detected";
/// Metric key.
pub const MUTATIONS_KILLED_KEY: &str = "pitest_mutations_killed";
/// Metric key.
pub const MUTATIONS_SURVIVED_KEY: &str = "pitest_mutations_survived";
/// Metric key.
pub const MUTATIONS_NO_COVERAGE_KEY: &str = "pitest_mutations_noCoverage";
/// Metric key.
pub const MUTATIONS_MEMORY_ERROR_KEY: &str = "pitest_mutations_memoryError";
/// Metric key.
pub const MUTATIONS_TIMED_OUT_KEY: &str = "pitest_mutations_timedOut";
/// Metric key.
pub const MUTATIONS_UNKNOWN_KEY: &str = "pitest_mutations_unknown";
/// Metric key.
pub const MUTATIONS_COVERAGE_KEY: &str = "pitest_mutations_coverage";
/// Metric key.
pub const MUTATIONS_KILLED_PERCENT_KEY: &str = "pitest_mutations_killed_percent";

/// One measure value keyed by metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measure {
    /// Metric key.
    pub key: &'static str,
    /// Value; counts are whole numbers, percentages are 0..=100.
    pub value: f64,
}

/// Measures derived from a set of counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MutationMetrics {
    /// Raw counts.
    #[serde(flatten)]
    pub counts: MutationCounts,
    /// `100 * detected / total`.
    pub coverage_percent: Option<f64>,
    /// `100 * killed / total`.
    pub killed_percent: Option<f64>,
}

impl From<MutationCounts> for MutationMetrics {
    fn from(counts: MutationCounts) -> Self {
        Self {
            counts,
            coverage_percent: counts.detected_percent(),
            killed_percent: counts.killed_percent(),
        }
    }
}

impl MutationMetrics {
    /// Sum of several metric sets, with percentages recomputed from the summed counts.
    pub fn sum<'a>(parts: impl IntoIterator<Item = &'a MutationMetrics>) -> Self {
        let mut counts = MutationCounts::default();
        for part in parts {
            counts += part.counts;
        }
        Self::from(counts)
    }

    /// Flat measure list; percentages are omitted when there are no mutants.
    pub fn measures(&self) -> Vec<Measure> {
        let c = &self.counts;
        let mut out = vec![
            Measure {
                key: MUTATIONS_TOTAL_KEY,
                value: c.total as f64,
            },
            Measure {
                key: MUTATIONS_DETECTED_KEY,
                value: c.detected as f64,
            },
            Measure {
                key: MUTATIONS_KILLED_KEY,
                value: c.killed as f64,
            },
            Measure {
                key: MUTATIONS_SURVIVED_KEY,
                value: c.survived as f64,
            },
            Measure {
                key: MUTATIONS_NO_COVERAGE_KEY,
                value: c.no_coverage as f64,
            },
            Measure {
                key: MUTATIONS_MEMORY_ERROR_KEY,
                value: c.memory_error as f64,
            },
            Measure {
                key: MUTATIONS_TIMED_OUT_KEY,
                value: c.timed_out as f64,
            },
            Measure {
                key: MUTATIONS_UNKNOWN_KEY,
                value: c.unknown as f64,
            },
        ];
        if let Some(value) = self.coverage_percent {
            out.push(Measure {
                key: MUTATIONS_COVERAGE_KEY,
                value,
            });
        }
        if let Some(value) = self.killed_percent {
            out.push(Measure {
                key: MUTATIONS_KILLED_PERCENT_KEY,
                value,
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(total: usize, detected: usize, killed: usize) -> MutationCounts {
        MutationCounts {
            total,
            detected,
            killed,
            no_coverage: total - detected,
            ..MutationCounts::default()
        }
    }

    #[test]
    fn percentages_follow_counts() {
        let metrics = MutationMetrics::from(counts(8, 4, 2));
        assert_eq!(metrics.coverage_percent, Some(50.0));
        assert_eq!(metrics.killed_percent, Some(25.0));
        let keys: Vec<_> = metrics.measures().iter().map(|m| m.key).collect();
        assert_eq!(keys.len(), 10);
        assert!(keys.contains(&MUTATIONS_KILLED_PERCENT_KEY));
    }

    #[test]
    fn no_percentages_without_mutants() {
        let metrics = MutationMetrics::from(MutationCounts::default());
        assert_eq!(metrics.coverage_percent, None);
        let keys: Vec<_> = metrics.measures().iter().map(|m| m.key).collect();
        assert!(!keys.contains(&MUTATIONS_COVERAGE_KEY));
        assert_eq!(keys.len(), 8);
    }

    #[test]
    fn sum_recomputes_ratios() {
        let a = MutationMetrics::from(counts(2, 2, 2));
        let b = MutationMetrics::from(counts(8, 0, 0));
        let total = MutationMetrics::sum([&a, &b]);
        assert_eq!(total.counts.total, 10);
        assert_eq!(total.coverage_percent, Some(20.0));
    }

    #[test]
    fn json_is_flat() {
        let json = serde_json::to_value(MutationMetrics::from(counts(4, 1, 1)))
            .expect("metrics should serialize");
        assert_eq!(json["total"], 4);
        assert_eq!(json["coverage_percent"], 25.0);
    }
}
