//! Aggregation, rule evaluation and run orchestration on top of parsed reports.

pub mod config;
pub mod metrics;
pub mod project;
pub mod render;
pub mod rules;
pub mod runner;

pub use config::{AnalysisConfig, ConfigError, CoverageRuleSettings, ExecutionMode, RuleSettings};
pub use metrics::{Measure, MutationMetrics};
pub use project::{MutationCounts, ProjectReport, SourceFileReport};
pub use render::{ReportFormat, render_analysis};
pub use rules::{
    ActiveRules, CoverageThreshold, Finding, RuleKey, ThresholdError,
    insufficient_coverage_finding, survived_mutant_findings,
};
pub use runner::{
    AnalysisError, AnalysisOutcome, AnalysisReport, DefaultReportLocator, FileAnalysis,
    ReportLocator, RootsSourceResolver, SourceResolver, analyze_mutants, run_analysis,
};
