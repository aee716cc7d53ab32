//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used items from this crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use pitest_quality::prelude::*;
//! ```

pub use crate::analysis::{
    ActiveRules, AnalysisConfig, AnalysisOutcome, AnalysisReport, CoverageThreshold,
    DefaultReportLocator, ExecutionMode, Finding, MutationCounts, MutationMetrics, ProjectReport,
    ReportFormat, RootsSourceResolver, RuleKey, SourceFileReport, analyze_mutants,
    render_analysis, run_analysis,
};
pub use crate::domain::{Mutant, MutantStatus, Mutator};
pub use crate::parser::{ParseError, parse_report, parse_report_file};
