//! # pitest-quality
//!
//! `pitest-quality` turns a PIT `mutations.xml` report into per-file mutation metrics and
//! actionable findings. It is organized around:
//! - `domain`: mutation operators, statuses and mutant records
//! - `parser`: streaming, fault-tolerant report parsing
//! - `analysis`: grouping by source file, rule evaluation, metrics, run orchestration and rendering
//!
//! Locating sources and persisting results belong to the caller, through the
//! [`analysis::ReportLocator`] and [`analysis::SourceResolver`] seams.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

pub mod analysis;
pub mod domain;
pub mod parser;
pub mod prelude;

pub use parser::{ParseError, parse_report, parse_report_file};
