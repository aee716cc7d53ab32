//! One mutation occurrence read from a PIT report.

use serde::Serialize;

use super::mutator::Mutator;
use super::status::MutantStatus;

/// Immutable record of a single mutant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mutant {
    detected: bool,
    status: MutantStatus,
    class_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<String>,
    line_number: u32,
    mutator: Mutator,
    source_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    killing_test: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

/// Relative path of the Java source that declares `class_name`.
///
/// `com.foo.Bar$1` maps to `com/foo/Bar.java`.
pub fn java_source_path(class_name: &str) -> String {
    let outer = class_name
        .split_once('$')
        .map_or(class_name, |(outer, _)| outer);
    format!("{}.java", outer.replace('.', "/"))
}

impl Mutant {
    /// Build a mutant whose source path is derived from its class name.
    pub fn new(
        detected: bool,
        status: MutantStatus,
        class_name: impl Into<String>,
        line_number: u32,
        mutator: Mutator,
    ) -> Self {
        let class_name = class_name.into();
        let source_path = java_source_path(&class_name);
        Self {
            detected,
            status,
            class_name,
            method: None,
            line_number,
            mutator,
            source_path,
            killing_test: None,
            description: None,
        }
    }

    /// Use `source_file` verbatim as the relative source path (non-Java sources).
    pub fn with_source_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_path = source_file.into();
        self
    }

    /// Set the mutated method name.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Set the test that killed this mutant.
    pub fn with_killing_test(mut self, killing_test: impl Into<String>) -> Self {
        self.killing_test = Some(killing_test.into());
        self
    }

    /// Set PIT's free-text description of the change.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn attach_killing_test(&mut self, killing_test: String) {
        self.killing_test = Some(killing_test);
    }

    pub(crate) fn attach_description(&mut self, description: String) {
        self.description = Some(description);
    }

    /// Whether PIT flagged the mutant as detected.
    pub fn detected(&self) -> bool {
        self.detected
    }

    /// Reported status.
    pub fn status(&self) -> MutantStatus {
        self.status
    }

    /// Fully-qualified mutated class, possibly with a `$` inner-class suffix.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Mutated method, when reported.
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// 1-based source line; 0 when unknown.
    ///
    /// Reports are read as unsigned, so a missing, non-numeric or negative `lineNumber`
    /// all end up as 0.
    pub fn line_number(&self) -> u32 {
        self.line_number
    }

    /// Operator that produced the mutant.
    pub fn mutator(&self) -> Mutator {
        self.mutator
    }

    /// Test that killed the mutant, when reported.
    pub fn killing_test(&self) -> Option<&str> {
        self.killing_test.as_deref()
    }

    /// PIT's description of the change, when reported.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Project-relative path of the source file this mutant belongs to.
    pub fn source_relative_path(&self) -> &str {
        &self.source_path
    }

    /// Message used for a survived-mutant finding.
    pub fn violation_description(&self) -> String {
        format!("{} without breaking the tests", self.mutator.description())
    }
}
