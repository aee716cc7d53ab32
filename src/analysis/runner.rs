//! Analysis run: locate report, parse, aggregate, evaluate rules, collect metrics.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::config::{AnalysisConfig, ConfigError, ExecutionMode};
use super::metrics::MutationMetrics;
use super::project::ProjectReport;
use super::rules::{ActiveRules, Finding};
use crate::domain::Mutant;
use crate::parser::{ParseError, parse_report_file};

/// File name PIT gives its XML report.
pub const REPORT_FILE_NAME: &str = "mutations.xml";

/// Run errors. Only structural report problems and invalid configuration end up here.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Report could not be parsed.
    #[error("report error: {0}")]
    Parse(#[from] ParseError),
    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Finds the report to analyse.
pub trait ReportLocator {
    /// Report path inside `report_dir`, or `None` when there is nothing to analyse.
    fn locate(&self, report_dir: &Path) -> Option<PathBuf>;
}

impl<F> ReportLocator for F
where
    F: Fn(&Path) -> Option<PathBuf>,
{
    fn locate(&self, report_dir: &Path) -> Option<PathBuf> {
        self(report_dir)
    }
}

/// Maps a project-relative source path to a tracked source handle.
pub trait SourceResolver<H> {
    /// Handle for `relative_path`, or `None` when the file is not tracked.
    fn resolve(&self, relative_path: &str) -> Option<H>;
}

impl<F, H> SourceResolver<H> for F
where
    F: Fn(&str) -> Option<H>,
{
    fn resolve(&self, relative_path: &str) -> Option<H> {
        self(relative_path)
    }
}

/// Accepts a report file directly, or `mutations.xml` inside a directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultReportLocator;

impl ReportLocator for DefaultReportLocator {
    fn locate(&self, report_dir: &Path) -> Option<PathBuf> {
        if report_dir.is_file() {
            return Some(report_dir.to_path_buf());
        }
        let candidate = report_dir.join(REPORT_FILE_NAME);
        candidate.is_file().then_some(candidate)
    }
}

/// Resolves sources under a list of roots.
///
/// `root/relative_path` wins when it exists. Otherwise each root is walked for a file whose
/// path ends with `relative_path`, so a bare `Hello.kt` finds `com/foo/Hello.kt`.
#[derive(Debug, Clone)]
pub struct RootsSourceResolver {
    roots: Vec<PathBuf>,
}

impl RootsSourceResolver {
    /// Search `roots` in order.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Resolver over the configured source roots.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.resolved_source_roots())
    }
}

impl SourceResolver<PathBuf> for RootsSourceResolver {
    fn resolve(&self, relative_path: &str) -> Option<PathBuf> {
        if let Some(exact) = self
            .roots
            .iter()
            .map(|root| root.join(relative_path))
            .find(|candidate| candidate.is_file())
        {
            return Some(exact);
        }
        let suffix = Path::new(relative_path);
        self.roots
            .iter()
            .find_map(|root| find_by_suffix(root, suffix))
    }
}

/// First file under `root`, in file name order, whose root-relative path ends with `suffix`.
fn find_by_suffix(root: &Path, suffix: &Path) -> Option<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            // Skip hidden and build output directories
            let name = entry.file_name().to_string_lossy();
            entry.depth() == 0
                || !(name.starts_with('.')
                    || name == "target"
                    || name == "build"
                    || name == "node_modules")
        })
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .find(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .is_ok_and(|relative| relative.ends_with(suffix))
        })
        .map(|entry| entry.into_path())
}

/// Findings and metrics for one resolved source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileAnalysis<H> {
    /// Relative path from the report.
    pub path: String,
    /// Handle returned by the resolver.
    pub source: H,
    /// Findings raised by active rules.
    pub findings: Vec<Finding>,
    /// File metrics.
    pub metrics: MutationMetrics,
}

/// Result of analysing a set of mutants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport<H> {
    /// Resolved files, ordered by path.
    pub files: Vec<FileAnalysis<H>>,
    /// Paths the resolver did not know.
    pub unresolved: Vec<String>,
    /// Sum over resolved files.
    pub project: MutationMetrics,
    /// Rules that were evaluated.
    pub rules: ActiveRules,
}

impl<H> AnalysisReport<H> {
    /// Every finding, file by file.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.files.iter().flat_map(|file| file.findings.iter())
    }

    /// Number of findings.
    pub fn finding_count(&self) -> usize {
        self.files.iter().map(|file| file.findings.len()).sum()
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnalysisOutcome<H> {
    /// Mode was skip.
    Skipped,
    /// No report in the report directory.
    NoReport {
        /// Directory that was searched.
        report_dir: PathBuf,
    },
    /// Report analysed.
    Completed {
        /// Report that was parsed.
        report: PathBuf,
        /// Analysis result.
        analysis: AnalysisReport<H>,
    },
}

/// Group, evaluate and measure already-parsed mutants.
pub fn analyze_mutants<H, R>(
    mutants: Vec<Mutant>,
    resolver: &R,
    rules: &ActiveRules,
) -> AnalysisReport<H>
where
    R: SourceResolver<H> + ?Sized,
{
    let project = ProjectReport::build(mutants);
    let mut files = Vec::new();
    let mut unresolved = Vec::new();

    for file in project.source_file_reports() {
        let Some(source) = resolver.resolve(file.relative_path()) else {
            warn!(path = file.relative_path(), "Mutation in an unknown resource");
            debug!(report = %file.to_json(), "File report");
            unresolved.push(file.relative_path().to_string());
            continue;
        };
        files.push(FileAnalysis {
            path: file.relative_path().to_string(),
            source,
            findings: rules.evaluate(file),
            metrics: MutationMetrics::from(*file.counts()),
        });
    }

    let project = MutationMetrics::sum(files.iter().map(|file| &file.metrics));
    AnalysisReport {
        files,
        unresolved,
        project,
        rules: *rules,
    }
}

/// Run a full analysis with the given collaborators.
pub fn run_analysis<H, L, R>(
    config: &AnalysisConfig,
    locator: &L,
    resolver: &R,
) -> Result<AnalysisOutcome<H>, AnalysisError>
where
    L: ReportLocator + ?Sized,
    R: SourceResolver<H> + ?Sized,
{
    let rules = config.active_rules()?;

    if config.mode == ExecutionMode::Skip {
        debug!("execution mode is skip, returning");
        return Ok(AnalysisOutcome::Skipped);
    }

    let report_dir = config.resolved_report_dir();
    let Some(report) = locator.locate(&report_dir) else {
        warn!(report_dir = %report_dir.display(), "No XML PIT report found");
        return Ok(AnalysisOutcome::NoReport { report_dir });
    };

    let mutants = parse_report_file(&report)?;
    debug!(report = %report.display(), mutants = mutants.len(), "parsed report");
    let analysis = analyze_mutants(mutants, resolver, &rules);
    info!(
        files = analysis.files.len(),
        unresolved = analysis.unresolved.len(),
        findings = analysis.finding_count(),
        "mutation analysis complete"
    );

    Ok(AnalysisOutcome::Completed { report, analysis })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::analysis::rules::{CoverageThreshold, RuleKey};
    use crate::domain::{MutantStatus, Mutator};

    const REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mutations>
<mutation detected="true" status="KILLED"><sourceFile>Bar.java</sourceFile><mutatedClass>com.foo.Bar</mutatedClass><lineNumber>10</lineNumber><mutator>org.pitest.mutationtest.engine.gregor.mutators.ReturnValsMutator</mutator></mutation>
<mutation detected="false" status="SURVIVED"><sourceFile>Bar.java</sourceFile><mutatedClass>com.foo.Bar</mutatedClass><lineNumber>10</lineNumber><mutator>org.pitest.mutationtest.engine.gregor.mutators.ReturnValsMutator</mutator></mutation>
<mutation detected="false" status="NO_COVERAGE"><sourceFile>Bar.java</sourceFile><mutatedClass>com.foo.Bar</mutatedClass><lineNumber>2</lineNumber><mutator>org.pitest.mutationtest.engine.gregor.mutators.ReturnValsMutator</mutator></mutation>
<mutation detected="false" status="SURVIVED"><sourceFile>Gone.java</sourceFile><mutatedClass>com.foo.Gone</mutatedClass><lineNumber>5</lineNumber><mutator>org.pitest.mutationtest.engine.gregor.mutators.MathMutator</mutator></mutation>
</mutations>"#;

    fn tracked(relative_path: &str) -> Option<String> {
        (relative_path == "com/foo/Bar.java").then(|| relative_path.to_string())
    }

    fn write_report(dir: &Path) {
        fs::create_dir_all(dir).expect("report dir should be created");
        fs::write(dir.join(REPORT_FILE_NAME), REPORT).expect("report should be written");
    }

    #[test]
    fn analyze_skips_unresolved_files() {
        let mutants = vec![
            Mutant::new(false, MutantStatus::Survived, "com.foo.Bar", 3, Mutator::Math),
            Mutant::new(false, MutantStatus::Survived, "com.foo.Gone", 4, Mutator::Math),
        ];
        let report = analyze_mutants(mutants, &tracked, &ActiveRules::default());
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].source, "com/foo/Bar.java");
        assert_eq!(report.unresolved, vec!["com/foo/Gone.java".to_string()]);
        assert_eq!(report.finding_count(), 1);
        assert_eq!(report.project.counts.total, 1);
    }

    #[test]
    fn skip_mode_does_nothing() {
        let config = AnalysisConfig::default().with_mode(ExecutionMode::Skip);
        let locator = |_: &Path| -> Option<PathBuf> { panic!("locator must not be called") };
        let outcome = run_analysis(&config, &locator, &tracked).expect("skip should succeed");
        assert_eq!(outcome, AnalysisOutcome::Skipped);
    }

    #[test]
    fn missing_report_is_not_an_error() {
        let tmp = tempdir().expect("tempdir should be created");
        let config = AnalysisConfig::default().with_project_dir(tmp.path());
        let outcome = run_analysis(&config, &DefaultReportLocator, &tracked)
            .expect("missing report should not fail");
        assert!(matches!(outcome, AnalysisOutcome::NoReport { .. }));
    }

    #[test]
    fn invalid_threshold_fails_before_parsing() {
        let tmp = tempdir().expect("tempdir should be created");
        let config = AnalysisConfig::default()
            .with_project_dir(tmp.path())
            .with_coverage_threshold("lots");
        let err = run_analysis(&config, &DefaultReportLocator, &tracked)
            .expect_err("threshold should be rejected");
        assert!(matches!(err, AnalysisError::Config(_)));
    }

    #[test]
    fn full_run_produces_findings_and_metrics() {
        let tmp = tempdir().expect("tempdir should be created");
        write_report(&tmp.path().join("target/pit-reports"));
        let config = AnalysisConfig::default()
            .with_project_dir(tmp.path())
            .with_coverage_threshold("50");

        let outcome =
            run_analysis(&config, &DefaultReportLocator, &tracked).expect("run should succeed");
        let AnalysisOutcome::Completed { analysis, .. } = outcome else {
            panic!("run should complete");
        };

        assert_eq!(analysis.files.len(), 1);
        assert_eq!(analysis.unresolved, vec!["com/foo/Gone.java".to_string()]);
        let file = &analysis.files[0];
        assert_eq!(file.metrics.counts.total, 3);
        assert_eq!(file.metrics.counts.detected, 1);
        let rules: Vec<_> = file.findings.iter().map(|f| f.rule).collect();
        assert_eq!(
            rules,
            vec![RuleKey::SurvivedMutant, RuleKey::InsufficientMutationCoverage]
        );
        assert_eq!(file.findings[0].line, Some(10));
        assert!(
            file.findings[1]
                .message
                .starts_with("1 more mutants need to be covered")
        );
    }

    #[test]
    fn rules_can_be_disabled() {
        let tmp = tempdir().expect("tempdir should be created");
        write_report(&tmp.path().join("target/pit-reports"));
        let config = AnalysisConfig::default()
            .with_project_dir(tmp.path())
            .with_survived_mutant_rule(false);
        let AnalysisOutcome::Completed { analysis, .. } =
            run_analysis(&config, &DefaultReportLocator, &tracked).expect("run should succeed")
        else {
            panic!("run should complete");
        };
        assert_eq!(analysis.finding_count(), 0);
        assert_eq!(analysis.project.counts.survived, 1);
    }

    #[test]
    fn broken_report_fails_the_run() {
        let tmp = tempdir().expect("tempdir should be created");
        let dir = tmp.path().join("target/pit-reports");
        fs::create_dir_all(&dir).expect("report dir should be created");
        fs::write(dir.join(REPORT_FILE_NAME), "<mutations><mutation>")
            .expect("report should be written");
        let config = AnalysisConfig::default().with_project_dir(tmp.path());
        let err = run_analysis(&config, &DefaultReportLocator, &tracked)
            .expect_err("truncated report should fail");
        assert!(matches!(err, AnalysisError::Parse(_)));
    }

    #[test]
    fn roots_resolver_finds_first_existing_file() {
        let tmp = tempdir().expect("tempdir should be created");
        let java = tmp.path().join("src/main/java/com/foo");
        fs::create_dir_all(&java).expect("source dir should be created");
        fs::write(java.join("Bar.java"), "class Bar {}").expect("source should be written");
        fs::write(tmp.path().join("Maze.kt"), "class Maze").expect("source should be written");

        let config = AnalysisConfig::default().with_project_dir(tmp.path());
        let resolver = RootsSourceResolver::from_config(&config);
        assert_eq!(
            resolver.resolve("com/foo/Bar.java"),
            Some(java.join("Bar.java"))
        );
        assert_eq!(resolver.resolve("Maze.kt"), Some(tmp.path().join("./Maze.kt")));
        assert_eq!(resolver.resolve("com/foo/Missing.java"), None);
    }

    #[test]
    fn roots_resolver_matches_bare_file_names_in_packages() {
        let tmp = tempdir().expect("tempdir should be created");
        let kotlin = tmp.path().join("src/main/kotlin/com/foo");
        fs::create_dir_all(&kotlin).expect("source dir should be created");
        fs::write(kotlin.join("Hello.kt"), "fun main() {}").expect("source should be written");
        let build = tmp.path().join("target/generated");
        fs::create_dir_all(&build).expect("build dir should be created");
        fs::write(build.join("Other.kt"), "fun other() {}").expect("source should be written");

        let config = AnalysisConfig::default().with_project_dir(tmp.path());
        let resolver = RootsSourceResolver::from_config(&config);
        assert_eq!(resolver.resolve("Hello.kt"), Some(kotlin.join("Hello.kt")));
        assert_eq!(resolver.resolve("foo/Hello.kt"), Some(kotlin.join("Hello.kt")));
        assert_eq!(resolver.resolve("llo.kt"), None);
        assert_eq!(resolver.resolve("Other.kt"), None);

        let mutants = vec![
            Mutant::new(false, MutantStatus::Survived, "com.foo.HelloKt", 3, Mutator::Math)
                .with_source_file("Hello.kt"),
        ];
        let report = analyze_mutants(mutants, &resolver, &ActiveRules::default());
        assert_eq!(report.files.len(), 1);
        assert!(report.unresolved.is_empty());
        assert_eq!(report.finding_count(), 1);
    }

    #[test]
    fn coverage_threshold_zero_never_fires() {
        let mutants = vec![Mutant::new(
            false,
            MutantStatus::NoCoverage,
            "com.foo.Bar",
            1,
            Mutator::Math,
        )];
        let rules = ActiveRules {
            survived_mutant: false,
            insufficient_coverage: Some(CoverageThreshold::new(0).expect("0 is valid")),
        };
        assert_eq!(analyze_mutants(mutants, &tracked, &rules).finding_count(), 0);
    }
}
