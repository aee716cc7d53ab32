//! Human-readable and machine-friendly rendering of analysis results.

use std::collections::BTreeMap;

use serde::Serialize;

use super::metrics::{MutationMetrics, PITEST_DOMAIN};
use super::rules::{COVERAGE_RATIO_PARAM, Finding, REPOSITORY_KEY, RuleKey};
use super::runner::AnalysisReport;

/// Supported output formats for analysis results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Markdown summary.
    Markdown,
    /// JSON with files, findings and metrics inline.
    Json,
    /// SARIF format for GitHub Code Scanning.
    Sarif,
}

/// Per-file entry for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport<'a> {
    /// Relative source path.
    pub path: &'a str,
    /// File metrics.
    pub metrics: &'a MutationMetrics,
    /// Metric values keyed by metric key.
    pub measures: BTreeMap<&'static str, f64>,
    /// Findings on the file.
    pub findings: &'a [Finding],
}

fn measure_map(metrics: &MutationMetrics) -> BTreeMap<&'static str, f64> {
    metrics
        .measures()
        .into_iter()
        .map(|measure| (measure.key, measure.value))
        .collect()
}

fn format_percent(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}%"))
}

/// Render analysis results in the requested format.
pub fn render_analysis<H>(analysis: &AnalysisReport<H>, format: ReportFormat) -> String {
    let files: Vec<FileReport<'_>> = analysis
        .files
        .iter()
        .map(|file| FileReport {
            path: &file.path,
            metrics: &file.metrics,
            measures: measure_map(&file.metrics),
            findings: &file.findings,
        })
        .collect();

    match format {
        ReportFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
            "domain": PITEST_DOMAIN,
            "repository": REPOSITORY_KEY,
            "summary": analysis.project,
            "measures": measure_map(&analysis.project),
            "finding_count": analysis.finding_count(),
            "files": files,
            "unresolved": analysis.unresolved,
        }))
        .unwrap_or_else(|err| format!("{{\"error\": \"{err}\"}}")),
        ReportFormat::Markdown => render_markdown(analysis, &files),
        ReportFormat::Sarif => render_sarif(analysis),
    }
}

fn render_markdown<H>(analysis: &AnalysisReport<H>, files: &[FileReport<'_>]) -> String {
    let summary = &analysis.project;
    let mut out = String::from("# Mutation Analysis\n\n");

    out.push_str("## Summary\n\n| metric | value |\n|---|---:|\n");
    out.push_str(&format!("| files | {} |\n", files.len()));
    out.push_str(&format!("| total | {} |\n", summary.counts.total));
    out.push_str(&format!("| detected | {} |\n", summary.counts.detected));
    out.push_str(&format!("| killed | {} |\n", summary.counts.killed));
    out.push_str(&format!("| survived | {} |\n", summary.counts.survived));
    out.push_str(&format!("| no coverage | {} |\n", summary.counts.no_coverage));
    out.push_str(&format!("| timed out | {} |\n", summary.counts.timed_out));
    out.push_str(&format!("| memory error | {} |\n", summary.counts.memory_error));
    out.push_str(&format!("| unknown | {} |\n", summary.counts.unknown));
    out.push_str(&format!(
        "| mutation coverage | {} |\n",
        format_percent(summary.coverage_percent)
    ));
    out.push_str(&format!(
        "| killed percent | {} |\n",
        format_percent(summary.killed_percent)
    ));

    if !files.is_empty() {
        out.push_str("\n## Files\n\n| file | total | detected | survived | coverage |\n|---|---:|---:|---:|---:|\n");
        for file in files {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                file.path,
                file.metrics.counts.total,
                file.metrics.counts.detected,
                file.metrics.counts.survived,
                format_percent(file.metrics.coverage_percent)
            ));
        }
    }

    if analysis.finding_count() > 0 {
        out.push_str("\n## Findings\n\n");
        for finding in analysis.findings() {
            let location = match finding.line {
                Some(line) => format!("{}:{}", finding.path, line),
                None => finding.path.clone(),
            };
            out.push_str(&format!(
                "- **{}** `{}`: {}\n",
                finding.rule.title(),
                location,
                finding.message
            ));
        }
    }

    if !analysis.unresolved.is_empty() {
        out.push_str("\n## Unresolved sources\n\n");
        for path in &analysis.unresolved {
            out.push_str(&format!("- {path}\n"));
        }
    }

    out
}

fn render_sarif<H>(analysis: &AnalysisReport<H>) -> String {
    let results: Vec<serde_json::Value> = analysis
        .findings()
        .map(|finding| {
            let mut physical = serde_json::json!({
                "artifactLocation": {
                    "uri": finding.path
                }
            });
            if let Some(line) = finding.line.filter(|line| *line > 0) {
                physical["region"] = serde_json::json!({ "startLine": line });
            }
            serde_json::json!({
                "ruleId": finding.rule.as_str(),
                "level": "warning",
                "message": {
                    "text": finding.message
                },
                "locations": [{
                    "physicalLocation": physical
                }]
            })
        })
        .collect();

    let rules: Vec<serde_json::Value> = RuleKey::ALL
        .iter()
        .map(|rule| {
            let mut properties = serde_json::json!({ "repository": REPOSITORY_KEY });
            if let (RuleKey::InsufficientMutationCoverage, Some(threshold)) =
                (rule, analysis.rules.insufficient_coverage)
            {
                properties[COVERAGE_RATIO_PARAM] = serde_json::json!(threshold.percent());
            }
            serde_json::json!({
                "id": rule.as_str(),
                "shortDescription": {
                    "text": rule.title()
                },
                "fullDescription": {
                    "text": rule.explanation()
                },
                "defaultConfiguration": {
                    "level": "warning"
                },
                "properties": properties
            })
        })
        .collect();

    serde_json::to_string_pretty(&serde_json::json!({
        "$schema": "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json",
        "version": "2.1.0",
        "runs": [{
            "tool": {
                "driver": {
                    "name": "pitest-quality",
                    "version": env!("CARGO_PKG_VERSION"),
                    "rules": rules
                }
            },
            "results": results,
            "properties": {
                "mutationCoverage": analysis.project.coverage_percent,
                "totalMutants": analysis.project.counts.total,
                "detected": analysis.project.counts.detected,
                "survived": analysis.project.counts.survived
            }
        }]
    }))
    .unwrap_or_else(|err| format!("{{\"error\": \"{err}\"}}"))
}
