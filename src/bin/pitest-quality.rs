use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use pitest_quality::analysis::{
    AnalysisConfig, AnalysisOutcome, DefaultReportLocator, ProjectReport, ReportFormat,
    ReportLocator, RootsSourceResolver, render_analysis, run_analysis,
};
use pitest_quality::parser::parse_report_file;

#[derive(Debug, Parser)]
#[command(name = "pitest-quality")]
#[command(about = "Mutation analysis for PIT reports")]
struct Cli {
    /// Log at debug level.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyse a report: findings, metrics and unresolved sources.
    Analyze {
        #[command(flatten)]
        target: TargetArgs,
        /// Minimum mutation coverage percentage; turns the coverage rule on.
        #[arg(long)]
        threshold: Option<String>,
        /// Turn the survived-mutant rule off.
        #[arg(long)]
        no_survived_rule: bool,
        /// Output format.
        #[arg(long, value_enum, default_value = "md")]
        format: OutputFormat,
        /// Exit with status 2 when any finding is raised.
        #[arg(long)]
        fail_on_findings: bool,
    },
    /// Per-file counts for every file in a report.
    Summary {
        #[command(flatten)]
        target: TargetArgs,
        /// Emit JSON output.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
struct TargetArgs {
    /// Project directory.
    #[arg(long)]
    project: Option<PathBuf>,
    /// Report directory, relative to the project.
    #[arg(long)]
    report_dir: Option<PathBuf>,
    /// Report file; overrides the report directory lookup.
    #[arg(long)]
    report: Option<PathBuf>,
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Markdown
    Md,
    /// JSON
    Json,
    /// SARIF 2.1.0
    Sarif,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Md => ReportFormat::Markdown,
            OutputFormat::Json => ReportFormat::Json,
            OutputFormat::Sarif => ReportFormat::Sarif,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = if verbose {
        EnvFilter::new(default)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn make_config(target: &TargetArgs) -> Result<AnalysisConfig> {
    let mut config = match &target.config {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(project) = &target.project {
        config = config.with_project_dir(project);
    }
    if let Some(report_dir) = &target.report_dir {
        config = config.with_report_dir(report_dir);
    }
    Ok(config)
}

fn report_locator(target: &TargetArgs) -> impl Fn(&Path) -> Option<PathBuf> + '_ {
    move |report_dir: &Path| match &target.report {
        Some(report) => report.is_file().then(|| report.clone()),
        None => DefaultReportLocator.locate(report_dir),
    }
}

fn analyze(
    target: &TargetArgs,
    threshold: Option<String>,
    no_survived_rule: bool,
    format: OutputFormat,
    fail_on_findings: bool,
) -> Result<()> {
    let mut config = make_config(target)?;
    if let Some(threshold) = threshold {
        config = config.with_coverage_threshold(threshold);
    }
    if no_survived_rule {
        config = config.with_survived_mutant_rule(false);
    }

    let resolver = RootsSourceResolver::from_config(&config);
    let outcome = run_analysis(&config, &report_locator(target), &resolver)?;
    match outcome {
        AnalysisOutcome::Skipped => {
            println!("analysis skipped");
        }
        AnalysisOutcome::NoReport { report_dir } => {
            println!("no PIT report found in {}", report_dir.display());
        }
        AnalysisOutcome::Completed { analysis, .. } => {
            println!("{}", render_analysis(&analysis, format.into()));
            if fail_on_findings && analysis.finding_count() > 0 {
                process::exit(2);
            }
        }
    }
    Ok(())
}

fn summary(target: &TargetArgs, json: bool) -> Result<()> {
    let config = make_config(target)?;
    let report_dir = config.resolved_report_dir();
    let Some(report) = report_locator(target)(&report_dir) else {
        println!("no PIT report found in {}", report_dir.display());
        return Ok(());
    };
    let mutants = parse_report_file(&report)
        .with_context(|| format!("failed to parse {}", report.display()))?;
    let project = ProjectReport::build(mutants);

    if json {
        let files: Vec<_> = project
            .source_file_reports()
            .map(|file| {
                serde_json::json!({
                    "path": file.relative_path(),
                    "counts": file.counts(),
                })
            })
            .collect();
        let output = serde_json::json!({
            "report": report.display().to_string(),
            "totals": project.totals(),
            "files": files,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("file\ttotal\tdetected\tkilled\tsurvived\tno_coverage");
    for file in project.source_file_reports() {
        let counts = file.counts();
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            file.relative_path(),
            counts.total,
            counts.detected,
            counts.killed,
            counts.survived,
            counts.no_coverage
        );
    }
    let totals = project.totals();
    println!(
        "summary: files={}, total={}, detected={}, survived={}",
        project.len(),
        totals.total,
        totals.detected,
        totals.survived
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Analyze {
            target,
            threshold,
            no_survived_rule,
            format,
            fail_on_findings,
        } => analyze(&target, threshold, no_survived_rule, format, fail_on_findings),
        Command::Summary { target, json } => summary(&target, json),
    }
}
