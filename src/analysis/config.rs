//! Analysis run configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rules::{ActiveRules, CoverageThreshold, ThresholdError};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Config file is not valid TOML for this schema.
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
    /// Coverage rule parameter is invalid.
    #[error("invalid rule configuration: {0}")]
    Threshold(#[from] ThresholdError),
}

/// Whether a run analyses the report or does nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    /// Skip the analysis.
    Skip,
    /// Analyse an existing report.
    #[default]
    ReuseReport,
}

/// Raw settings of the coverage rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CoverageRuleSettings {
    /// Minimum detected percentage, validated when the rules are activated.
    pub threshold: String,
}

/// Raw rule settings as read from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RuleSettings {
    /// Survived-mutant rule on/off.
    #[serde(default = "default_true")]
    pub survived_mutant: bool,
    /// Coverage rule; absent means off.
    #[serde(default)]
    pub insufficient_coverage: Option<CoverageRuleSettings>,
}

fn default_true() -> bool {
    true
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            survived_mutant: true,
            insufficient_coverage: None,
        }
    }
}

impl RuleSettings {
    /// Validate into the rule set used by the evaluator.
    pub fn activate(&self) -> Result<ActiveRules, ThresholdError> {
        let insufficient_coverage = self
            .insufficient_coverage
            .as_ref()
            .map(|settings| settings.threshold.parse::<CoverageThreshold>())
            .transpose()?;
        Ok(ActiveRules {
            survived_mutant: self.survived_mutant,
            insufficient_coverage,
        })
    }
}

/// Configuration for an analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Project root; other paths are relative to it.
    #[serde(default = "default_project_dir")]
    pub project_dir: PathBuf,
    /// Directory holding the PIT report.
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
    /// Run mode.
    #[serde(default)]
    pub mode: ExecutionMode,
    /// Directories searched for mutated sources.
    #[serde(default = "default_source_roots")]
    pub source_roots: Vec<PathBuf>,
    /// Rule settings.
    #[serde(default)]
    pub rules: RuleSettings,
}

fn default_project_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("target").join("pit-reports")
}

fn default_source_roots() -> Vec<PathBuf> {
    vec![
        PathBuf::from("src/main/java"),
        PathBuf::from("src/main/kotlin"),
        PathBuf::from("."),
    ]
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            project_dir: default_project_dir(),
            report_dir: default_report_dir(),
            mode: ExecutionMode::default(),
            source_roots: default_source_roots(),
            rules: RuleSettings::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load from a TOML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Set project directory.
    pub fn with_project_dir(mut self, project_dir: impl Into<PathBuf>) -> Self {
        self.project_dir = project_dir.into();
        self
    }

    /// Set report directory.
    pub fn with_report_dir(mut self, report_dir: impl Into<PathBuf>) -> Self {
        self.report_dir = report_dir.into();
        self
    }

    /// Set run mode.
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replace source roots.
    pub fn with_source_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.source_roots = roots;
        self
    }

    /// Turn the survived-mutant rule on or off.
    pub fn with_survived_mutant_rule(mut self, active: bool) -> Self {
        self.rules.survived_mutant = active;
        self
    }

    /// Turn the coverage rule on with a raw threshold.
    pub fn with_coverage_threshold(mut self, threshold: impl Into<String>) -> Self {
        self.rules.insufficient_coverage = Some(CoverageRuleSettings {
            threshold: threshold.into(),
        });
        self
    }

    /// Report directory resolved against the project directory.
    pub fn resolved_report_dir(&self) -> PathBuf {
        self.project_dir.join(&self.report_dir)
    }

    /// Source roots resolved against the project directory.
    pub fn resolved_source_roots(&self) -> Vec<PathBuf> {
        self.source_roots
            .iter()
            .map(|root| self.project_dir.join(root))
            .collect()
    }

    /// Validated rule set.
    pub fn active_rules(&self) -> Result<ActiveRules, ConfigError> {
        Ok(self.rules.activate()?)
    }
}
