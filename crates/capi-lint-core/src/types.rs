//! Core types for findings and reports.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level for findings, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail analysis.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Low-impact posture gap.
    Low,
    /// Posture gap that should be planned for.
    Medium,
    /// Posture gap that should be fixed before production use.
    High,
    /// Error that must be fixed.
    Error,
}

impl Severity {
    /// All severities, most severe first.
    pub const DESCENDING: [Severity; 6] = [
        Self::Error,
        Self::High,
        Self::Medium,
        Self::Low,
        Self::Warning,
        Self::Info,
    ];

    /// Lowercase name as used in configuration and JSON output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// One reported issue against a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Rule code (e.g., "CL001"), stamped by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Rule name (e.g., "required-fields"), stamped by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    /// Severity of this finding.
    pub severity: Severity,
    /// Category such as `Pod Security` or `Missing required field`.
    pub category: String,
    /// Affected resource as `Kind/namespace/name`, or a file path.
    pub resource: String,
    /// Human-readable message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    /// Manifest file the resource came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// 1-indexed line in `file`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Finding {
    /// Creates a new finding.
    #[must_use]
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        resource: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: None,
            rule: None,
            severity,
            category: category.into(),
            resource: resource.into(),
            message: message.into(),
            recommendation: None,
            file: None,
            line: None,
        }
    }

    /// Adds a remediation hint.
    #[must_use]
    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }

    /// Records which rule produced this finding.
    #[must_use]
    pub fn with_rule(mut self, code: impl Into<String>, name: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self.rule = Some(name.into());
        self
    }

    /// Records the manifest file this finding points into.
    #[must_use]
    pub fn in_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Records the line this finding points at.
    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// `file:line` when known.
    #[must_use]
    pub fn location(&self) -> Option<String> {
        let file = self.file.as_ref()?;
        Some(match self.line {
            Some(line) => format!("{}:{line}", file.display()),
            None => file.display().to_string(),
        })
    }

    /// Formats the finding as a terminal block.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = String::new();
        if let Some(code) = &self.code {
            let _ = write!(output, "[{code}] ");
        }
        let _ = writeln!(output, "{}", self.resource);
        if let Some(location) = self.location() {
            let _ = writeln!(output, "  at {location}");
        }
        let _ = writeln!(output, "  {} ({}): {}", self.severity, self.category, self.message);
        if let Some(recommendation) = &self.recommendation {
            let _ = writeln!(output, "  = help: {recommendation}");
        }
        output
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.location() {
            Some(location) => write!(f, "{location}: ")?,
            None => write!(f, "{}: ", self.resource)?,
        }
        write!(f, "{}", self.severity)?;
        if let Some(code) = &self.code {
            write!(f, " [{code}]")?;
        }
        write!(f, " {}", self.message)
    }
}

/// Converts a Finding to a miette Diagnostic for rich terminal display.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct FindingDiagnostic {
    message: String,
    #[help]
    help: Option<String>,
}

impl From<&Finding> for FindingDiagnostic {
    fn from(f: &Finding) -> Self {
        let code = f.code.as_deref().map(|c| format!("[{c}] ")).unwrap_or_default();
        Self {
            message: format!("{code}{} {}: {}", f.severity, f.resource, f.message),
            help: f.recommendation.clone(),
        }
    }
}

/// Number of findings per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    /// Findings at `error`.
    pub error: usize,
    /// Findings at `high`.
    pub high: usize,
    /// Findings at `medium`.
    pub medium: usize,
    /// Findings at `low`.
    pub low: usize,
    /// Findings at `warning`.
    pub warning: usize,
    /// Findings at `info`.
    pub info: usize,
}

impl SeverityCounts {
    /// Tallies a set of findings.
    #[must_use]
    pub fn from_findings<'a>(findings: impl IntoIterator<Item = &'a Finding>) -> Self {
        let mut counts = Self::default();
        for finding in findings {
            *counts.slot(finding.severity) += 1;
        }
        counts
    }

    /// Count for one severity.
    #[must_use]
    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Error => self.error,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Warning => self.warning,
            Severity::Info => self.info,
        }
    }

    /// Total number of findings.
    #[must_use]
    pub fn total(&self) -> usize {
        Severity::DESCENDING.iter().map(|s| self.get(*s)).sum()
    }

    /// Adds another tally into this one.
    pub fn add(&mut self, other: &Self) {
        for severity in Severity::DESCENDING {
            *self.slot(severity) += other.get(severity);
        }
    }

    fn slot(&mut self, severity: Severity) -> &mut usize {
        match severity {
            Severity::Error => &mut self.error,
            Severity::High => &mut self.high,
            Severity::Medium => &mut self.medium,
            Severity::Low => &mut self.low,
            Severity::Warning => &mut self.warning,
            Severity::Info => &mut self.info,
        }
    }
}

/// Findings aggregated for one scope (a cluster, a file, a manifest set).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Report {
    /// Cluster or file identifier.
    pub scope: String,
    /// All findings in production order.
    pub findings: Vec<Finding>,
}

impl Report {
    /// Creates an empty report for `scope`.
    #[must_use]
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            findings: Vec::new(),
        }
    }

    /// Creates a report with findings already collected.
    #[must_use]
    pub fn with_findings(scope: impl Into<String>, findings: Vec<Finding>) -> Self {
        Self {
            scope: scope.into(),
            findings,
        }
    }

    /// Counts findings by severity.
    #[must_use]
    pub fn count_by_severity(&self) -> SeverityCounts {
        SeverityCounts::from_findings(&self.findings)
    }

    /// Returns true if any finding meets or exceeds `severity`.
    #[must_use]
    pub fn has_findings_at(&self, severity: Severity) -> bool {
        self.findings.iter().any(|f| f.severity >= severity)
    }

    /// The most severe finding level, if any.
    #[must_use]
    pub fn worst(&self) -> Option<Severity> {
        self.findings.iter().map(|f| f.severity).max()
    }

    /// Findings at exactly `severity`, in production order.
    #[must_use]
    pub fn by_severity(&self, severity: Severity) -> Vec<&Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .collect()
    }

    /// Appends findings from another batch.
    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        self.findings.extend(findings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(severity: Severity) -> Finding {
        Finding::new(severity, "Audit", "Cluster/default/alpha", "audit policy missing")
    }

    #[test]
    fn severity_order_matches_reporting_order() {
        assert!(Severity::Error > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert!(Severity::Low > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        let mut sorted = Severity::DESCENDING.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(sorted, Severity::DESCENDING.to_vec());
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Severity>(), Ok(Severity::High));
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
        assert!("critical".parse::<Severity>().is_err());
    }

    #[test]
    fn finding_builders() {
        let f = finding(Severity::Medium)
            .with_recommendation("set audit-policy-file")
            .with_rule("CL103", "audit-policy")
            .in_file("cluster.yaml")
            .at_line(12);
        assert_eq!(f.location().as_deref(), Some("cluster.yaml:12"));
        assert_eq!(f.to_string(), "cluster.yaml:12: medium [CL103] audit policy missing");
        assert!(f.format().contains("= help: set audit-policy-file"));
    }

    #[test]
    fn finding_json_omits_unset_fields() {
        let json = serde_json::to_value(finding(Severity::Low)).unwrap();
        assert_eq!(json["severity"], "low");
        assert!(json.get("recommendation").is_none());
        assert!(json.get("line").is_none());
    }

    #[test]
    fn report_counts() {
        let report = Report::with_findings(
            "default/alpha",
            vec![
                finding(Severity::High),
                finding(Severity::High),
                finding(Severity::Low),
                finding(Severity::Info),
            ],
        );
        let counts = report.count_by_severity();
        assert_eq!(counts.high, 2);
        assert_eq!(counts.low, 1);
        assert_eq!(counts.total(), 4);
        assert_eq!(report.worst(), Some(Severity::High));
        assert!(report.has_findings_at(Severity::Medium));
        assert!(!report.has_findings_at(Severity::Error));
    }

    #[test]
    fn diagnostic_carries_recommendation_as_help() {
        let f = finding(Severity::Medium).with_recommendation("enable it");
        let diag = FindingDiagnostic::from(&f);
        assert_eq!(diag.help.as_deref(), Some("enable it"));
        assert!(diag.to_string().contains("audit policy missing"));
    }
}
