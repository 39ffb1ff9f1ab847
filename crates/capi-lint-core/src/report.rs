//! Rendering reports and deriving exit status.

use crate::types::{Finding, FindingDiagnostic, Report, Severity, SeverityCounts};
use serde::Serialize;
use std::fmt::Write;

const RULE: &str = "============================================================";

/// Renders reports for humans, grouping findings by severity, highest first.
#[must_use]
pub fn render_text(reports: &[Report]) -> String {
    let mut out = String::new();

    for report in reports {
        let counts = report.count_by_severity();
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "Report: {}", report.scope);
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "Summary: {}", summary_line(&counts));

        if report.findings.is_empty() {
            let _ = writeln!(out, "\nNo issues found.");
            continue;
        }

        for severity in Severity::DESCENDING {
            let group = report.by_severity(severity);
            if group.is_empty() {
                continue;
            }
            let _ = writeln!(
                out,
                "\n{} ({})",
                severity.as_str().to_ascii_uppercase(),
                group.len()
            );
            for finding in group {
                let _ = write!(out, "{}", finding.format());
            }
        }
        out.push('\n');
    }

    out
}

/// `1 error, 0 high, ...` in descending severity order.
#[must_use]
pub fn summary_line(counts: &SeverityCounts) -> String {
    Severity::DESCENDING
        .iter()
        .map(|s| format!("{} {s}", counts.get(*s)))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Serialize)]
struct JsonReport<'a> {
    cluster: &'a str,
    summary: SeverityCounts,
    findings: &'a [Finding],
}

/// Renders reports as a JSON array of `{cluster, summary, findings}`.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(reports: &[Report]) -> Result<String, serde_json::Error> {
    let payload: Vec<JsonReport<'_>> = reports
        .iter()
        .map(|r| JsonReport {
            cluster: &r.scope,
            summary: r.count_by_severity(),
            findings: &r.findings,
        })
        .collect();
    serde_json::to_string_pretty(&payload)
}

/// Renders one line per finding.
#[must_use]
pub fn render_compact(reports: &[Report]) -> String {
    let mut out = String::new();
    for finding in reports.iter().flat_map(|r| &r.findings) {
        let _ = writeln!(out, "{finding}");
    }
    out
}

/// Renders findings as miette diagnostics, highest severity first.
#[must_use]
pub fn render_diagnostics(reports: &[Report]) -> String {
    let handler =
        miette::GraphicalReportHandler::new_themed(miette::GraphicalTheme::unicode_nocolor())
            .with_width(160);
    let mut out = String::new();
    for report in reports {
        for severity in Severity::DESCENDING {
            for finding in report.by_severity(severity) {
                let diagnostic = FindingDiagnostic::from(finding);
                if handler.render_report(&mut out, &diagnostic).is_err() {
                    let _ = writeln!(out, "{finding}");
                }
            }
        }
    }
    out
}

/// Maps aggregated findings to a process exit code.
///
/// Exit `2` when any finding reaches `escalate_at`, `1` when any finding
/// reaches `fail_at`, `0` otherwise. Aggregation spans every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitPolicy {
    /// Lowest severity that fails the run.
    pub fail_at: Severity,
    /// Lowest severity that yields exit code 2, for two-tier commands.
    pub escalate_at: Option<Severity>,
}

impl ExitPolicy {
    /// Single-tier policy failing at `severity`.
    #[must_use]
    pub fn fail_at(severity: Severity) -> Self {
        Self {
            fail_at: severity,
            escalate_at: None,
        }
    }

    /// Adds an escalation tier.
    #[must_use]
    pub fn escalate_at(mut self, severity: Severity) -> Self {
        self.escalate_at = Some(severity);
        self
    }

    /// Makes warnings fail the run.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.fail_at = self.fail_at.min(Severity::Warning);
        self
    }

    /// Exit code for the given reports.
    #[must_use]
    pub fn exit_code(&self, reports: &[Report]) -> i32 {
        let worst = reports.iter().filter_map(Report::worst).max();
        match worst {
            Some(w) if self.escalate_at.is_some_and(|e| w >= e) => 2,
            Some(w) if w >= self.fail_at => 1,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Report> {
        vec![
            Report::with_findings(
                "default/alpha",
                vec![
                    Finding::new(Severity::Low, "TLS", "KubeadmControlPlane/default/alpha-cp", "serving certs off"),
                    Finding::new(Severity::High, "Authentication", "KubeadmControlPlane/default/alpha-cp", "anonymous auth enabled")
                        .with_recommendation("set anonymous-auth=false"),
                ],
            ),
            Report::new("default/beta"),
        ]
    }

    #[test]
    fn text_groups_highest_severity_first() {
        let text = render_text(&sample());
        let high = text.find("HIGH (1)").unwrap();
        let low = text.find("LOW (1)").unwrap();
        assert!(high < low);
        assert!(text.contains("Report: default/beta"));
        assert!(text.contains("No issues found."));
        assert!(text.contains("= help: set anonymous-auth=false"));
    }

    #[test]
    fn text_layout() {
        insta::assert_snapshot!(render_text(&sample()[..1]), @r"
        ============================================================
        Report: default/alpha
        ============================================================
        Summary: 0 error, 1 high, 0 medium, 1 low, 0 warning, 0 info

        HIGH (1)
        KubeadmControlPlane/default/alpha-cp
          high (Authentication): anonymous auth enabled
          = help: set anonymous-auth=false

        LOW (1)
        KubeadmControlPlane/default/alpha-cp
          low (TLS): serving certs off
        ");
    }

    #[test]
    fn json_schema_has_cluster_summary_findings() {
        let json: serde_json::Value = serde_json::from_str(&render_json(&sample()).unwrap()).unwrap();
        assert_eq!(json[0]["cluster"], "default/alpha");
        assert_eq!(json[0]["summary"]["high"], 1);
        assert_eq!(json[0]["summary"]["low"], 1);
        assert_eq!(json[0]["summary"]["error"], 0);
        assert_eq!(json[0]["findings"][1]["category"], "Authentication");
        assert_eq!(json[1]["findings"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn compact_is_one_line_per_finding() {
        assert_eq!(render_compact(&sample()).lines().count(), 2);
    }

    #[test]
    fn diagnostics_include_help() {
        let out = render_diagnostics(&sample());
        assert!(out.contains("anonymous auth enabled"));
        assert!(out.contains("set anonymous-auth=false"));
    }

    #[test]
    fn exit_code_is_aggregated_across_reports() {
        let reports = sample();
        assert_eq!(ExitPolicy::fail_at(Severity::High).exit_code(&reports), 1);
        assert_eq!(ExitPolicy::fail_at(Severity::Error).exit_code(&reports), 0);
        assert_eq!(ExitPolicy::fail_at(Severity::Error).strict().exit_code(&reports), 1);
        assert_eq!(
            ExitPolicy::fail_at(Severity::Warning)
                .escalate_at(Severity::High)
                .exit_code(&reports),
            2
        );
        assert_eq!(ExitPolicy::fail_at(Severity::Info).exit_code(&[]), 0);
    }
}
