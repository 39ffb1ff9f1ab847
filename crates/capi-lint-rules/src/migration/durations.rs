//! Rule flagging duration strings that become integer seconds.

use super::{migration_finding, DURATION_FIELDS};
use capi_lint_core::{Document, Finding, Rule, RuleContext, Severity};

/// Rule code for duration-fields.
pub const CODE: &str = "CL304";

/// Rule name for duration-fields.
pub const NAME: &str = "duration-fields";

/// Flags duration strings such as `"10m"` where v1beta2 expects integer seconds.
///
/// Detection is syntactic: any ASCII letter in the value counts.
#[derive(Debug, Clone)]
pub struct DurationFields {
    /// Severity level.
    pub severity: Severity,
}

impl Default for DurationFields {
    fn default() -> Self {
        Self {
            severity: Severity::Warning,
        }
    }
}

impl Rule for DurationFields {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags duration strings that become integer seconds in v1beta2"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Vec<Finding> {
        DURATION_FIELDS
            .iter()
            .filter(|(old, _)| {
                doc.str_at(old)
                    .is_some_and(|value| value.chars().any(|c| c.is_ascii_alphabetic()))
            })
            .map(|(old, new)| {
                migration_finding(
                    self.severity,
                    "Duration field",
                    doc,
                    old,
                    "Duration fields changed from string to int32 seconds",
                )
                .with_recommendation(format!("Convert to integer seconds and rename to {new}"))
            })
            .collect()
    }
}
