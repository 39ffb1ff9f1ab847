//! Rule flagging fields removed or replaced in v1beta2.

use super::migration_finding;
use crate::kinds::deprecated_fields;
use capi_lint_core::{Document, Finding, Rule, RuleContext, Severity};

/// Rule code for migration-deprecated-fields.
pub const CODE: &str = "CL302";

/// Rule name for migration-deprecated-fields.
pub const NAME: &str = "migration-deprecated-fields";

/// Flags fields removed or replaced in v1beta2, with the action to take.
#[derive(Debug, Clone)]
pub struct MigrationDeprecatedFields {
    /// Severity level.
    pub severity: Severity,
}

impl Default for MigrationDeprecatedFields {
    fn default() -> Self {
        Self {
            severity: Severity::Warning,
        }
    }
}

impl Rule for MigrationDeprecatedFields {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags fields removed or replaced in v1beta2"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Vec<Finding> {
        deprecated_fields(doc.kind())
            .filter(|field| doc.contains_path(field.path))
            .map(|field| {
                migration_finding(self.severity, "Deprecated field", doc, field.path, field.reason)
                    .with_recommendation(field.action)
            })
            .collect()
    }
}
