//! Rule flagging deprecated fields that are still set.

use crate::kinds::deprecated_fields;
use capi_lint_core::{Document, Finding, Rule, RuleContext, Severity};

/// Rule code for deprecated-fields.
pub const CODE: &str = "CL004";

/// Rule name for deprecated-fields.
pub const NAME: &str = "deprecated-fields";

/// Flags fields listed in [`crate::kinds::DEPRECATED_FIELDS`].
#[derive(Debug, Clone)]
pub struct DeprecatedFields {
    /// Severity level.
    pub severity: Severity,
}

impl Default for DeprecatedFields {
    fn default() -> Self {
        Self::new()
    }
}

impl DeprecatedFields {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Warning,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for DeprecatedFields {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags deprecated fields such as Cluster spec.paused"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Vec<Finding> {
        deprecated_fields(doc.kind())
            .filter(|field| doc.contains_path(field.path))
            .map(|field| {
                Finding::new(
                    self.severity,
                    "Deprecated field",
                    doc.resource_id(),
                    format!("Deprecated field '{}' (since {})", field.path, field.since),
                )
                .with_recommendation(field.reason)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn paused_cluster_is_flagged() {
        let doc = Document::from(json!({
            "kind": "Cluster",
            "metadata": { "name": "a" },
            "spec": { "paused": false }
        }));
        let findings = DeprecatedFields::new().check(&doc, &RuleContext::new());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message, "Deprecated field 'spec.paused' (since v1.4.0)");
    }

    #[test]
    fn machine_phase_is_flagged() {
        let doc = Document::from(json!({
            "kind": "Machine",
            "metadata": { "name": "m" },
            "status": { "phase": "Running" }
        }));
        let findings = DeprecatedFields::new().check(&doc, &RuleContext::new());
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("status.phase"));
    }

    #[test]
    fn other_kinds_are_ignored() {
        let doc = Document::from(json!({ "kind": "DockerCluster", "spec": { "paused": true } }));
        assert!(DeprecatedFields::new().check(&doc, &RuleContext::new()).is_empty());
    }
}
