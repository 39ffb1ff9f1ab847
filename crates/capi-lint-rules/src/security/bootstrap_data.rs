//! Rule requiring Machine bootstrap data to live in a Secret.

use capi_lint_core::{Document, Finding, Rule, RuleContext, Severity};

/// Rule code for bootstrap-data-secret.
pub const CODE: &str = "CL109";

/// Rule name for bootstrap-data-secret.
pub const NAME: &str = "bootstrap-data-secret";

/// Flags Machines whose bootstrap data is not stored in a Secret.
#[derive(Debug, Clone)]
pub struct BootstrapDataSecret {
    /// Severity level.
    pub severity: Severity,
}

impl Default for BootstrapDataSecret {
    fn default() -> Self {
        Self::new()
    }
}

impl BootstrapDataSecret {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Low,
        }
    }
}

impl Rule for BootstrapDataSecret {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires Machine bootstrap data to come from a Secret"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Vec<Finding> {
        if doc.kind() != "Machine" || doc.contains_path("spec.bootstrap.dataSecretName") {
            return vec![];
        }
        vec![Finding::new(
            self.severity,
            "Secrets",
            doc.resource_id(),
            "Bootstrap data secret reference not found",
        )
        .with_recommendation("Ensure bootstrap data is stored in Secret")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn machine_without_data_secret() {
        let rule = BootstrapDataSecret::new();
        let ctx = RuleContext::new();
        let pending = Document::from(json!({ "kind": "Machine", "metadata": { "name": "m" }, "spec": { "bootstrap": { "configRef": {} } } }));
        let ready = Document::from(json!({ "kind": "Machine", "metadata": { "name": "m" }, "spec": { "bootstrap": { "dataSecretName": "m-bootstrap" } } }));
        assert_eq!(rule.check(&pending, &ctx)[0].severity, Severity::Low);
        assert!(rule.check(&ready, &ctx).is_empty());
    }
}
