//! Rule flagging kubeconfig Secrets that no cluster claims.

use capi_lint_core::{Document, Finding, Rule, RuleContext, Severity, CLUSTER_NAME_LABEL};

/// Rule code for orphaned-kubeconfig-secret.
pub const CODE: &str = "CL110";

/// Rule name for orphaned-kubeconfig-secret.
pub const NAME: &str = "orphaned-kubeconfig-secret";

/// Flags kubeconfig Secrets without the cluster-name label.
#[derive(Debug, Clone)]
pub struct OrphanedKubeconfigSecret {
    /// Severity level.
    pub severity: Severity,
}

impl Default for OrphanedKubeconfigSecret {
    fn default() -> Self {
        Self::new()
    }
}

impl OrphanedKubeconfigSecret {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Medium,
        }
    }
}

impl Rule for OrphanedKubeconfigSecret {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags kubeconfig Secrets without the cluster-name label"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Vec<Finding> {
        if doc.kind() != "Secret"
            || !doc.name().to_ascii_lowercase().contains("kubeconfig")
            || doc.label(CLUSTER_NAME_LABEL).is_some()
        {
            return vec![];
        }
        vec![Finding::new(
            self.severity,
            "Secrets",
            doc.resource_id(),
            "Kubeconfig secret without cluster label (may be orphaned)",
        )
        .with_recommendation("Verify secret ownership and clean up if orphaned")]
    }
}
