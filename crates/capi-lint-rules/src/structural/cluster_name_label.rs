//! Rule requiring machine-family objects to name their cluster.

use crate::kinds::is_machine_family;
use capi_lint_core::{Document, Finding, Rule, RuleContext, Severity, CLUSTER_NAME_LABEL};

/// Rule code for cluster-name-label.
pub const CODE: &str = "CL005";

/// Rule name for cluster-name-label.
pub const NAME: &str = "cluster-name-label";

/// Flags machines, machine sets, deployments and pools with neither
/// the cluster-name label nor `spec.clusterName`.
#[derive(Debug, Clone)]
pub struct ClusterNameLabel {
    /// Severity level.
    pub severity: Severity,
}

impl Default for ClusterNameLabel {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterNameLabel {
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

impl Rule for ClusterNameLabel {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires the cluster-name label on machine-family objects without spec.clusterName"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Vec<Finding> {
        if !is_machine_family(doc.kind()) || doc.cluster_name().is_some() {
            return vec![];
        }
        vec![Finding::new(
            self.severity,
            "Labels",
            doc.resource_id(),
            format!("Missing {CLUSTER_NAME_LABEL} label"),
        )
        .with_recommendation("Set the label or spec.clusterName")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(value: serde_json::Value) -> usize {
        ClusterNameLabel::new()
            .check(&Document::from(value), &RuleContext::new())
            .len()
    }

    #[test]
    fn inline_cluster_name_is_enough() {
        assert_eq!(check(json!({ "kind": "Machine", "spec": { "clusterName": "a" } })), 0);
        assert_eq!(
            check(json!({
                "kind": "MachineSet",
                "metadata": { "labels": { "cluster.x-k8s.io/cluster-name": "a" } }
            })),
            0
        );
    }

    #[test]
    fn unowned_machine_is_flagged() {
        assert_eq!(check(json!({ "kind": "MachineDeployment", "spec": {} })), 1);
        assert_eq!(check(json!({ "kind": "Cluster", "spec": {} })), 0);
    }
}
