//! Rule noting clusters without explicit network or CNI configuration.
//!
//! Heuristic only: CNI is often installed outside the Cluster object, so the
//! findings are informational.

use super::pod_security::topology_variable;
use capi_lint_core::{Document, Finding, Rule, RuleContext, Severity};

/// Rule code for cluster-network.
pub const CODE: &str = "CL108";

/// Rule name for cluster-network.
pub const NAME: &str = "cluster-network";

/// Topology variables that indicate a configured CNI.
pub const CNI_VARIABLES: &[&str] = &["cni", "networkPlugin", "calico", "cilium"];

/// Notes Clusters without `spec.clusterNetwork` or a CNI variable.
#[derive(Debug, Clone)]
pub struct ClusterNetwork {
    /// Severity level.
    pub severity: Severity,
}

impl Default for ClusterNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterNetwork {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Info,
        }
    }
}

impl Rule for ClusterNetwork {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Notes clusters without explicit clusterNetwork or CNI variables"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Vec<Finding> {
        if doc.kind() != "Cluster" {
            return vec![];
        }
        let mut findings = Vec::new();
        if doc.path("spec.clusterNetwork").is_empty_value() {
            findings.push(
                Finding::new(
                    self.severity,
                    "Network",
                    doc.resource_id(),
                    "No explicit clusterNetwork configuration",
                )
                .with_recommendation("Define clusterNetwork with appropriate CIDR ranges"),
            );
        }
        if !CNI_VARIABLES
            .iter()
            .any(|name| topology_variable(doc, name).is_some())
        {
            findings.push(
                Finding::new(
                    self.severity,
                    "Network",
                    doc.resource_id(),
                    "CNI configuration not found in cluster variables",
                )
                .with_recommendation("Ensure CNI plugin is configured (calico, cilium, etc.)"),
            );
        }
        findings
    }
}
