//! Rule checking `apiVersion` against the kind's API group.

use crate::kinds::expected_group;
use capi_lint_core::{Document, Finding, Rule, RuleContext, Severity};

/// Rule code for api-version.
pub const CODE: &str = "CL002";

/// Rule name for api-version.
pub const NAME: &str = "api-version";

/// Flags known kinds served from the wrong group and `v1alpha*` versions.
#[derive(Debug, Clone)]
pub struct ApiVersion {
    /// Severity level.
    pub severity: Severity,
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiVersion {
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

impl Rule for ApiVersion {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Checks the API group of known kinds and flags v1alpha versions"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Vec<Finding> {
        let api_version = doc.api_version();
        if api_version.is_empty() {
            return vec![];
        }
        let (group, version) = api_version.split_once('/').unwrap_or(("", api_version));

        let mut findings = Vec::new();
        if let Some(expected) = expected_group(doc.kind()) {
            if group != expected {
                findings.push(
                    Finding::new(
                        self.severity,
                        "API version",
                        doc.resource_id(),
                        format!("Expected group '{expected}', got '{api_version}'"),
                    )
                    .with_recommendation(format!("Use {expected}/v1beta1 or later")),
                );
            }
        }
        if version.starts_with("v1alpha") {
            let group = if group.is_empty() { "cluster.x-k8s.io" } else { group };
            findings.push(
                Finding::new(
                    self.severity,
                    "Deprecated API version",
                    doc.resource_id(),
                    format!("v1alpha API versions are deprecated: {api_version}"),
                )
                .with_recommendation(format!("Use {group}/v1beta1")),
            );
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(api_version: &str, kind: &str) -> Vec<Finding> {
        let doc = Document::from(json!({
            "apiVersion": api_version,
            "kind": kind,
            "metadata": { "name": "a" }
        }));
        ApiVersion::new().check(&doc, &RuleContext::new())
    }

    #[test]
    fn matching_group_passes() {
        assert!(check("controlplane.cluster.x-k8s.io/v1beta1", "KubeadmControlPlane").is_empty());
        assert!(check("apps/v1", "Deployment").is_empty());
    }

    #[test]
    fn wrong_group_is_reported() {
        let findings = check("infrastructure.cluster.x-k8s.io/v1beta1", "Cluster");
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].message,
            "Expected group 'cluster.x-k8s.io', got 'infrastructure.cluster.x-k8s.io/v1beta1'"
        );
    }

    #[test]
    fn alpha_versions_are_deprecated() {
        let findings = check("bootstrap.cluster.x-k8s.io/v1alpha4", "KubeadmConfig");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, "Deprecated API version");
        assert_eq!(
            findings[0].recommendation.as_deref(),
            Some("Use bootstrap.cluster.x-k8s.io/v1beta1")
        );
    }
}
