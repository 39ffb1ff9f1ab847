//! Rule flagging Cluster API objects served from deprecated API versions.

use super::migration_finding;
use capi_lint_core::{Document, Finding, Rule, RuleContext, Severity, CAPI_GROUP_SUFFIX};

/// Rule code for deprecated-api-version.
pub const CODE: &str = "CL301";

/// Rule name for deprecated-api-version.
pub const NAME: &str = "deprecated-api-version";

/// Flags Cluster API objects still served from `v1beta1` or `v1alpha*`.
#[derive(Debug, Clone)]
pub struct DeprecatedApiVersion {
    /// Severity level.
    pub severity: Severity,
}

impl Default for DeprecatedApiVersion {
    fn default() -> Self {
        Self {
            severity: Severity::Warning,
        }
    }
}

impl Rule for DeprecatedApiVersion {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags v1beta1 and v1alpha Cluster API versions"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Vec<Finding> {
        let api_version = doc.api_version();
        let Some((group, version)) = api_version.split_once('/') else {
            return vec![];
        };
        if !group.ends_with(CAPI_GROUP_SUFFIX) {
            return vec![];
        }
        let reason = if version.contains("v1beta1") {
            "v1beta1 is deprecated, will be removed in August 2026"
        } else if version.contains("v1alpha") {
            "v1alpha versions are deprecated"
        } else {
            return vec![];
        };
        vec![
            migration_finding(self.severity, "Deprecated API version", doc, "apiVersion", reason)
                .with_recommendation("Migrate to v1beta2 API version"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(value: serde_json::Value) -> Vec<Finding> {
        DeprecatedApiVersion::default().check(&Document::from(value), &RuleContext::new())
    }

    #[test]
    fn api_versions() {
        let found = run(json!({ "apiVersion": "cluster.x-k8s.io/v1beta1", "kind": "Cluster" }));
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].message,
            "apiVersion: v1beta1 is deprecated, will be removed in August 2026"
        );
        assert_eq!(
            run(json!({ "apiVersion": "infrastructure.cluster.x-k8s.io/v1alpha4" }))[0].message,
            "apiVersion: v1alpha versions are deprecated"
        );
        assert!(run(json!({ "apiVersion": "cluster.x-k8s.io/v1beta2" })).is_empty());
        assert!(run(json!({ "apiVersion": "policy/v1beta1" })).is_empty());
    }
}
