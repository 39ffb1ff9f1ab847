//! Rule flagging object references in their v1beta1 shape.

use super::{migration_finding, OBJECT_REFERENCE_FIELDS};
use capi_lint_core::{Document, Finding, Rule, RuleContext, Severity};

/// Rule code for object-reference-shape.
pub const CODE: &str = "CL303";

/// Rule name for object-reference-shape.
pub const NAME: &str = "object-reference-shape";

const CATEGORY: &str = "Object reference";

/// Flags object references still using `apiVersion` or `namespace`.
///
/// A missing `apiGroup` is informational; a `namespace` is no longer
/// accepted and is a warning.
#[derive(Debug, Clone, Default)]
pub struct ObjectReferenceShape;

impl Rule for ObjectReferenceShape {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags object references that need apiGroup instead of apiVersion or carry a namespace"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        for path in OBJECT_REFERENCE_FIELDS {
            let reference = doc.path(path);
            if reference.as_map().is_none() {
                continue;
            }
            if !reference.get("apiVersion").is_null() && reference.get("apiGroup").is_null() {
                findings.push(
                    migration_finding(
                        Severity::Info,
                        CATEGORY,
                        doc,
                        &format!("{path}.apiVersion"),
                        "v1beta2 uses apiGroup instead of apiVersion in object references",
                    )
                    .with_recommendation("Replace apiVersion with apiGroup (e.g., 'infrastructure.cluster.x-k8s.io')"),
                );
            }
            if !reference.get("namespace").is_null() {
                findings.push(
                    migration_finding(
                        Severity::Warning,
                        CATEGORY,
                        doc,
                        &format!("{path}.namespace"),
                        "namespace field removed from object references in v1beta2",
                    )
                    .with_recommendation("Remove namespace field from object reference"),
                );
            }
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reference_shape_drift() {
        let doc = Document::from(json!({
            "kind": "Cluster",
            "spec": {
                "infrastructureRef": {
                    "apiVersion": "infrastructure.cluster.x-k8s.io/v1beta1",
                    "kind": "DockerCluster",
                    "name": "a",
                    "namespace": "prod"
                },
                "controlPlaneRef": { "apiGroup": "controlplane.cluster.x-k8s.io", "kind": "KubeadmControlPlane", "name": "a" }
            }
        }));
        let found = ObjectReferenceShape.check(&doc, &RuleContext::new());
        let severities: Vec<_> = found.iter().map(|f| f.severity).collect();
        assert_eq!(severities, vec![Severity::Info, Severity::Warning]);
        assert!(found[1].message.starts_with("spec.infrastructureRef.namespace"));
    }
}
