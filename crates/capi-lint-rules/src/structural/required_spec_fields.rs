//! Rule checking the kind-specific `spec` fields of Cluster API objects.
//!
//! # Detected Patterns
//!
//! - A known kind without `spec`
//! - A required `spec` field that is absent (see [`REQUIRED_SPEC_FIELDS`])
//! - Object references without `kind` or `name`
//! - Machines whose bootstrap has neither `configRef` nor `dataSecretName`
//! - Machine templates without `bootstrap` or `infrastructureRef`
//! - `ClusterClass` infrastructure or control plane without a template reference
//!
//! A `Cluster` with `spec.topology` gets its infrastructure and control plane
//! from its `ClusterClass`, so `infrastructureRef` and `controlPlaneRef` are
//! not required there.
//!
//! [`REQUIRED_SPEC_FIELDS`]: crate::kinds::REQUIRED_SPEC_FIELDS

use crate::kinds::{required_spec_fields, TOPOLOGY_IMPLIED_FIELDS};
use crate::structural::required_fields::CATEGORY;
use capi_lint_core::{Document, Finding, Rule, RuleContext, Severity};

/// Rule code for required-spec-fields.
pub const CODE: &str = "CL003";

/// Rule name for required-spec-fields.
pub const NAME: &str = "required-spec-fields";

/// Requires the `spec` fields each Cluster API kind depends on.
#[derive(Debug, Clone)]
pub struct RequiredSpecFields {
    /// Severity level.
    pub severity: Severity,
}

impl Default for RequiredSpecFields {
    fn default() -> Self {
        Self::new()
    }
}

impl RequiredSpecFields {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn finding(&self, doc: &Document, message: impl Into<String>) -> Finding {
        Finding::new(self.severity, CATEGORY, doc.resource_id(), message)
    }

    fn check_reference(&self, doc: &Document, field: &str, require_name: bool, out: &mut Vec<Finding>) {
        let reference = doc.path("spec").get(field);
        if reference.as_map().is_none() {
            return;
        }
        if reference.str_at("kind").unwrap_or_default().is_empty() {
            out.push(self.finding(doc, format!("Missing kind in {field}")));
        }
        if require_name && reference.str_at("name").unwrap_or_default().is_empty() {
            out.push(self.finding(doc, format!("Missing name in {field}")));
        }
    }
}

impl Rule for RequiredSpecFields {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires kind-specific spec fields (topology Clusters are exempt from refs)"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Vec<Finding> {
        let kind = doc.kind();
        let Some(required) = required_spec_fields(kind) else {
            return vec![];
        };
        let spec = doc.get("spec");
        if spec.as_map().is_none() {
            return vec![self.finding(doc, "Missing spec field")];
        }

        let mut findings = Vec::new();
        let uses_topology = kind == "Cluster" && !spec.get("topology").is_null();
        for field in required {
            if uses_topology && TOPOLOGY_IMPLIED_FIELDS.contains(field) {
                continue;
            }
            if spec.get(field).is_null() {
                findings.push(self.finding(doc, format!("Missing required field: spec.{field}")));
            }
        }

        match kind {
            "Cluster" => {
                self.check_reference(doc, "infrastructureRef", true, &mut findings);
                self.check_reference(doc, "controlPlaneRef", false, &mut findings);
            }
            "Machine" => {
                let bootstrap = spec.get("bootstrap");
                if bootstrap.as_map().is_some()
                    && bootstrap.get("configRef").is_null()
                    && bootstrap.get("dataSecretName").is_null()
                {
                    findings.push(self.finding(doc, "Must have either configRef or dataSecretName"));
                }
            }
            "MachineDeployment" | "MachineSet" | "MachinePool" => {
                let template_spec = spec.path("template.spec");
                if template_spec.as_map().is_some() {
                    if template_spec.get("bootstrap").is_null() {
                        findings.push(self.finding(doc, "Missing bootstrap in template"));
                    }
                    if template_spec.get("infrastructureRef").is_null() {
                        findings.push(self.finding(doc, "Missing infrastructureRef in template"));
                    }
                }
            }
            "ClusterClass" => {
                for section in ["infrastructure", "controlPlane"] {
                    let node = spec.get(section);
                    if node.as_map().is_some()
                        && node.get("ref").is_null()
                        && node.get("templateRef").is_null()
                    {
                        findings.push(self.finding(doc, format!("Missing ref in {section}")));
                    }
                }
            }
            _ => {}
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn messages(value: serde_json::Value) -> Vec<String> {
        RequiredSpecFields::new()
            .check(&Document::from(value), &RuleContext::new())
            .into_iter()
            .map(|f| f.message)
            .collect()
    }

    #[test]
    fn classic_cluster_needs_both_refs() {
        let found = messages(json!({
            "kind": "Cluster",
            "metadata": { "name": "a" },
            "spec": { "clusterNetwork": {} }
        }));
        assert_eq!(
            found,
            vec![
                "Missing required field: spec.infrastructureRef",
                "Missing required field: spec.controlPlaneRef",
            ]
        );
    }

    #[test]
    fn topology_cluster_is_exempt_from_refs() {
        let found = messages(json!({
            "kind": "Cluster",
            "metadata": { "name": "a" },
            "spec": { "topology": { "class": "quick-start", "version": "v1.31.0" } }
        }));
        assert!(found.is_empty(), "{found:?}");
    }

    #[test]
    fn reference_shape_is_checked() {
        let found = messages(json!({
            "kind": "Cluster",
            "metadata": { "name": "a" },
            "spec": {
                "infrastructureRef": { "kind": "DockerCluster" },
                "controlPlaneRef": { "name": "a-cp" }
            }
        }));
        assert_eq!(
            found,
            vec!["Missing name in infrastructureRef", "Missing kind in controlPlaneRef"]
        );
    }

    #[test]
    fn missing_spec_is_one_finding() {
        let found = messages(json!({ "kind": "MachineHealthCheck", "metadata": { "name": "mhc" } }));
        assert_eq!(found, vec!["Missing spec field"]);
    }

    #[test]
    fn machine_bootstrap_needs_a_source() {
        let found = messages(json!({
            "kind": "Machine",
            "metadata": { "name": "m" },
            "spec": { "clusterName": "a", "bootstrap": {} }
        }));
        assert_eq!(found, vec!["Must have either configRef or dataSecretName"]);
    }

    #[test]
    fn machine_template_is_checked() {
        let found = messages(json!({
            "kind": "MachineDeployment",
            "metadata": { "name": "md" },
            "spec": { "clusterName": "a", "template": { "spec": { "clusterName": "a" } } }
        }));
        assert_eq!(
            found,
            vec!["Missing bootstrap in template", "Missing infrastructureRef in template"]
        );
    }

    #[test]
    fn cluster_class_templates() {
        let found = messages(json!({
            "kind": "ClusterClass",
            "metadata": { "name": "quick-start" },
            "spec": {
                "infrastructure": { "templateRef": { "kind": "DockerClusterTemplate", "name": "t" } },
                "controlPlane": {}
            }
        }));
        assert_eq!(found, vec!["Missing ref in controlPlane"]);
    }

    #[test]
    fn unknown_kinds_are_ignored() {
        assert!(messages(json!({ "kind": "ConfigMap", "metadata": { "name": "c" } })).is_empty());
    }
}
