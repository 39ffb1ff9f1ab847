//! Rule checking the Pod Security Standard configured through cluster variables.
//!
//! # Detected Patterns
//!
//! - No `podSecurityStandard` topology variable
//! - `enforce` unset or `privileged`
//! - `enforce: baseline`
//! - `audit` unset

use capi_lint_core::{Document, Finding, Rule, RuleContext, SecurityConfig, Severity};

/// Rule code for pod-security-standard.
pub const CODE: &str = "CL101";

/// Rule name for pod-security-standard.
pub const NAME: &str = "pod-security-standard";

/// Name of the topology variable carrying the Pod Security Standard.
pub const PSS_VARIABLE: &str = "podSecurityStandard";

const CATEGORY: &str = "Pod Security";

/// Checks `spec.topology.variables[podSecurityStandard]` on Clusters.
#[derive(Debug, Clone)]
pub struct PodSecurityStandard {
    variable_missing: Severity,
    privileged: Severity,
    baseline: Severity,
    audit_missing: Severity,
}

impl Default for PodSecurityStandard {
    fn default() -> Self {
        Self::new(&SecurityConfig::default())
    }
}

impl PodSecurityStandard {
    /// Creates the rule with severities from `config`.
    #[must_use]
    pub fn new(config: &SecurityConfig) -> Self {
        Self {
            variable_missing: config.pss_variable_missing,
            privileged: config.pss_privileged,
            baseline: config.pss_baseline,
            audit_missing: config.pss_audit_missing,
        }
    }
}

/// Finds a topology variable by name.
pub(crate) fn topology_variable<'d>(cluster: &'d Document, name: &str) -> Option<&'d Document> {
    cluster
        .list_at("spec.topology.variables")
        .iter()
        .find(|var| var.str_at("name") == Some(name))
        .map(|var| var.get("value"))
}

impl Rule for PodSecurityStandard {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires a baseline or restricted Pod Security Standard with auditing"
    }

    fn default_severity(&self) -> Severity {
        self.privileged
    }

    fn check(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Vec<Finding> {
        if doc.kind() != "Cluster" {
            return vec![];
        }
        let resource = doc.resource_id();
        let Some(pss) = topology_variable(doc, PSS_VARIABLE).filter(|v| v.as_map().is_some()) else {
            return vec![Finding::new(
                self.variable_missing,
                CATEGORY,
                resource,
                "No podSecurityStandard variable configured",
            )
            .with_recommendation("Set podSecurityStandard variable with enforce level")];
        };

        let mut findings = Vec::new();
        match pss.str_at("enforce").unwrap_or_default() {
            enforce @ ("" | "privileged") => findings.push(
                Finding::new(
                    self.privileged,
                    CATEGORY,
                    resource.clone(),
                    format!("PSS enforce level is '{enforce}' (should be baseline or restricted)"),
                )
                .with_recommendation("Set podSecurityStandard.enforce to 'baseline' or 'restricted'"),
            ),
            "baseline" => findings.push(
                Finding::new(
                    self.baseline,
                    CATEGORY,
                    resource.clone(),
                    "PSS enforce level is 'baseline' (consider 'restricted' for production)",
                )
                .with_recommendation("Consider 'restricted' level for higher security"),
            ),
            _ => {}
        }
        if pss.str_at("audit").unwrap_or_default().is_empty() {
            findings.push(
                Finding::new(self.audit_missing, CATEGORY, resource, "PSS audit level not configured")
                    .with_recommendation("Set podSecurityStandard.audit for violation logging"),
            );
        }
        findings
    }
}
