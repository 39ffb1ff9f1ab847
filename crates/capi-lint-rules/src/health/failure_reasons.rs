//! Rule flagging conditions that report a known failure reason.

use super::{describe, CATEGORY};
use capi_lint_core::{Document, Finding, HealthConfig, Rule, RuleContext, Severity};

/// Rule code for failure-reasons.
pub const CODE: &str = "CL202";

/// Rule name for failure-reasons.
pub const NAME: &str = "failure-reasons";

/// Flags conditions whose reason is a known failure reason, whatever their status.
#[derive(Debug, Clone)]
pub struct FailureReasons {
    health: HealthConfig,
    /// Severity level.
    pub severity: Severity,
}

impl Default for FailureReasons {
    fn default() -> Self {
        Self::new(&HealthConfig::default())
    }
}

impl FailureReasons {
    /// Creates the rule with failure reasons from `health`.
    #[must_use]
    pub fn new(health: &HealthConfig) -> Self {
        Self {
            health: health.clone(),
            severity: Severity::Warning,
        }
    }
}

impl Rule for FailureReasons {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags conditions reporting a known failure reason"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Vec<Finding> {
        crate::conditions::conditions(doc)
            .into_iter()
            .filter(|c| self.health.is_failure_reason(&c.reason))
            .map(|c| {
                Finding::new(
                    self.severity,
                    CATEGORY,
                    c.resource(),
                    format!("Failure reason {} on condition {}", c.reason, describe(&c)),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_reason_fires_on_a_true_condition() {
        let doc = Document::from(json!({
            "kind": "MachineDeployment",
            "metadata": { "name": "md" },
            "status": { "conditions": [ { "type": "Available", "status": "True", "reason": "ScalingDown" } ] }
        }));
        let found = FailureReasons::default().check(&doc, &RuleContext::new());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity, Severity::Warning);
        assert_eq!(
            found[0].message,
            "Failure reason ScalingDown on condition Available = True (ScalingDown)"
        );
    }
}
