//! Rule requiring expected conditions to report `True`.

use super::{describe, CATEGORY};
use capi_lint_core::{Document, Finding, HealthConfig, Rule, RuleContext};

/// Rule code for expected-conditions.
pub const CODE: &str = "CL201";

/// Rule name for expected-conditions.
pub const NAME: &str = "expected-conditions";

/// Flags expected conditions that are not `True`, graded per condition type.
#[derive(Debug, Clone, Default)]
pub struct ExpectedConditions {
    health: HealthConfig,
}

impl ExpectedConditions {
    /// Creates the rule with expectations from `health`.
    #[must_use]
    pub fn new(health: &HealthConfig) -> Self {
        Self {
            health: health.clone(),
        }
    }
}

impl Rule for ExpectedConditions {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires Ready, Available and the other expected conditions to be True"
    }

    fn check(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Vec<Finding> {
        crate::conditions::conditions(doc)
            .into_iter()
            .filter(|c| self.health.expects_true(&c.condition_type) && c.status != "True")
            .map(|c| {
                Finding::new(
                    self.health.severity_for(&c.condition_type),
                    CATEGORY,
                    c.resource(),
                    format!("Condition {}", describe(&c)),
                )
                .with_recommendation(format!("Check the {} controller logs and events", c.kind))
            })
            .collect()
    }
}
