//! Rule noting objects that rely on the default namespace.

use capi_lint_core::{Document, Finding, Rule, RuleContext, Severity};

/// Rule code for namespace-specified.
pub const CODE: &str = "CL006";

/// Rule name for namespace-specified.
pub const NAME: &str = "namespace-specified";

/// Notes objects without `metadata.namespace`.
#[derive(Debug, Clone)]
pub struct NamespaceSpecified {
    /// Severity level.
    pub severity: Severity,
}

impl Default for NamespaceSpecified {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceSpecified {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Info,
        }
    }
}

impl Rule for NamespaceSpecified {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Notes objects that will land in the default namespace"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Vec<Finding> {
        if doc.get("metadata").as_map().is_none() || doc.namespace().is_some() {
            return vec![];
        }
        vec![Finding::new(
            self.severity,
            "Best practice",
            doc.resource_id(),
            "No namespace specified - will use default",
        )]
    }
}
