//! Rule requiring the fields every Kubernetes object needs.
//!
//! # Detected Patterns
//!
//! - No `apiVersion` or `kind`
//! - No `metadata` mapping
//! - No `metadata.name`

use capi_lint_core::{Document, Finding, Rule, RuleContext, Severity};

/// Rule code for required-fields.
pub const CODE: &str = "CL001";

/// Rule name for required-fields.
pub const NAME: &str = "required-fields";

/// Category of the findings.
pub const CATEGORY: &str = "Missing required field";

/// Requires `apiVersion`, `kind`, `metadata` and `metadata.name`.
#[derive(Debug, Clone)]
pub struct RequiredFields {
    /// Severity level.
    pub severity: Severity,
}

impl Default for RequiredFields {
    fn default() -> Self {
        Self::new()
    }
}

impl RequiredFields {
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
}

impl Rule for RequiredFields {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires apiVersion, kind, metadata and metadata.name"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Vec<Finding> {
        let mut missing = Vec::new();
        for field in ["apiVersion", "kind"] {
            if doc.get(field).is_empty_value() {
                missing.push(field);
            }
        }
        if doc.get("metadata").as_map().is_none() {
            missing.push("metadata");
        } else if doc.name().is_empty() {
            missing.push("metadata.name");
        }

        missing
            .into_iter()
            .map(|field| {
                Finding::new(
                    self.severity,
                    CATEGORY,
                    doc.resource_id(),
                    format!("Missing required field: {field}"),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(value: serde_json::Value) -> Vec<String> {
        RequiredFields::new()
            .check(&Document::from(value), &RuleContext::new())
            .into_iter()
            .map(|f| f.message)
            .collect()
    }

    #[test]
    fn complete_object_passes() {
        let messages = check(json!({
            "apiVersion": "cluster.x-k8s.io/v1beta1",
            "kind": "Cluster",
            "metadata": { "name": "a" }
        }));
        assert!(messages.is_empty());
    }

    #[test]
    fn reports_each_missing_field() {
        let messages = check(json!({ "metadata": {} }));
        assert_eq!(
            messages,
            vec![
                "Missing required field: apiVersion",
                "Missing required field: kind",
                "Missing required field: metadata.name",
            ]
        );
    }

    #[test]
    fn missing_metadata_hides_name_check() {
        let messages = check(json!({ "apiVersion": "v1", "kind": "ConfigMap" }));
        assert_eq!(messages, vec!["Missing required field: metadata"]);
    }
}
