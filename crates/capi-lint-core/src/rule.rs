//! Rule traits for defining checks.

use crate::document::Document;
use crate::types::{Finding, Severity};
use std::path::Path;

/// Extra information a rule may consult while checking one document.
///
/// `related` carries the sibling documents of the unit being analyzed: the
/// other documents of a manifest set, or the resources gathered for one
/// cluster (its control plane, machines, secrets).
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleContext<'a> {
    related: &'a [Document],
    file: Option<&'a Path>,
}

impl<'a> RuleContext<'a> {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the related documents.
    #[must_use]
    pub fn with_related(mut self, related: &'a [Document]) -> Self {
        self.related = related;
        self
    }

    /// Sets the file the document was loaded from.
    #[must_use]
    pub fn with_file(mut self, file: &'a Path) -> Self {
        self.file = Some(file);
        self
    }

    /// All related documents.
    #[must_use]
    pub fn related(&self) -> &'a [Document] {
        self.related
    }

    /// Related documents of one kind.
    pub fn related_of_kind<'k>(&self, kind: &'k str) -> impl Iterator<Item = &'a Document> + 'k
    where
        'a: 'k,
    {
        let related: &'a [Document] = self.related;
        related.iter().filter(move |doc| doc.kind() == kind)
    }

    /// The originating file, if any.
    #[must_use]
    pub fn file(&self) -> Option<&'a Path> {
        self.file
    }
}

/// A per-document check.
///
/// Rules are pure: they read the document and the context and return
/// findings. The engine stamps each finding with the rule's code and name
/// and applies configured severity overrides.
///
/// # Example
///
/// ```ignore
/// use capi_lint_core::{Document, Finding, Rule, RuleContext, Severity};
///
/// pub struct RequireNamespace;
///
/// impl Rule for RequireNamespace {
///     fn name(&self) -> &'static str { "require-namespace" }
///     fn code(&self) -> &'static str { "CL900" }
///
///     fn check(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Vec<Finding> {
///         if doc.namespace().is_some() {
///             return vec![];
///         }
///         vec![Finding::new(
///             Severity::Info,
///             "Best practice",
///             doc.resource_id(),
///             "Namespace not specified",
///         )]
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "required-fields").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "CL001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for findings from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Checks a single document and returns any findings.
    fn check(&self, doc: &Document, ctx: &RuleContext<'_>) -> Vec<Finding>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

/// Raw manifest text handed to a [`SourceRule`].
#[derive(Debug, Clone, Copy)]
pub struct SourceText<'a> {
    /// Path of the file.
    pub path: &'a Path,
    /// Full file content.
    pub content: &'a str,
}

/// A check over the raw text of a manifest file.
///
/// Used for properties that do not survive parsing, such as literal
/// credentials next to `${VAR}` substitutions.
pub trait SourceRule: Send + Sync {
    /// Returns the kebab-case name of this rule.
    fn name(&self) -> &'static str;

    /// Returns the rule code.
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for findings from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    /// Checks one file's text and returns any findings.
    fn check_source(&self, source: &SourceText<'_>) -> Vec<Finding>;
}

/// Type alias for boxed `SourceRule` trait objects.
pub type SourceRuleBox = Box<dyn SourceRule>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct TestRule;

    impl Rule for TestRule {
        fn name(&self) -> &'static str {
            "test-rule"
        }
        fn code(&self) -> &'static str {
            "TEST001"
        }
        fn description(&self) -> &'static str {
            "A test rule"
        }

        fn check(&self, doc: &Document, ctx: &RuleContext<'_>) -> Vec<Finding> {
            vec![Finding::new(
                self.default_severity(),
                "Test",
                doc.resource_id(),
                format!("{} related", ctx.related().len()),
            )]
        }
    }

    #[test]
    fn test_rule_trait() {
        let rule = TestRule;
        assert_eq!(rule.name(), "test-rule");
        assert_eq!(rule.code(), "TEST001");
        assert_eq!(rule.default_severity(), Severity::Error);
    }

    #[test]
    fn context_filters_related_by_kind() {
        let docs = vec![
            Document::from(json!({ "kind": "Cluster", "metadata": { "name": "a" } })),
            Document::from(json!({ "kind": "KubeadmControlPlane", "metadata": { "name": "a-cp" } })),
        ];
        let ctx = RuleContext::new().with_related(&docs);
        let kcps: Vec<_> = ctx.related_of_kind("KubeadmControlPlane").collect();
        assert_eq!(kcps.len(), 1);
        assert_eq!(kcps[0].name(), "a-cp");

        let findings = TestRule.check(&docs[0], &ctx);
        assert_eq!(findings[0].message, "2 related");
    }
}
