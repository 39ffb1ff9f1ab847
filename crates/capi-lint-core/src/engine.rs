//! Rule engine that applies rule sets to documents.

use crate::config::Config;
use crate::document::Document;
use crate::rule::{Rule, RuleBox, RuleContext, SourceRule, SourceRuleBox, SourceText};
use crate::types::{Finding, Severity};

use std::path::Path;
use tracing::debug;

/// Builder for configuring an [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    rules: Vec<RuleBox>,
    source_rules: Vec<SourceRuleBox>,
    config: Option<Config>,
}

impl EngineBuilder {
    /// Creates a new builder with no rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document rule.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed document rule.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several boxed document rules, keeping their order.
    #[must_use]
    pub fn rules(mut self, rules: impl IntoIterator<Item = RuleBox>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Adds a raw-text rule.
    #[must_use]
    pub fn source_rule<R: SourceRule + 'static>(mut self, rule: R) -> Self {
        self.source_rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed raw-text rule.
    #[must_use]
    pub fn source_rule_box(mut self, rule: SourceRuleBox) -> Self {
        self.source_rules.push(rule);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the engine.
    #[must_use]
    pub fn build(self) -> Engine {
        Engine {
            rules: self.rules,
            source_rules: self.source_rules,
            config: self.config.unwrap_or_default(),
        }
    }
}

/// Runs a fixed rule set over documents.
///
/// Rules run in declaration order for every document, and every rule runs
/// even when an earlier one reported findings. Use [`Engine::builder()`] to
/// construct an instance.
pub struct Engine {
    rules: Vec<RuleBox>,
    source_rules: Vec<SourceRuleBox>,
    config: Config,
}

impl Engine {
    /// Creates a new builder for configuring an engine.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len() + self.source_rules.len()
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Checks every document, using the whole set as related context.
    #[must_use]
    pub fn run(&self, documents: &[Document]) -> Vec<Finding> {
        let ctx = RuleContext::new().with_related(documents);
        documents
            .iter()
            .flat_map(|doc| self.check_document(doc, &ctx))
            .collect()
    }

    /// Checks one document with every enabled rule.
    #[must_use]
    pub fn check_document(&self, doc: &Document, ctx: &RuleContext<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();

        for rule in &self.rules {
            if !self.config.is_rule_enabled(rule.name(), rule.code()) {
                debug!("Skipping disabled rule: {}", rule.name());
                continue;
            }

            let rule_findings = rule.check(doc, ctx);
            findings.extend(self.stamp(rule.code(), rule.name(), rule_findings, ctx.file()));
        }

        findings
    }

    /// Runs raw-text rules against one file.
    #[must_use]
    pub fn check_source(&self, path: &Path, content: &str) -> Vec<Finding> {
        let source = SourceText { path, content };
        let mut findings = Vec::new();

        for rule in &self.source_rules {
            if !self.config.is_rule_enabled(rule.name(), rule.code()) {
                debug!("Skipping disabled rule: {}", rule.name());
                continue;
            }

            let rule_findings = rule.check_source(&source);
            findings.extend(self.stamp(rule.code(), rule.name(), rule_findings, Some(path)));
        }

        findings
    }

    /// Lists `(code, name, description, default severity)` for every rule.
    #[must_use]
    pub fn describe(&self) -> Vec<(&'static str, &'static str, &'static str, Severity)> {
        self.rules
            .iter()
            .map(|r| (r.code(), r.name(), r.description(), r.default_severity()))
            .chain(
                self.source_rules
                    .iter()
                    .map(|r| (r.code(), r.name(), r.description(), r.default_severity())),
            )
            .collect()
    }

    /// Records the producing rule and applies severity overrides from configuration.
    fn stamp(
        &self,
        code: &str,
        name: &str,
        mut findings: Vec<Finding>,
        file: Option<&Path>,
    ) -> Vec<Finding> {
        let severity = self.config.rule_severity(name, code);
        for f in &mut findings {
            if f.code.is_none() {
                f.code = Some(code.to_string());
                f.rule = Some(name.to_string());
            }
            if let Some(severity) = severity {
                f.severity = severity;
            }
            if f.file.is_none() {
                f.file = file.map(Path::to_path_buf);
            }
        }
        findings
    }
}
