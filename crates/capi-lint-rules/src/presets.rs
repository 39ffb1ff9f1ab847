//! Rule sets, one per command.

use crate::health::{ExpectedConditions, FailureReasons};
use crate::migration::{DeprecatedApiVersion, DurationFields, MigrationDeprecatedFields, ObjectReferenceShape};
use crate::security::{
    BootstrapDataSecret, ClusterNetwork, ControlPlaneReplicas, ControlPlaneSecurity, OrphanedKubeconfigSecret,
    PodSecurityStandard,
};
use crate::structural::{
    ApiVersion, ClusterNameLabel, DeprecatedFields, HardcodedCredentials, NamespaceSpecified, RequiredFields,
    RequiredSpecFields,
};
use capi_lint_core::{Config, Engine, RuleBox, SourceRuleBox};

/// The rule set behind each analysis command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Schema validation of manifests.
    Validate,
    /// Validation plus best practices and credential scanning.
    Lint,
    /// v1beta1 → v1beta2 migration readiness.
    Migration,
    /// Security posture of a cluster.
    Audit,
    /// Condition-based health of a cluster.
    Health,
}

impl Preset {
    /// Every preset.
    pub const ALL: [Self; 5] = [Self::Validate, Self::Lint, Self::Migration, Self::Audit, Self::Health];

    /// Command name of this preset.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Lint => "lint",
            Self::Migration => "migrate",
            Self::Audit => "audit",
            Self::Health => "health",
        }
    }

    /// Returns the document rules of this preset, tuned by `config`.
    #[must_use]
    pub fn rules(self, config: &Config) -> Vec<RuleBox> {
        match self {
            Self::Validate => vec![
                Box::new(RequiredFields::new()),
                Box::new(ApiVersion::new()),
                Box::new(RequiredSpecFields::new()),
                Box::new(DeprecatedFields::new()),
                Box::new(ClusterNameLabel::new()),
            ],
            Self::Lint => vec![
                Box::new(RequiredFields::new()),
                Box::new(ApiVersion::new()),
                Box::new(RequiredSpecFields::new()),
                Box::new(DeprecatedFields::new()),
                Box::new(NamespaceSpecified::new()),
            ],
            Self::Migration => vec![
                Box::new(DeprecatedApiVersion::default()),
                Box::new(MigrationDeprecatedFields::default()),
                Box::new(ObjectReferenceShape),
                Box::new(DurationFields::default()),
            ],
            Self::Audit => {
                let mut rules: Vec<RuleBox> = vec![Box::new(PodSecurityStandard::new(&config.security))];
                rules.extend(
                    ControlPlaneSecurity::all()
                        .into_iter()
                        .map(|rule| Box::new(rule) as RuleBox),
                );
                rules.push(Box::new(ControlPlaneReplicas::new(&config.security)));
                rules.push(Box::new(ClusterNetwork::new()));
                rules.push(Box::new(BootstrapDataSecret::new()));
                rules.push(Box::new(OrphanedKubeconfigSecret::new()));
                rules
            }
            Self::Health => vec![
                Box::new(ExpectedConditions::new(&config.health)),
                Box::new(FailureReasons::new(&config.health)),
            ],
        }
    }

    /// Returns the raw-text rules of this preset.
    #[must_use]
    pub fn source_rules(self) -> Vec<SourceRuleBox> {
        match self {
            Self::Lint => vec![Box::new(HardcodedCredentials::new())],
            Self::Validate | Self::Migration | Self::Audit | Self::Health => vec![],
        }
    }

    /// Builds an engine running this preset under `config`.
    #[must_use]
    pub fn engine(self, config: Config) -> Engine {
        let mut builder = Engine::builder().rules(self.rules(&config));
        for rule in self.source_rules() {
            builder = builder.source_rule_box(rule);
        }
        builder.config(config).build()
    }
}

/// Builds an engine holding every built-in rule once, for listing.
#[must_use]
pub fn all_rules(config: &Config) -> Engine {
    let mut seen = std::collections::HashSet::new();
    let rules: Vec<RuleBox> = Preset::ALL
        .into_iter()
        .flat_map(|preset| preset.rules(config))
        .filter(|rule| seen.insert(rule.code()))
        .collect();
    let mut builder = Engine::builder().rules(rules);
    for rule in Preset::Lint.source_rules() {
        builder = builder.source_rule_box(rule);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_has_rules() {
        let config = Config::default();
        for preset in Preset::ALL {
            assert!(!preset.rules(&config).is_empty(), "{}", preset.name());
        }
        assert_eq!(Preset::Lint.engine(Config::default()).rule_count(), 6);
    }

    #[test]
    fn codes_are_unique() {
        let engine = all_rules(&Config::default());
        let described = engine.describe();
        let mut codes: Vec<_> = described.iter().map(|(code, ..)| *code).collect();
        let total = codes.len();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), total);
        assert_eq!(total, 23);

        let mut names: Vec<_> = described.iter().map(|(_, name, ..)| *name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
