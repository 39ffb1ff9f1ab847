//! Configuration types for capi-lint.

use crate::Severity;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Top-level configuration for capi-lint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Overrides a command's default failing threshold.
    /// Findings at or above this severity cause a non-zero exit.
    #[serde(default)]
    pub fail_on: Option<Severity>,

    /// Per-rule configurations, keyed by rule name or code.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,

    /// Health-check tuning.
    #[serde(default)]
    pub health: HealthConfig,

    /// Security audit thresholds.
    #[serde(default)]
    pub security: SecurityConfig,

    /// Live cluster access.
    #[serde(default)]
    pub live: LiveConfig,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule is enabled. Either its name or its code may be configured.
    #[must_use]
    pub fn is_rule_enabled(&self, name: &str, code: &str) -> bool {
        self.rule_config(name, code)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, name: &str, code: &str) -> Option<Severity> {
        self.rule_config(name, code).and_then(|c| c.severity)
    }

    fn rule_config(&self, name: &str, code: &str) -> Option<&RuleConfig> {
        self.rules.get(name).or_else(|| self.rules.get(code))
    }
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<Severity>,
}

/// Condition expectations for the health check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Condition types that must report `True`.
    pub expected_true: Vec<String>,

    /// Severity per condition type when it is not `True`.
    pub condition_severities: BTreeMap<String, Severity>,

    /// Severity for expected conditions missing from `condition_severities`.
    pub default_condition_severity: Severity,

    /// Condition reasons that indicate a failing or stuck resource.
    pub failure_reasons: Vec<String>,
}

impl HealthConfig {
    /// Severity for a failing condition of `condition_type`.
    #[must_use]
    pub fn severity_for(&self, condition_type: &str) -> Severity {
        self.condition_severities
            .get(condition_type)
            .copied()
            .unwrap_or(self.default_condition_severity)
    }

    /// Returns true if `condition_type` must be `True`.
    #[must_use]
    pub fn expects_true(&self, condition_type: &str) -> bool {
        self.expected_true.iter().any(|t| t == condition_type)
    }

    /// Returns true if `reason` is a known failure reason.
    #[must_use]
    pub fn is_failure_reason(&self, reason: &str) -> bool {
        self.failure_reasons.iter().any(|r| r == reason)
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| (*s).to_string()).collect::<Vec<_>>();
        let mut condition_severities = BTreeMap::new();
        for condition in [
            "Ready",
            "Available",
            "InfrastructureReady",
            "ControlPlaneReady",
            "Provisioned",
        ] {
            condition_severities.insert(condition.to_string(), Severity::Error);
        }
        for condition in ["BootstrapReady", "Initialized"] {
            condition_severities.insert(condition.to_string(), Severity::Warning);
        }

        Self {
            expected_true: owned(&[
                "Ready",
                "Available",
                "InfrastructureReady",
                "ControlPlaneReady",
                "BootstrapReady",
                "Provisioned",
                "Initialized",
                "UpToDate",
            ]),
            condition_severities,
            default_condition_severity: Severity::Warning,
            failure_reasons: owned(&[
                "ProvisioningFailed",
                "InvalidConfiguration",
                "WaitingForInfrastructure",
                "WaitingForControlPlane",
                "ScalingDown",
                "Deleting",
                "Failed",
                "ProviderError",
            ]),
        }
    }
}

/// Severity thresholds for the security audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// No `podSecurityStandard` topology variable.
    pub pss_variable_missing: Severity,
    /// Enforce level empty or `privileged`.
    pub pss_privileged: Severity,
    /// Enforce level `baseline`.
    pub pss_baseline: Severity,
    /// No audit level set.
    pub pss_audit_missing: Severity,
    /// Minimum control-plane replica count.
    pub min_control_plane_replicas: i64,
    /// Fewer replicas than the minimum.
    pub too_few_replicas: Severity,
    /// An even replica count.
    pub even_replicas: Severity,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            pss_variable_missing: Severity::Medium,
            pss_privileged: Severity::High,
            pss_baseline: Severity::Low,
            pss_audit_missing: Severity::Low,
            min_control_plane_replicas: 3,
            too_few_replicas: Severity::Medium,
            even_replicas: Severity::Low,
        }
    }
}

/// Live cluster access settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    /// Per-query timeout in seconds.
    pub timeout_secs: u64,
    /// Command used to query the cluster.
    pub kubectl: String,
    /// Kubeconfig passed to every query.
    pub kubeconfig: Option<PathBuf>,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            kubectl: "kubectl".to_string(),
            kubeconfig: None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert!(config.fail_on.is_none());
        assert!(config.is_rule_enabled("required-fields", "CL001"));
        assert_eq!(config.live.timeout_secs, 30);
        assert_eq!(config.security.min_control_plane_replicas, 3);
        assert_eq!(config.health.severity_for("Ready"), Severity::Error);
        assert_eq!(config.health.severity_for("BootstrapReady"), Severity::Warning);
        assert_eq!(config.health.severity_for("UpToDate"), Severity::Warning);
    }

    #[test]
    fn rules_match_by_name_or_code() {
        let config = Config::parse(
            r#"
[rules.namespace-specified]
enabled = false

[rules.CL004]
severity = "error"
"#,
        )
        .unwrap();
        assert!(!config.is_rule_enabled("namespace-specified", "CL006"));
        assert_eq!(
            config.rule_severity("deprecated-fields", "CL004"),
            Some(Severity::Error)
        );
        assert_eq!(config.rule_severity("required-fields", "CL001"), None);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = Config::parse(
            r#"
fail_on = "medium"

[health.condition_severities]
BootstrapReady = "error"

[security]
pss_baseline = "medium"

[live]
timeout_secs = 5
"#,
        )
        .unwrap();
        assert_eq!(config.fail_on, Some(Severity::Medium));
        assert_eq!(config.health.severity_for("BootstrapReady"), Severity::Error);
        assert!(config.health.expects_true("UpToDate"));
        assert!(config.health.is_failure_reason("WaitingForControlPlane"));
        assert_eq!(config.security.pss_baseline, Severity::Medium);
        assert_eq!(config.security.pss_privileged, Severity::High);
        assert_eq!(config.live.timeout_secs, 5);
        assert_eq!(config.live.kubectl, "kubectl");
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = Config::parse("fail_on = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
