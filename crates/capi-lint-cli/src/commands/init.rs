//! Init command: writes a starter `capi-lint.toml`.

use anyhow::{bail, Context, Result};
use std::path::Path;

const CONFIG_FILE: &str = "capi-lint.toml";

const DEFAULT_CONFIG: &str = r#"# capi-lint configuration

# Fail threshold for every command (info, warning, low, medium, high, error).
# Defaults: validate/lint error, migrate warning, audit high, health warning.
# fail_on = "high"

# Rules are addressed by name or code. Run `capi-lint list-rules` for the list.

[rules.namespace-specified]
enabled = true
# severity = "warning"

# [rules.CL007]
# enabled = false

[health]
# Condition types that must report True.
expected_true = [
    "Ready",
    "Available",
    "InfrastructureReady",
    "ControlPlaneReady",
    "BootstrapReady",
    "Provisioned",
    "Initialized",
    "UpToDate",
]
default_condition_severity = "warning"
# Reasons that flag a condition whatever its status.
# failure_reasons = ["ProvisioningFailed", "WaitingForControlPlane", "Deleting"]

# Replaces the whole table when set.
[health.condition_severities]
Ready = "error"
Available = "error"
InfrastructureReady = "error"
ControlPlaneReady = "error"
Provisioned = "error"
BootstrapReady = "warning"
Initialized = "warning"

[security]
pss_variable_missing = "medium"
pss_privileged = "high"
pss_baseline = "low"
pss_audit_missing = "low"
min_control_plane_replicas = 3
too_few_replicas = "medium"
even_replicas = "low"

[live]
timeout_secs = 30
kubectl = "kubectl"
# kubeconfig = "~/.kube/management.yaml"
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new(CONFIG_FILE), force)?;

    println!("Created {CONFIG_FILE}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE} to tune rules and thresholds");
    println!("  2. Run: capi-lint validate <manifests>");
    Ok(())
}

fn write_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    std::fs::write(path, DEFAULT_CONFIG).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use capi_lint_core::{Config, Severity};
    use tempfile::TempDir;

    #[test]
    fn starter_config_matches_defaults() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        let defaults = Config::default();

        assert_eq!(config.fail_on, None);
        assert_eq!(config.health.expected_true, defaults.health.expected_true);
        assert_eq!(config.health.condition_severities, defaults.health.condition_severities);
        assert_eq!(config.security.pss_privileged, Severity::High);
        assert_eq!(config.live.timeout_secs, 30);
        assert!(config.is_rule_enabled("namespace-specified", "CL006"));
    }

    #[test]
    fn existing_file_needs_force() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        std::fs::write(&path, "fail_on = \"error\"\n").unwrap();

        assert!(write_config(&path, false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fail_on = \"error\"\n");

        write_config(&path, true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
