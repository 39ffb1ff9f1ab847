//! Integration test: each preset run over fixture manifests through the engine.
//!
//! Uses fixture files under `tests/fixtures/`.

use capi_lint_core::{Config, Document, Finding, Severity};
use capi_lint_rules::Preset;
use capi_lint_source::manifests;
use serde_json::json;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn documents(name: &str) -> Vec<Document> {
    let file = manifests::load_file(&fixture(name));
    assert!(file.findings.is_empty(), "{:?}", file.findings);
    file.documents().cloned().collect()
}

fn run(preset: Preset, name: &str) -> Vec<Finding> {
    preset.engine(Config::default()).run(&documents(name))
}

fn codes(findings: &[Finding]) -> Vec<&str> {
    findings.iter().filter_map(|f| f.code.as_deref()).collect()
}

// ── Structural ──

#[test]
fn topology_cluster_validates_without_refs() {
    let findings = run(Preset::Validate, "topology-cluster.yaml");
    assert!(findings.is_empty(), "{findings:?}");
}

#[test]
fn lint_reports_schema_issues_and_credentials() {
    let path = fixture("legacy-template.yaml");
    let content = std::fs::read_to_string(&path).unwrap();
    let engine = Preset::Lint.engine(Config::default());

    let mut findings = engine.run(&documents("legacy-template.yaml"));
    findings.extend(engine.check_source(&path, &content));

    assert_eq!(codes(&findings), vec!["CL002", "CL004", "CL006", "CL006", "CL004", "CL006", "CL007"]);

    let credential = findings.last().unwrap();
    assert_eq!(credential.line, Some(22));
    assert_eq!(credential.category, "Secrets");
    assert_eq!(credential.file.as_deref(), Some(path.as_path()));
}

// ── Security ──

#[test]
fn insecure_control_plane_yields_two_high_findings() {
    let findings = run(Preset::Audit, "insecure-control-plane.yaml");
    let control_plane: Vec<_> = findings
        .iter()
        .filter(|f| f.resource == "KubeadmControlPlane/prod/gamma-control-plane")
        .collect();

    assert_eq!(control_plane.len(), 2);
    assert!(control_plane.iter().all(|f| f.severity == Severity::High));
    assert_eq!(control_plane[0].category, "Authorization");
    assert_eq!(control_plane[1].category, "Authentication");
}

#[test]
fn classic_cluster_uses_related_control_plane_replicas() {
    let findings = run(Preset::Audit, "insecure-control-plane.yaml");
    assert!(!codes(&findings).contains(&"CL107"));
}

#[test]
fn control_plane_without_replicas_counts_as_one() {
    let documents = vec![
        Document::from(json!({
            "apiVersion": "cluster.x-k8s.io/v1beta1",
            "kind": "Cluster",
            "metadata": { "name": "alpha", "namespace": "prod" },
            "spec": {
                "controlPlaneRef": {
                    "apiVersion": "controlplane.cluster.x-k8s.io/v1beta1",
                    "kind": "KubeadmControlPlane",
                    "name": "alpha-cp"
                }
            }
        })),
        Document::from(json!({
            "apiVersion": "controlplane.cluster.x-k8s.io/v1beta1",
            "kind": "KubeadmControlPlane",
            "metadata": { "name": "alpha-cp", "namespace": "prod" },
            "spec": { "version": "v1.30.0" }
        })),
    ];
    let findings = Preset::Audit.engine(Config::default()).run(&documents);
    let replicas: Vec<_> = findings.iter().filter(|f| f.code.as_deref() == Some("CL107")).collect();

    assert_eq!(replicas.len(), 1);
    assert_eq!(replicas[0].severity, Severity::Medium);
    assert_eq!(replicas[0].resource, "Cluster/prod/alpha");
    assert!(replicas[0].message.contains("1 replica(s)"));
}

#[test]
fn two_replica_topology_is_too_small_and_even() {
    let findings = run(Preset::Audit, "topology-cluster.yaml");
    let summary: Vec<_> = findings.iter().map(|f| (f.severity, f.category.as_str())).collect();
    assert_eq!(
        summary,
        vec![(Severity::Medium, "Availability"), (Severity::Low, "Availability")]
    );
}

// ── Health ──

#[test]
fn waiting_machine_is_an_error_and_a_warning() {
    let findings = run(Preset::Health, "unhealthy-machine.yaml");
    let severities: Vec<_> = findings.iter().map(|f| f.severity).collect();
    assert_eq!(severities, vec![Severity::Error, Severity::Warning]);
    assert_eq!(codes(&findings), vec!["CL201", "CL202"]);
}

// ── Migration ──

#[test]
fn legacy_template_needs_migration() {
    let findings = run(Preset::Migration, "legacy-template.yaml");
    assert_eq!(
        codes(&findings),
        vec!["CL301", "CL302", "CL303", "CL303", "CL301", "CL302", "CL303", "CL303", "CL304"]
    );
    let worst = findings.iter().map(|f| f.severity).max();
    assert_eq!(worst, Some(Severity::Warning));
}

// ── Configuration ──

#[test]
fn config_disables_and_regrades_rules() {
    let config = Config::parse(
        r#"
[rules.failure-reasons]
enabled = false

[rules.CL201]
severity = "high"
"#,
    )
    .unwrap();
    let findings = Preset::Health.engine(config).run(&documents("unhealthy-machine.yaml"));
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::High);
}
