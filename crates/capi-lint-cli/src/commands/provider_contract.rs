//! Provider-contract command: checks installed provider CRDs against the
//! fields Cluster API expects each provider type to expose.

use anyhow::Result;
use capi_lint_core::{Document, ExitPolicy, Finding, Report, Severity};
use capi_lint_source::{Query, ResourceSource};
use clap::Args;
use std::fmt::Write;
use std::path::PathBuf;

use crate::{Globals, OutputFormat, ReportArgs};

const CRDS: &str = "customresourcedefinitions.apiextensions.k8s.io";

const SUMMARY_RULE: &str = "============================================================";

/// Side of the provider contract a CRD implements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ProviderType {
    /// Infrastructure cluster and machine types.
    Infrastructure,
    /// Bootstrap config types.
    Bootstrap,
    /// Control plane types.
    #[value(name = "controlplane")]
    ControlPlane,
}

/// Fields one provider type must publish in its schema.
#[derive(Debug)]
struct Contract {
    name: &'static str,
    provider_type: ProviderType,
    group: &'static str,
    kind_suffix: &'static str,
    spec: &'static [&'static str],
    status: &'static [&'static str],
    wants_conditions: bool,
}

const CONTRACTS: &[Contract] = &[
    Contract {
        name: "infrastructure-cluster",
        provider_type: ProviderType::Infrastructure,
        group: "infrastructure.cluster.x-k8s.io",
        kind_suffix: "Cluster",
        spec: &["controlPlaneEndpoint"],
        status: &["ready"],
        wants_conditions: true,
    },
    Contract {
        name: "infrastructure-machine",
        provider_type: ProviderType::Infrastructure,
        group: "infrastructure.cluster.x-k8s.io",
        kind_suffix: "Machine",
        spec: &["providerID"],
        status: &["ready", "addresses"],
        wants_conditions: false,
    },
    Contract {
        name: "bootstrap",
        provider_type: ProviderType::Bootstrap,
        group: "bootstrap.cluster.x-k8s.io",
        kind_suffix: "Config",
        spec: &[],
        status: &["ready", "dataSecretName"],
        wants_conditions: false,
    },
    Contract {
        name: "controlplane",
        provider_type: ProviderType::ControlPlane,
        group: "controlplane.cluster.x-k8s.io",
        kind_suffix: "ControlPlane",
        spec: &["version", "replicas"],
        status: &["ready", "initialized", "replicas", "readyReplicas", "updatedReplicas"],
        wants_conditions: false,
    },
];

const GROUPS: &[&str] = &[
    "infrastructure.cluster.x-k8s.io",
    "bootstrap.cluster.x-k8s.io",
    "controlplane.cluster.x-k8s.io",
];

/// Arguments of the provider-contract command.
#[derive(Args, Debug, Clone, Default)]
pub struct ContractArgs {
    /// Only providers whose name contains this (e.g. aws, docker)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Only one provider type
    #[arg(short = 't', long = "type")]
    pub provider_type: Option<ProviderType>,

    /// Read CRDs from manifests instead of the live cluster
    #[arg(long, num_args = 1..)]
    pub manifests: Vec<PathBuf>,

    #[command(flatten)]
    pub report: ReportArgs,
}

/// Runs the provider-contract command. Exits 1 when any CRD breaks its contract.
pub fn run(args: &ContractArgs, globals: &Globals) -> Result<i32> {
    let config = super::load_config(globals)?;
    let source = super::scope_source(&args.manifests, &config)?;

    tracing::info!("Checking provider contract compliance...");
    let reports = check(source.as_ref(), args);
    if reports.is_empty() {
        println!("No provider CRDs found to check");
        return Ok(0);
    }

    super::output::emit(&reports, &args.report)?;
    if args.report.output.is_none() && args.report.format == OutputFormat::Text {
        print!("{}", render_summary(&reports));
    }

    let policy = super::exit_policy(&config, ExitPolicy::fail_at(Severity::Error), args.report.strict);
    Ok(policy.exit_code(&reports))
}

/// One report per contract CRD served in the provider groups, scoped `provider (contract)`.
pub fn check(source: &dyn ResourceSource, args: &ContractArgs) -> Vec<Report> {
    let mut reports = Vec::new();

    for group in GROUPS {
        if args
            .provider_type
            .is_some_and(|wanted| !CONTRACTS.iter().any(|c| c.group == *group && c.provider_type == wanted))
        {
            continue;
        }
        let resources = match source.discover(group) {
            Ok(resources) => resources,
            Err(e) => {
                tracing::warn!("Discovery failed for {group}: {e}");
                continue;
            }
        };

        for resource in resources {
            let crd = match source.get(&Query::new(CRDS).named(resource.as_str())) {
                Ok(mut found) if !found.is_empty() => found.swap_remove(0),
                Ok(_) => {
                    tracing::debug!("No CRD for {resource}");
                    continue;
                }
                Err(e) => {
                    tracing::debug!("Skipping {resource}: {e}");
                    continue;
                }
            };
            let kind = crd.str_at("spec.names.kind").unwrap_or_default();
            let Some(contract) = contract_for(group, kind) else {
                tracing::debug!("{resource} is not bound by a provider contract");
                continue;
            };

            let provider = provider_name(kind, contract);
            if args
                .provider
                .as_deref()
                .is_some_and(|wanted| !provider.contains(&wanted.to_ascii_lowercase()))
            {
                continue;
            }
            reports.push(Report::with_findings(
                format!("{provider} ({})", contract.name),
                check_crd(&crd, contract),
            ));
        }
    }
    reports
}

fn contract_for(group: &str, kind: &str) -> Option<&'static Contract> {
    CONTRACTS
        .iter()
        .find(|c| c.group == group && kind.ends_with(c.kind_suffix))
}

/// `DockerCluster` → `docker`; a bare suffix such as `Machine` → `core`.
fn provider_name(kind: &str, contract: &Contract) -> String {
    match kind.strip_suffix(contract.kind_suffix) {
        Some(prefix) if !prefix.is_empty() => prefix.to_ascii_lowercase(),
        _ => "core".to_string(),
    }
}

/// Schema of the first served version.
fn served_schema(crd: &Document) -> Option<&Document> {
    crd.list_at("spec.versions")
        .iter()
        .find(|version| version.bool_at("served") == Some(true))
        .map(|version| version.path("schema.openAPIV3Schema"))
        .filter(|schema| schema.as_map().is_some_and(|map| !map.is_empty()))
}

fn check_crd(crd: &Document, contract: &Contract) -> Vec<Finding> {
    let crd_name = crd.name();
    let Some(schema) = served_schema(crd) else {
        return vec![Finding::new(Severity::Error, "Schema", crd_name, "No OpenAPI schema found in CRD")];
    };

    let mut findings = Vec::new();
    for (section, category, fields) in [("spec", "Spec", contract.spec), ("status", "Status", contract.status)] {
        let properties = schema.path(&format!("properties.{section}.properties"));
        for field in fields.iter().filter(|field| properties.get(field).is_null()) {
            findings.push(
                Finding::new(
                    Severity::Error,
                    category,
                    crd_name,
                    format!("Missing required {section} field: {field}"),
                )
                .with_recommendation(format!("Contract requires {section}.{field}")),
            );
        }
    }

    if contract.wants_conditions && schema.path("properties.status.properties.conditions").is_null() {
        findings.push(
            Finding::new(Severity::Warning, "Conditions", crd_name, "No conditions field in status")
                .with_recommendation("Conditions recommended for observability"),
        );
    }
    findings
}

/// Compliance totals and the providers with contract errors.
pub fn render_summary(reports: &[Report]) -> String {
    let failing: Vec<_> = reports.iter().filter(|r| r.has_findings_at(Severity::Error)).collect();
    let mut out = String::new();

    let _ = writeln!(out, "\n{SUMMARY_RULE}");
    let _ = writeln!(out, "SUMMARY");
    let _ = writeln!(out, "{SUMMARY_RULE}");
    let _ = writeln!(out, "Total providers checked: {}", reports.len());
    let _ = writeln!(out, "Compliant: {}", reports.len() - failing.len());
    let _ = writeln!(out, "Non-compliant: {}", failing.len());

    if !failing.is_empty() {
        let _ = writeln!(out, "\nNon-compliant providers:");
        for report in failing {
            let _ = writeln!(
                out,
                "  - {}: {} errors",
                report.scope,
                report.by_severity(Severity::Error).len()
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use capi_lint_source::MemorySource;
    use serde_json::json;

    fn crd(group: &str, kind: &str, plural: &str, spec: &[&str], status: &[&str]) -> Document {
        let props = |fields: &[&str]| -> serde_json::Value {
            fields.iter().map(|f| ((*f).to_string(), json!({ "type": "string" }))).collect()
        };
        Document::from(json!({
            "apiVersion": "apiextensions.k8s.io/v1",
            "kind": "CustomResourceDefinition",
            "metadata": { "name": format!("{plural}.{group}") },
            "spec": {
                "group": group,
                "names": { "kind": kind, "plural": plural },
                "versions": [
                    { "name": "v1alpha1", "served": false },
                    {
                        "name": "v1beta1",
                        "served": true,
                        "schema": { "openAPIV3Schema": { "properties": {
                            "spec": { "properties": props(spec) },
                            "status": { "properties": props(status) }
                        } } }
                    }
                ]
            }
        }))
    }

    fn source() -> MemorySource {
        MemorySource::new(vec![
            crd(
                "infrastructure.cluster.x-k8s.io",
                "DockerCluster",
                "dockerclusters",
                &["controlPlaneEndpoint"],
                &["ready", "conditions"],
            ),
            crd(
                "infrastructure.cluster.x-k8s.io",
                "DockerMachine",
                "dockermachines",
                &["providerID"],
                &["ready"],
            ),
            crd(
                "infrastructure.cluster.x-k8s.io",
                "DockerMachineTemplate",
                "dockermachinetemplates",
                &["template"],
                &[],
            ),
            crd(
                "bootstrap.cluster.x-k8s.io",
                "KubeadmConfig",
                "kubeadmconfigs",
                &[],
                &["ready", "dataSecretName"],
            ),
            crd(
                "controlplane.cluster.x-k8s.io",
                "KubeadmControlPlane",
                "kubeadmcontrolplanes",
                &["version", "replicas"],
                &["ready", "initialized", "replicas", "readyReplicas", "updatedReplicas"],
            ),
        ])
    }

    fn scopes(reports: &[Report]) -> Vec<&str> {
        reports.iter().map(|r| r.scope.as_str()).collect()
    }

    #[test]
    fn contract_types_are_checked_and_templates_skipped() {
        let reports = check(&source(), &ContractArgs::default());
        assert_eq!(
            scopes(&reports),
            vec![
                "docker (infrastructure-cluster)",
                "docker (infrastructure-machine)",
                "kubeadm (bootstrap)",
                "kubeadm (controlplane)",
            ]
        );

        let machine = &reports[1];
        assert_eq!(machine.findings.len(), 1);
        assert_eq!(machine.findings[0].severity, Severity::Error);
        assert_eq!(machine.findings[0].message, "Missing required status field: addresses");
        assert_eq!(machine.findings[0].resource, "dockermachines.infrastructure.cluster.x-k8s.io");
        assert!(reports.iter().filter(|r| r.scope != machine.scope).all(|r| r.findings.is_empty()));
    }

    #[test]
    fn infrastructure_cluster_without_conditions_is_a_warning() {
        let src = MemorySource::new(vec![crd(
            "infrastructure.cluster.x-k8s.io",
            "AWSCluster",
            "awsclusters",
            &[],
            &["ready"],
        )]);
        let reports = check(&src, &ContractArgs::default());
        let severities: Vec<_> = reports[0].findings.iter().map(|f| (f.severity, f.category.as_str())).collect();
        assert_eq!(severities, vec![(Severity::Error, "Spec"), (Severity::Warning, "Conditions")]);
        assert_eq!(
            reports[0].findings[0].recommendation.as_deref(),
            Some("Contract requires spec.controlPlaneEndpoint")
        );
    }

    #[test]
    fn missing_schema_is_one_error() {
        let mut bare = crd("bootstrap.cluster.x-k8s.io", "TalosConfig", "talosconfigs", &[], &[]);
        if let Some(spec) = bare.as_map_mut().and_then(|m| m.get_mut("spec")).and_then(Document::as_map_mut) {
            spec.insert("versions".into(), Document::from(json!([{ "name": "v1", "served": true }])));
        }
        let reports = check(&MemorySource::new(vec![bare]), &ContractArgs::default());
        assert_eq!(reports[0].scope, "talos (bootstrap)");
        assert_eq!(reports[0].findings.len(), 1);
        assert_eq!(reports[0].findings[0].message, "No OpenAPI schema found in CRD");
    }

    #[test]
    fn filters_by_provider_and_type() {
        let by_type = check(
            &source(),
            &ContractArgs {
                provider_type: Some(ProviderType::ControlPlane),
                ..ContractArgs::default()
            },
        );
        assert_eq!(scopes(&by_type), vec!["kubeadm (controlplane)"]);

        let by_provider = check(
            &source(),
            &ContractArgs {
                provider: Some("Docker".into()),
                ..ContractArgs::default()
            },
        );
        assert_eq!(by_provider.len(), 2);
    }

    #[test]
    fn summary_lists_non_compliant_providers() {
        let text = render_summary(&check(&source(), &ContractArgs::default()));
        assert!(text.contains("Total providers checked: 4\nCompliant: 3\nNon-compliant: 1\n"));
        assert!(text.contains("  - docker (infrastructure-machine): 1 errors\n"));
    }
}
