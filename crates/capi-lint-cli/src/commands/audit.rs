//! Audit command: security posture per cluster.

use anyhow::{Context, Result};
use capi_lint_core::{Document, Engine, ExitPolicy, Report, Severity, CLUSTER_NAME_LABEL};
use capi_lint_rules::Preset;
use capi_lint_source::{Query, ResourceSource};

use crate::{Globals, ReportArgs, ScopeArgs};

const CLUSTERS: &str = "clusters.cluster.x-k8s.io";
const CONTROL_PLANES: &str = "kubeadmcontrolplanes.controlplane.cluster.x-k8s.io";
const MACHINES: &str = "machines.cluster.x-k8s.io";
const SECRETS: &str = "secrets";

/// Runs the audit command.
pub fn run(scope: &ScopeArgs, report: &ReportArgs, globals: &Globals) -> Result<i32> {
    let config = super::load_config(globals)?;
    let policy = super::exit_policy(&config, ExitPolicy::fail_at(Severity::High), report.strict);
    let source = super::scope_source(&scope.manifests, &config)?;
    let engine = Preset::Audit.engine(config);

    tracing::info!("Running security audit...");
    let reports = audit(&engine, source.as_ref(), scope)?;
    if reports.is_empty() {
        println!("No clusters found to audit");
        return Ok(0);
    }

    super::output::emit(&reports, report)?;
    Ok(policy.exit_code(&reports))
}

/// Audits every cluster in scope, one report per cluster.
pub fn audit(engine: &Engine, source: &dyn ResourceSource, scope: &ScopeArgs) -> Result<Vec<Report>> {
    let mut query = Query::new(CLUSTERS)
        .namespace(scope.namespace.as_deref())
        .all_namespaces(scope.all_namespaces);
    if let Some(name) = &scope.cluster {
        query = query.named(name.clone());
    }
    let clusters = source.get(&query).context("Failed to list clusters")?;

    Ok(clusters
        .iter()
        .map(|cluster| {
            let documents = cluster_resources(source, cluster);
            tracing::debug!("Auditing {} with {} resource(s)", cluster.resource_id(), documents.len());
            let scope = format!("{}/{}", cluster.namespace().unwrap_or("default"), cluster.name());
            Report::with_findings(scope, engine.run(&documents))
        })
        .collect())
}

/// The cluster with its control planes, labeled machines and namespace secrets.
fn cluster_resources(source: &dyn ResourceSource, cluster: &Document) -> Vec<Document> {
    let ns = cluster.namespace().unwrap_or("default");
    let name = cluster.name();
    let control_plane_ref = cluster.str_at("spec.controlPlaneRef.name");
    let mut documents = vec![cluster.clone()];

    let list = |resource: &str, selector: Option<String>| -> Vec<Document> {
        let mut query = Query::new(resource).namespace(Some(ns));
        if let Some(selector) = selector {
            query = query.selector(selector);
        }
        source.get(&query).unwrap_or_else(|e| {
            tracing::warn!("Could not list {resource} for {ns}/{name}: {e}");
            Vec::new()
        })
    };

    documents.extend(list(CONTROL_PLANES, None).into_iter().filter(|kcp| {
        control_plane_ref == Some(kcp.name())
            || kcp
                .owner_references()
                .iter()
                .any(|owner| owner.str_at("kind") == Some("Cluster") && owner.str_at("name") == Some(name))
    }));
    documents.extend(list(MACHINES, Some(format!("{CLUSTER_NAME_LABEL}={name}"))));
    documents.extend(list(SECRETS, None));
    documents
}
