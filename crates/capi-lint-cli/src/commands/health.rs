//! Health command: condition checks over one cluster and everything it owns.

use anyhow::{bail, Context, Result};
use capi_lint_core::{Engine, ExitPolicy, Report, Severity};
use capi_lint_rules::Preset;
use capi_lint_source::{Query, ResourceSource, Resolver};
use std::path::PathBuf;

use crate::{Globals, OutputFormat, ReportArgs};

const CLUSTERS: &str = "clusters.cluster.x-k8s.io";

/// Label-owned resource types checked alongside the cluster.
const OWNED_RESOURCES: &[&str] = &[
    "machines.cluster.x-k8s.io",
    "machinesets.cluster.x-k8s.io",
    "machinedeployments.cluster.x-k8s.io",
    "machinepools.cluster.x-k8s.io",
];

/// Runs the health command.
pub fn run(
    cluster: &str,
    namespace: Option<&str>,
    manifests: &[PathBuf],
    report: &ReportArgs,
    globals: &Globals,
) -> Result<i32> {
    let config = super::load_config(globals)?;
    let policy = super::exit_policy(
        &config,
        ExitPolicy::fail_at(Severity::Warning).escalate_at(Severity::Error),
        report.strict,
    );
    let source = super::scope_source(manifests, &config)?;
    let engine = Preset::Health.engine(config);

    tracing::info!("Checking health of cluster {cluster}...");
    let result = check_cluster(&engine, source.as_ref(), cluster, namespace.unwrap_or("default"))?;
    let reports = [result];

    super::output::emit(&reports, report)?;
    if report.output.is_none() && report.format == OutputFormat::Text {
        println!("Status: {}", status(&reports[0]));
    }
    Ok(policy.exit_code(&reports))
}

/// Checks the named cluster, the objects it references and the objects labeled as its own.
pub fn check_cluster(engine: &Engine, source: &dyn ResourceSource, name: &str, namespace: &str) -> Result<Report> {
    let query = Query::new(CLUSTERS).named(name).namespace(Some(namespace));
    let Some(cluster) = source
        .get(&query)
        .with_context(|| format!("Failed to get cluster {namespace}/{name}"))?
        .into_iter()
        .next()
    else {
        bail!("Cluster {namespace}/{name} not found");
    };

    let mut resolver = Resolver::new(source);
    let mut documents = resolver.resolve(&cluster);
    documents.extend(resolver.owned_by_cluster(&cluster, OWNED_RESOURCES));
    documents.insert(0, cluster);
    tracing::debug!("Checking {} resource(s)", documents.len());

    Ok(Report::with_findings(format!("{namespace}/{name}"), engine.run(&documents)))
}

/// One-word verdict for a health report.
pub fn status(report: &Report) -> &'static str {
    match report.worst() {
        Some(severity) if severity >= Severity::Error => "UNHEALTHY",
        Some(severity) if severity >= Severity::Warning => "DEGRADED",
        _ => "HEALTHY",
    }
}
