//! Migrate command: v1beta2 readiness of manifests and live resources.

use anyhow::{bail, Result};
use capi_lint_core::{Document, Engine, ExitPolicy, Report, Severity};
use capi_lint_rules::Preset;
use capi_lint_source::{Query, ResourceSource};
use std::path::PathBuf;

use crate::{Globals, ReportArgs};

/// Resource types read from a live cluster.
const LIVE_RESOURCES: &[&str] = &[
    "clusters.cluster.x-k8s.io",
    "machines.cluster.x-k8s.io",
    "machinesets.cluster.x-k8s.io",
    "machinedeployments.cluster.x-k8s.io",
    "machinepools.cluster.x-k8s.io",
    "kubeadmconfigs.bootstrap.cluster.x-k8s.io",
    "kubeadmcontrolplanes.controlplane.cluster.x-k8s.io",
];

/// Runs the migrate command.
pub fn run(
    paths: &[PathBuf],
    recursive: bool,
    live: bool,
    namespace: Option<&str>,
    report: &ReportArgs,
    globals: &Globals,
) -> Result<i32> {
    if paths.is_empty() && !live {
        bail!("Nothing to check: pass manifest paths or --live");
    }

    let config = super::load_config(globals)?;
    let policy = super::exit_policy(&config, ExitPolicy::fail_at(Severity::Warning), report.strict);
    let source = if live { Some(super::live_source(&config)?) } else { None };
    let engine = Preset::Migration.engine(config);

    let mut reports = Vec::new();
    if !paths.is_empty() {
        reports.extend(super::manifests::check_paths(&engine, paths, recursive)?);
    }
    if let Some(source) = &source {
        tracing::info!("Analyzing live cluster resources...");
        reports.push(check_live(&engine, source, namespace));
    }

    super::output::emit(&reports, report)?;
    Ok(policy.exit_code(&reports))
}

/// Checks every migratable resource the source returns. Unreadable types are skipped.
pub fn check_live(engine: &Engine, source: &dyn ResourceSource, namespace: Option<&str>) -> Report {
    let mut documents: Vec<Document> = Vec::new();
    for resource in LIVE_RESOURCES {
        let query = Query::new(*resource)
            .namespace(namespace)
            .all_namespaces(namespace.is_none());
        match source.get(&query) {
            Ok(items) => documents.extend(items),
            Err(e) => tracing::warn!("Skipping {resource}: {e}"),
        }
    }
    let scope = match namespace {
        Some(ns) => format!("live/{ns}"),
        None => "live".to_string(),
    };
    Report::with_findings(scope, engine.run(&documents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use capi_lint_core::Config;
    use capi_lint_source::MemorySource;
    use serde_json::json;

    #[test]
    fn live_resources_are_checked_across_namespaces() {
        let source = MemorySource::new(vec![
            Document::from(json!({
                "apiVersion": "cluster.x-k8s.io/v1beta1",
                "kind": "Machine",
                "metadata": { "name": "m0", "namespace": "a" },
                "status": { "phase": "Running" }
            })),
            Document::from(json!({
                "apiVersion": "cluster.x-k8s.io/v1beta2",
                "kind": "Cluster",
                "metadata": { "name": "c", "namespace": "b" }
            })),
        ]);
        let engine = Preset::Migration.engine(Config::default());

        let report = check_live(&engine, &source, None);
        assert_eq!(report.scope, "live");
        let codes: Vec<_> = report.findings.iter().filter_map(|f| f.code.as_deref()).collect();
        assert_eq!(codes, vec!["CL301", "CL302"]);

        let scoped = check_live(&engine, &source, Some("b"));
        assert!(scoped.findings.is_empty());
    }
}
