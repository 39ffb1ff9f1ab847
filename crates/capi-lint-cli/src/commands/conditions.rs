//! Conditions command: status conditions across every CAPI resource in scope.

use anyhow::Result;
use capi_lint_core::CLUSTER_NAME_LABEL;
use capi_lint_rules::conditions::{self, Condition, ConditionSummary};
use capi_lint_source::{Query, ResourceSource};
use serde::Serialize;
use std::fmt::Write;

use crate::{ConditionsFormat, Globals, ScopeArgs};

const CLUSTERS: &str = "clusters.cluster.x-k8s.io";

/// Resource types whose conditions are collected.
const RESOURCES: &[&str] = &[
    CLUSTERS,
    "machines.cluster.x-k8s.io",
    "machinesets.cluster.x-k8s.io",
    "machinedeployments.cluster.x-k8s.io",
    "machinepools.cluster.x-k8s.io",
    "machinehealthchecks.cluster.x-k8s.io",
    "kubeadmconfigs.bootstrap.cluster.x-k8s.io",
    "kubeadmcontrolplanes.controlplane.cluster.x-k8s.io",
];

const SUMMARY_RULE: &str = "==================================================";

/// Runs the conditions command. Exits 1 when any condition is unhealthy.
pub fn run(scope: &ScopeArgs, show_all: bool, format: ConditionsFormat, globals: &Globals) -> Result<i32> {
    let config = super::load_config(globals)?;
    let source = super::scope_source(&scope.manifests, &config)?;

    tracing::info!("Collecting conditions from CAPI resources...");
    let collected = collect(source.as_ref(), scope);
    if collected.is_empty() {
        println!("No CAPI resources found");
        return Ok(0);
    }

    match format {
        ConditionsFormat::Json => println!("{}", render_json(&collected)?),
        ConditionsFormat::Summary => print!("{}", render_summary(&collected)),
        ConditionsFormat::Table => {
            print!("{}", render_table(&collected, show_all));
            print!("{}", render_summary(&collected));
        }
    }

    Ok(i32::from(collected.iter().any(|c| !c.is_healthy())))
}

/// Collects conditions of every resource in scope. Unreadable types are skipped.
///
/// With a cluster filter, owned objects are selected by the cluster-name
/// label and the Cluster itself by name.
pub fn collect(source: &dyn ResourceSource, scope: &ScopeArgs) -> Vec<Condition> {
    let all_namespaces = scope.all_namespaces && scope.namespace.is_none();
    let mut collected = Vec::new();

    for resource in RESOURCES {
        let mut query = Query::new(*resource)
            .namespace(scope.namespace.as_deref())
            .all_namespaces(all_namespaces);
        if let Some(cluster) = &scope.cluster {
            query = if *resource == CLUSTERS {
                query.named(cluster.clone()).all_namespaces(false)
            } else {
                query.selector(format!("{CLUSTER_NAME_LABEL}={cluster}"))
            };
        }

        match source.get(&query) {
            Ok(items) => collected.extend(items.iter().flat_map(conditions::conditions)),
            Err(e) => tracing::debug!("Skipping {resource}: {e}"),
        }
    }

    collected
}

fn status_icon(status: &str) -> &'static str {
    match status {
        "True" => "✓",
        "False" => "✗",
        _ => "?",
    }
}

/// Aligned table of unhealthy conditions, or all of them with `show_all`.
pub fn render_table(collected: &[Condition], show_all: bool) -> String {
    let rows: Vec<[String; 5]> = collected
        .iter()
        .filter(|c| show_all || !c.is_healthy())
        .map(|c| {
            [
                c.kind.clone(),
                format!("{}/{}", c.namespace, c.name),
                c.condition_type.clone(),
                format!("{} {}", status_icon(&c.status), c.status),
                if c.reason.is_empty() { "-".to_string() } else { c.reason.clone() },
            ]
        })
        .collect();

    let mut out = String::new();
    if rows.is_empty() {
        let _ = writeln!(out, "No unhealthy conditions found ✅");
        return out;
    }

    let headers = ["KIND", "RESOURCE", "CONDITION", "STATUS", "REASON"].map(str::to_string);
    let mut widths = headers.each_ref().map(String::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    push_row(&mut out, &headers, &widths);
    let _ = writeln!(out, "{}", "-".repeat(widths.iter().map(|w| w + 2).sum()));
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    for (cell, width) in cells.iter().zip(widths) {
        let _ = write!(out, "{cell:<width$}  ");
    }
    out.push('\n');
}

/// Totals, per-kind health and the unhealthy condition types.
pub fn render_summary(collected: &[Condition]) -> String {
    let summary = ConditionSummary::new(collected);
    let mut out = String::new();

    let _ = writeln!(out, "\n{SUMMARY_RULE}");
    let _ = writeln!(out, "CONDITIONS SUMMARY");
    let _ = writeln!(out, "{SUMMARY_RULE}");
    let _ = writeln!(out, "Total conditions: {}", summary.total);
    let _ = writeln!(out, "  Healthy: {} ✓", summary.healthy);
    let _ = writeln!(out, "  Unhealthy: {} ✗", summary.unhealthy());

    let _ = writeln!(out, "\nBy resource type:");
    for (kind, health) in &summary.by_kind {
        let icon = if health.healthy == health.total { "✓" } else { "✗" };
        let _ = writeln!(out, "  {kind}: {}/{} healthy {icon}", health.healthy, health.total);
    }

    if !summary.unhealthy_types.is_empty() {
        let _ = writeln!(out, "\nUnhealthy condition types:");
        for condition_type in &summary.unhealthy_types {
            let _ = writeln!(out, "  - {condition_type}");
        }
    }
    out
}

#[derive(Serialize)]
struct JsonCondition<'a> {
    resource: String,
    condition: &'a str,
    status: &'a str,
    reason: &'a str,
    message: &'a str,
    healthy: bool,
}

/// Every condition as a pretty-printed JSON array.
pub fn render_json(collected: &[Condition]) -> Result<String, serde_json::Error> {
    let items: Vec<_> = collected
        .iter()
        .map(|c| JsonCondition {
            resource: c.resource(),
            condition: &c.condition_type,
            status: &c.status,
            reason: &c.reason,
            message: &c.message,
            healthy: c.is_healthy(),
        })
        .collect();
    serde_json::to_string_pretty(&items)
}
