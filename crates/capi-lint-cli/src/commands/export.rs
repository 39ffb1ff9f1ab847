//! Export command: writes a cluster's CAPI objects back to YAML for backup or migration.

use anyhow::{bail, Context, Result};
use capi_lint_core::{Document, CLUSTER_NAME_LABEL};
use capi_lint_source::export::{self, SINGLE_FILE_NAME};
use capi_lint_source::{Query, ResourceSource, Resolver, CAPI_GROUP_SUFFIX};
use clap::Args;
use std::path::PathBuf;

use crate::Globals;

/// Resource types exported for every cluster.
const CAPI_RESOURCES: &[&str] = &[
    "clusters.cluster.x-k8s.io",
    "machines.cluster.x-k8s.io",
    "machinesets.cluster.x-k8s.io",
    "machinedeployments.cluster.x-k8s.io",
    "machinepools.cluster.x-k8s.io",
    "machinehealthchecks.cluster.x-k8s.io",
    "clusterclasses.cluster.x-k8s.io",
    "clusterresourcesets.addons.cluster.x-k8s.io",
    "clusterresourcesetbindings.addons.cluster.x-k8s.io",
    "kubeadmconfigs.bootstrap.cluster.x-k8s.io",
    "kubeadmconfigtemplates.bootstrap.cluster.x-k8s.io",
    "kubeadmcontrolplanes.controlplane.cluster.x-k8s.io",
    "kubeadmcontrolplanetemplates.controlplane.cluster.x-k8s.io",
    "ipaddressclaims.ipam.cluster.x-k8s.io",
];

/// API group whose served types are discovered and exported too.
const PROVIDER_GROUP: &str = "infrastructure.cluster.x-k8s.io";

/// Arguments of the export command.
#[derive(Args, Debug, Clone, Default)]
pub struct ExportArgs {
    /// Cluster to export (required unless --all)
    #[arg(short, long)]
    pub cluster: Option<String>,

    /// Namespace to search (default: all namespaces)
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Output directory (default: cluster-state-<timestamp>)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Export every cluster
    #[arg(long, conflicts_with = "cluster")]
    pub all: bool,

    /// Keep secret values instead of redacting them
    #[arg(long)]
    pub include_secrets: bool,

    /// Do not follow infrastructure, control plane and bootstrap references
    #[arg(long)]
    pub no_refs: bool,

    /// Write everything to a single cluster-state.yaml
    #[arg(long)]
    pub single_file: bool,

    /// Read resources from manifests instead of the live cluster
    #[arg(long, num_args = 1..)]
    pub manifests: Vec<PathBuf>,
}

/// Runs the export command.
pub fn run(args: &ExportArgs, globals: &Globals) -> Result<i32> {
    if args.cluster.is_none() && !args.all {
        bail!("A cluster (--cluster) or --all is required");
    }

    let config = super::load_config(globals)?;
    let source = super::scope_source(&args.manifests, &config)?;

    match &args.cluster {
        Some(cluster) if !args.all => tracing::info!("Exporting cluster {cluster}"),
        _ => tracing::info!("Exporting all clusters"),
    }
    let documents = collect(source.as_ref(), args);
    if documents.is_empty() {
        println!("No resources found to export.");
        return Ok(0);
    }

    let dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("cluster-state-{}", chrono::Local::now().format("%Y%m%d-%H%M%S"))));
    let written = export::write_manifests(&documents, &dir, args.single_file)
        .with_context(|| format!("Failed to export to {}", dir.display()))?;

    let target = if args.single_file {
        dir.join(SINGLE_FILE_NAME)
    } else {
        dir.clone()
    };
    println!("Exported {} resources in {} file(s) to {}", documents.len(), written.len(), target.display());
    Ok(0)
}

/// Gathers, cleans and redacts every exported object.
///
/// Order: CAPI types, provider types, referenced objects, then secrets.
pub fn collect(source: &dyn ResourceSource, args: &ExportArgs) -> Vec<Document> {
    let filter = if args.all { None } else { args.cluster.as_deref() };
    let list = |resource: &str| -> Vec<Document> {
        let query = Query::new(resource)
            .namespace(args.namespace.as_deref())
            .all_namespaces(args.namespace.is_none());
        match source.get(&query) {
            Ok(items) => items,
            Err(e) => {
                tracing::debug!("Skipping {resource}: {e}");
                Vec::new()
            }
        }
    };

    let provider_resources = source.discover(PROVIDER_GROUP).unwrap_or_else(|e| {
        tracing::warn!("Provider discovery failed: {e}");
        Vec::new()
    });

    let mut documents = Vec::new();
    for resource in CAPI_RESOURCES.iter().copied().chain(provider_resources.iter().map(String::as_str)) {
        let items: Vec<_> = list(resource)
            .into_iter()
            .filter(|doc| filter.map_or(true, |cluster| belongs_to(doc, cluster)))
            .collect();
        if !items.is_empty() {
            tracing::info!("Found {} {resource}", items.len());
            documents.extend(items);
        }
    }

    if !args.no_refs {
        let mut resolver = Resolver::new(source);
        for doc in &documents {
            resolver.mark_seen(doc);
        }
        let referenced: Vec<_> = documents.iter().flat_map(|doc| resolver.resolve(doc)).collect();
        if !referenced.is_empty() {
            tracing::info!("Found {} referenced resources", referenced.len());
            documents.extend(referenced);
        }
    }

    let secrets: Vec<_> = list("secrets")
        .into_iter()
        .filter(|secret| exported_secret(secret, filter))
        .map(|mut secret| {
            if !args.include_secrets {
                export::redact_secret(&mut secret);
            }
            secret
        })
        .collect();
    if !secrets.is_empty() {
        tracing::info!("Found {} CAPI secrets", secrets.len());
        documents.extend(secrets);
    }

    for doc in &mut documents {
        export::clean(doc);
    }
    documents
}

/// Labeled for the cluster, pointing at it through `spec.clusterName`, or the Cluster itself.
fn belongs_to(doc: &Document, cluster: &str) -> bool {
    doc.label(CLUSTER_NAME_LABEL) == Some(cluster)
        || doc.str_at("spec.clusterName") == Some(cluster)
        || (doc.kind() == "Cluster" && doc.name() == cluster)
}

/// Secrets labeled for the cluster (any cluster with `--all`), or unlabeled and owned by a CAPI object.
fn exported_secret(secret: &Document, cluster: Option<&str>) -> bool {
    match secret.label(CLUSTER_NAME_LABEL) {
        Some(label) => cluster.map_or(true, |cluster| label == cluster),
        None => secret.owner_references().iter().any(|owner| {
            owner
                .str_at("apiVersion")
                .is_some_and(|v| v.contains(CAPI_GROUP_SUFFIX))
        }),
    }
}
