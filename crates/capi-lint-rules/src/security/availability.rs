//! Rule checking control-plane replica counts for etcd quorum safety.

use capi_lint_core::{Document, Finding, Rule, RuleContext, SecurityConfig, Severity};
use tracing::debug;

/// Rule code for control-plane-replicas.
pub const CODE: &str = "CL107";

/// Rule name for control-plane-replicas.
pub const NAME: &str = "control-plane-replicas";

const CATEGORY: &str = "Availability";

/// Requires at least the configured number of control-plane replicas and an odd count.
///
/// The count comes from `spec.topology.controlPlane.replicas`, or else from
/// the related `KubeadmControlPlane` the Cluster points at. An omitted count
/// is the API default of 1. Clusters with neither a topology nor a related
/// control plane are skipped.
#[derive(Debug, Clone)]
pub struct ControlPlaneReplicas {
    min: i64,
    too_few: Severity,
    even: Severity,
}

impl Default for ControlPlaneReplicas {
    fn default() -> Self {
        Self::new(&SecurityConfig::default())
    }
}

impl ControlPlaneReplicas {
    /// Creates the rule with thresholds from `config`.
    #[must_use]
    pub fn new(config: &SecurityConfig) -> Self {
        Self {
            min: config.min_control_plane_replicas,
            too_few: config.too_few_replicas,
            even: config.even_replicas,
        }
    }
}

/// Replica count the API server assumes when `replicas` is omitted.
const DEFAULT_REPLICAS: i64 = 1;

/// Control-plane replica count of a Cluster, `None` when no control plane is known.
pub(crate) fn control_plane_replicas(cluster: &Document, ctx: &RuleContext<'_>) -> Option<i64> {
    if cluster.path("spec.topology").as_map().is_some() {
        return Some(
            cluster
                .i64_at("spec.topology.controlPlane.replicas")
                .unwrap_or(DEFAULT_REPLICAS),
        );
    }
    let cp_ref = cluster.path("spec.controlPlaneRef");
    let ref_name = cp_ref.str_at("name").unwrap_or_default();
    let namespace = cluster.namespace();
    ctx.related_of_kind("KubeadmControlPlane")
        .filter(|kcp| kcp.namespace() == namespace)
        .find(|kcp| {
            kcp.name() == ref_name
                || kcp
                    .owner_references()
                    .iter()
                    .any(|owner| owner.str_at("kind") == Some("Cluster") && owner.str_at("name") == Some(cluster.name()))
        })
        .map(|kcp| kcp.i64_at("spec.replicas").unwrap_or(DEFAULT_REPLICAS))
}

impl Rule for ControlPlaneReplicas {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires at least 3 and an odd number of control-plane replicas"
    }

    fn default_severity(&self) -> Severity {
        self.too_few
    }

    fn check(&self, doc: &Document, ctx: &RuleContext<'_>) -> Vec<Finding> {
        if doc.kind() != "Cluster" {
            return vec![];
        }
        let Some(replicas) = control_plane_replicas(doc, ctx) else {
            debug!("No control plane found for {}", doc.resource_id());
            return vec![];
        };

        let mut findings = Vec::new();
        if replicas < self.min {
            findings.push(
                Finding::new(
                    self.too_few,
                    CATEGORY,
                    doc.resource_id(),
                    format!("Control plane has {replicas} replica(s) (recommend {} for HA)", self.min),
                )
                .with_recommendation(format!("Use {} control plane replicas for production HA", self.min)),
            );
        }
        if replicas % 2 == 0 {
            findings.push(
                Finding::new(
                    self.even,
                    CATEGORY,
                    doc.resource_id(),
                    format!("Control plane has even number of replicas ({replicas})"),
                )
                .with_recommendation("Use odd number of replicas for proper etcd quorum"),
            );
        }
        findings
    }
}
