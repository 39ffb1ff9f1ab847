//! Static knowledge about Cluster API kinds.

/// API group each known kind must be served from.
pub const API_GROUPS: &[(&str, &str)] = &[
    ("Cluster", "cluster.x-k8s.io"),
    ("ClusterClass", "cluster.x-k8s.io"),
    ("Machine", "cluster.x-k8s.io"),
    ("MachineSet", "cluster.x-k8s.io"),
    ("MachineDeployment", "cluster.x-k8s.io"),
    ("MachinePool", "cluster.x-k8s.io"),
    ("MachinePoolMachine", "cluster.x-k8s.io"),
    ("MachineHealthCheck", "cluster.x-k8s.io"),
    ("ClusterResourceSet", "addons.cluster.x-k8s.io"),
    ("ClusterResourceSetBinding", "addons.cluster.x-k8s.io"),
    ("KubeadmConfig", "bootstrap.cluster.x-k8s.io"),
    ("KubeadmConfigTemplate", "bootstrap.cluster.x-k8s.io"),
    ("KubeadmControlPlane", "controlplane.cluster.x-k8s.io"),
    ("KubeadmControlPlaneTemplate", "controlplane.cluster.x-k8s.io"),
    ("IPAddressClaim", "ipam.cluster.x-k8s.io"),
    ("IPAddress", "ipam.cluster.x-k8s.io"),
];

/// `spec` fields each kind must set.
pub const REQUIRED_SPEC_FIELDS: &[(&str, &[&str])] = &[
    ("Cluster", &["infrastructureRef", "controlPlaneRef"]),
    ("Machine", &["clusterName", "bootstrap"]),
    ("MachineSet", &["clusterName", "template"]),
    ("MachineDeployment", &["clusterName", "template"]),
    ("MachinePool", &["clusterName", "template"]),
    ("ClusterClass", &["infrastructure", "controlPlane"]),
    ("MachineHealthCheck", &["clusterName", "selector", "unhealthyConditions"]),
];

/// `Cluster` fields implied by `spec.topology`.
pub const TOPOLOGY_IMPLIED_FIELDS: &[&str] = &["infrastructureRef", "controlPlaneRef"];

/// Kinds that belong to a cluster through the cluster-name label.
pub const MACHINE_FAMILY: &[&str] = &["Machine", "MachineSet", "MachineDeployment", "MachinePool"];

/// A field that still works but is scheduled to go away.
#[derive(Debug, Clone, Copy)]
pub struct DeprecatedField {
    /// Kind carrying the field.
    pub kind: &'static str,
    /// Dot path of the field.
    pub path: &'static str,
    /// Release that deprecated it.
    pub since: &'static str,
    /// Why it is deprecated.
    pub reason: &'static str,
    /// What to do instead.
    pub action: &'static str,
}

/// Deprecated fields, in reporting order.
pub const DEPRECATED_FIELDS: &[DeprecatedField] = &[
    DeprecatedField {
        kind: "Cluster",
        path: "spec.paused",
        since: "v1.4.0",
        reason: "Replaced by .spec.topology.controlPlane and .spec.topology.workers",
        action: "Remove spec.paused and use topology-level pause",
    },
    DeprecatedField {
        kind: "Machine",
        path: "spec.version",
        since: "v1.5.0",
        reason: "Version is now inherited from control plane or topology",
        action: "Remove spec.version if using topology-based cluster",
    },
    DeprecatedField {
        kind: "Machine",
        path: "status.phase",
        since: "v1.11.0",
        reason: "Phase deprecated in v1beta2; use conditions instead",
        action: "Migrate to reading status.conditions for machine state",
    },
    DeprecatedField {
        kind: "MachineDeployment",
        path: "spec.template.spec.version",
        since: "v1.11.0",
        reason: "Version now inherited from topology or control plane",
        action: "Remove if using ClusterClass topology",
    },
    DeprecatedField {
        kind: "MachineSet",
        path: "spec.template.spec.version",
        since: "v1.11.0",
        reason: "Version now inherited from owning MachineDeployment",
        action: "Remove and let MachineDeployment propagate version",
    },
    DeprecatedField {
        kind: "KubeadmControlPlane",
        path: "spec.kubeadmConfigSpec.clusterConfiguration.clusterName",
        since: "v1.11.0",
        reason: "Inferred from top level, removed to avoid confusion",
        action: "Remove this field",
    },
];

/// Expected API group for `kind`, if it is a known CAPI kind.
#[must_use]
pub fn expected_group(kind: &str) -> Option<&'static str> {
    API_GROUPS.iter().find(|(k, _)| *k == kind).map(|(_, g)| *g)
}

/// Required `spec` fields for `kind`.
#[must_use]
pub fn required_spec_fields(kind: &str) -> Option<&'static [&'static str]> {
    REQUIRED_SPEC_FIELDS
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, fields)| *fields)
}

/// Deprecated fields declared for `kind`.
pub fn deprecated_fields(kind: &str) -> impl Iterator<Item = &'static DeprecatedField> + '_ {
    DEPRECATED_FIELDS.iter().filter(move |f| f.kind == kind)
}

/// Returns true for Machine, `MachineSet`, `MachineDeployment` and `MachinePool`.
#[must_use]
pub fn is_machine_family(kind: &str) -> bool {
    MACHINE_FAMILY.contains(&kind)
}
