//! Static release facts.

use once_cell::sync::Lazy;
use semver::Version;
use serde::Serialize;

/// Supported Kubernetes versions of a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KubernetesRange {
    /// Oldest supported workload cluster version.
    pub min: &'static str,
    /// Newest supported version, patch wildcarded.
    pub max: &'static str,
}

/// What is known about one Cluster API release.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VersionFact {
    /// Release tag, e.g. `v1.8.0`.
    pub version: &'static str,
    /// Release date (`YYYY-MM-DD`).
    pub release_date: &'static str,
    /// Supported Kubernetes range.
    pub kubernetes: KubernetesRange,
    /// Go toolchain the release is built with.
    pub go_version: &'static str,
    /// Storage API version served.
    pub api_version: &'static str,
    /// Notable features.
    pub features: &'static [&'static str],
    /// Deprecations announced.
    pub deprecations: &'static [&'static str],
    /// Breaking changes.
    pub breaking: &'static [&'static str],
}

/// Known releases. Append new entries; existing ones never change.
pub const VERSIONS: &[VersionFact] = &[
    VersionFact {
        version: "v1.6.0",
        release_date: "2024-03-26",
        kubernetes: KubernetesRange { min: "v1.26.0", max: "v1.30.x" },
        go_version: "1.21",
        api_version: "v1beta1",
        features: &[
            "ClusterClass stable",
            "MachinePool support improvements",
            "clusterctl upgrade enhancements",
        ],
        deprecations: &[
            "v1alpha3 API removal planned",
            "Cluster.spec.paused deprecated for managed topologies",
        ],
        breaking: &[],
    },
    VersionFact {
        version: "v1.7.0",
        release_date: "2024-04-23",
        kubernetes: KubernetesRange { min: "v1.27.0", max: "v1.31.x" },
        go_version: "1.21",
        api_version: "v1beta1",
        features: &[
            "In-place propagation for ClusterClass",
            "MachineDeployment rollout improvements",
            "Enhanced MachineHealthCheck",
        ],
        deprecations: &["v1alpha4 API removal planned"],
        breaking: &["Minimum Kubernetes version raised to v1.27.0"],
    },
    VersionFact {
        version: "v1.8.0",
        release_date: "2024-10-08",
        kubernetes: KubernetesRange { min: "v1.28.0", max: "v1.32.x" },
        go_version: "1.22",
        api_version: "v1beta1",
        features: &[
            "v1beta2 conditions (experimental)",
            "ClusterClass variable discovery",
            "Improved topology mutation hooks",
        ],
        deprecations: &["v1beta1 conditions (planned migration to v1beta2)"],
        breaking: &["Go 1.22 required", "Minimum Kubernetes version raised to v1.28.0"],
    },
    VersionFact {
        version: "v1.9.0",
        release_date: "2025-01-14",
        kubernetes: KubernetesRange { min: "v1.29.0", max: "v1.33.x" },
        go_version: "1.22",
        api_version: "v1beta1",
        features: &[
            "MachinePool machines for CAPD",
            "Node deletion tracking improvements",
            "Enhanced ClusterResourceSet bindings",
        ],
        deprecations: &[],
        breaking: &[],
    },
    VersionFact {
        version: "v1.10.0",
        release_date: "2025-04-08",
        kubernetes: KubernetesRange { min: "v1.30.0", max: "v1.34.x" },
        go_version: "1.23",
        api_version: "v1beta1",
        features: &[
            "Managed topologies improvements",
            "Extended provider contract",
            "Improved machine remediation",
        ],
        deprecations: &[],
        breaking: &[],
    },
    VersionFact {
        version: "v1.11.0",
        release_date: "2025-07-08",
        kubernetes: KubernetesRange { min: "v1.30.0", max: "v1.34.x" },
        go_version: "1.24",
        api_version: "v1beta1",
        features: &["ClusterClass variable discovery", "Improved rollout controls"],
        deprecations: &[],
        breaking: &["Go 1.24 required"],
    },
    VersionFact {
        version: "v1.12.0",
        release_date: "2025-10-07",
        kubernetes: KubernetesRange { min: "v1.31.0", max: "v1.35.x" },
        go_version: "1.24",
        api_version: "v1beta1",
        features: &[
            "v1beta2 conditions GA",
            "Enhanced topology validation",
            "Improved observability",
        ],
        deprecations: &["v1beta1 conditions (use v1beta2)"],
        breaking: &[],
    },
];

/// Kind of a v1beta1 → v1beta2 API change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiChangeType {
    /// A field keeps its name but changes type or location.
    FieldRename,
    /// A field is superseded by another.
    FieldChange,
    /// A new field.
    FieldAdd,
    /// A removed field.
    FieldRemove,
    /// Same field, different semantics or encoding.
    BehaviorChange,
}

impl ApiChangeType {
    /// Marker used in text output.
    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::FieldRename => "↔️",
            Self::FieldChange => "🔄",
            Self::FieldAdd => "➕",
            Self::FieldRemove => "➖",
            Self::BehaviorChange => "⚙️",
        }
    }
}

/// One entry of the API field change table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApiChange {
    /// Change type.
    #[serde(rename = "type")]
    pub change_type: ApiChangeType,
    /// Affected kind, or `All`.
    pub kind: &'static str,
    /// Previous field or form, empty for additions.
    pub old: &'static str,
    /// New field or form.
    pub new: &'static str,
    /// What changed.
    pub description: &'static str,
}

/// v1beta1 → v1beta2 field changes.
pub const API_CHANGES: &[ApiChange] = &[
    ApiChange {
        change_type: ApiChangeType::FieldRename,
        kind: "Cluster",
        old: "spec.infrastructureRef",
        new: "spec.infrastructureRef (TypedObjectReference)",
        description: "InfrastructureRef now uses TypedObjectReference type",
    },
    ApiChange {
        change_type: ApiChangeType::FieldRename,
        kind: "Cluster",
        old: "spec.controlPlaneRef",
        new: "spec.controlPlaneRef (TypedObjectReference)",
        description: "ControlPlaneRef now uses TypedObjectReference type",
    },
    ApiChange {
        change_type: ApiChangeType::FieldChange,
        kind: "Machine",
        old: "status.phase",
        new: "status.conditions",
        description: "Phase deprecated; use conditions for state",
    },
    ApiChange {
        change_type: ApiChangeType::FieldAdd,
        kind: "Cluster",
        old: "",
        new: "status.v1beta2.conditions",
        description: "New v1beta2 conditions location",
    },
    ApiChange {
        change_type: ApiChangeType::FieldAdd,
        kind: "MachineDeployment",
        old: "",
        new: "spec.strategy.rollingUpdate.deletePolicy",
        description: "New delete policy for rollouts",
    },
    ApiChange {
        change_type: ApiChangeType::BehaviorChange,
        kind: "All",
        old: "Integer durations (seconds)",
        new: "String durations (e.g., '10m')",
        description: "Duration fields now use string format",
    },
];

static SORTED: Lazy<Vec<(Version, &'static VersionFact)>> = Lazy::new(|| {
    let mut versions: Vec<_> = VERSIONS
        .iter()
        .filter_map(|fact| {
            let version = Version::parse(fact.version.trim_start_matches('v')).ok()?;
            Some((version, fact))
        })
        .collect();
    versions.sort_by(|a, b| a.0.cmp(&b.0));
    versions
});

/// Known releases in ascending semantic-version order.
pub fn known_versions() -> impl Iterator<Item = (&'static Version, &'static VersionFact)> {
    SORTED.iter().map(|(version, fact)| (version, *fact))
}

/// Facts for `version`, if it is a known release.
#[must_use]
pub fn fact(version: &Version) -> Option<&'static VersionFact> {
    known_versions().find(|(v, _)| *v == version).map(|(_, fact)| fact)
}
