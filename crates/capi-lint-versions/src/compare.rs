//! Comparing two release points.

use crate::knowledge::{fact, known_versions, ApiChange, VersionFact, API_CHANGES};
use semver::Version;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised by version comparison.
#[derive(Debug, Error)]
pub enum VersionError {
    /// The input is not a semantic version.
    #[error("Invalid version '{input}': {source}")]
    Invalid {
        /// Text given by the caller.
        input: String,
        /// Underlying parse error.
        source: semver::Error,
    },
}

/// Parses `v1.8`, `1.8.0` or `v1.8.0` into a semantic version.
///
/// A leading `v` is optional and missing minor or patch components are
/// treated as zero.
///
/// # Errors
///
/// Returns an error if the text is not a version.
pub fn parse_version(input: &str) -> Result<Version, VersionError> {
    let trimmed = input.trim();
    let bare = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    let core_len = bare.find(['-', '+']).unwrap_or(bare.len());
    let (core, suffix) = bare.split_at(core_len);
    let mut padded = core.to_string();
    for _ in core.split('.').count()..3 {
        padded.push_str(".0");
    }
    padded.push_str(suffix);

    Version::parse(&padded).map_err(|source| VersionError::Invalid {
        input: input.to_string(),
        source,
    })
}

/// Kubernetes support at both ends of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KubernetesChange {
    /// Oldest Kubernetes supported by the source release.
    pub from_min: String,
    /// Newest Kubernetes supported by the source release.
    pub from_max: String,
    /// Oldest Kubernetes supported by the target release.
    pub to_min: String,
    /// Newest Kubernetes supported by the target release.
    pub to_max: String,
}

/// Go toolchain at both ends of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolchainChange {
    /// Toolchain of the source release.
    pub from: String,
    /// Toolchain of the target release.
    pub to: String,
}

impl ToolchainChange {
    /// Returns true if the toolchain differs between the two releases.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// The difference between two releases.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    /// Source release, normalized to `vX.Y.Z`.
    pub from_version: String,
    /// Target release, normalized to `vX.Y.Z`.
    pub to_version: String,
    /// Known releases `v` with `from < v <= to`, ascending.
    pub versions_between: Vec<String>,
    /// Kubernetes support change; absent unless both ends are known.
    pub kubernetes_change: Option<KubernetesChange>,
    /// Go toolchain change; absent unless both ends are known.
    pub go_change: Option<ToolchainChange>,
    /// Breaking changes of every release in range, in release order.
    pub breaking_changes: Vec<String>,
    /// Deprecations of every release in range, in release order.
    pub deprecations: Vec<String>,
    /// Features of every release in range, in release order.
    pub new_features: Vec<String>,
    /// API field changes; empty when the range is empty.
    pub api_changes: Vec<ApiChange>,
    /// Inputs missing from the knowledge base.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unknown_versions: Vec<String>,
}

impl Comparison {
    /// Returns true if no release lies between the two ends.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.versions_between.is_empty()
    }
}

/// Compares two releases.
///
/// Versions missing from the knowledge base still take part in the range
/// computation; they are logged and listed in
/// [`Comparison::unknown_versions`].
///
/// # Errors
///
/// Returns an error if either input is not a version.
pub fn compare(from: &str, to: &str) -> Result<Comparison, VersionError> {
    let from = parse_version(from)?;
    let to = parse_version(to)?;

    let mut unknown_versions = Vec::new();
    for version in [&from, &to] {
        if fact(version).is_none() {
            warn!("Version v{version} not in knowledge base");
            unknown_versions.push(format!("v{version}"));
        }
    }
    if from > to {
        debug!("v{from} is newer than v{to}, range is empty");
    }

    let in_range: Vec<_> = known_versions()
        .filter(|(version, _)| from < **version && **version <= to)
        .map(|(_, fact)| fact)
        .collect();

    let union = |pick: fn(&VersionFact) -> &'static [&'static str]| -> Vec<String> {
        in_range
            .iter()
            .flat_map(|fact| pick(fact).iter().map(|s| (*s).to_string()))
            .collect()
    };

    let (kubernetes_change, go_change) = match (fact(&from), fact(&to)) {
        (Some(a), Some(b)) => (
            Some(KubernetesChange {
                from_min: a.kubernetes.min.to_string(),
                from_max: a.kubernetes.max.to_string(),
                to_min: b.kubernetes.min.to_string(),
                to_max: b.kubernetes.max.to_string(),
            }),
            Some(ToolchainChange {
                from: a.go_version.to_string(),
                to: b.go_version.to_string(),
            }),
        ),
        _ => (None, None),
    };

    Ok(Comparison {
        from_version: format!("v{from}"),
        to_version: format!("v{to}"),
        versions_between: in_range.iter().map(|fact| fact.version.to_string()).collect(),
        kubernetes_change,
        go_change,
        breaking_changes: union(|fact| fact.breaking),
        deprecations: union(|fact| fact.deprecations),
        new_features: union(|fact| fact.features),
        api_changes: if in_range.is_empty() { Vec::new() } else { API_CHANGES.to_vec() },
        unknown_versions,
    })
}
