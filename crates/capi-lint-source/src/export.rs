//! Cleaning and writing resources for re-application elsewhere.

use capi_lint_core::Document;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Server-populated metadata fields removed by [`clean`].
pub const SERVER_METADATA_FIELDS: &[&str] = &[
    "uid",
    "resourceVersion",
    "generation",
    "creationTimestamp",
    "managedFields",
    "selfLink",
    "ownerReferences",
];

/// Client-side apply bookkeeping annotation.
pub const LAST_APPLIED_ANNOTATION: &str = "kubectl.kubernetes.io/last-applied-configuration";

/// Placeholder written over secret values.
pub const REDACTED: &str = "REDACTED";

/// File name used with single-file output.
pub const SINGLE_FILE_NAME: &str = "cluster-state.yaml";

/// Errors raised while writing an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// IO error writing files.
    #[error("Failed to write {path}: {source}")]
    Io {
        /// Path being written.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// YAML serialization failed.
    #[error("Failed to serialize {resource}: {source}")]
    Serialize {
        /// Resource being serialized.
        resource: String,
        /// Underlying error.
        source: serde_yaml::Error,
    },
}

/// Strips server-populated state so the object can be applied to another cluster.
///
/// Removes top-level `status`, the server fields of every `metadata` block,
/// the last-applied annotation, and `uid`/`resourceVersion` from embedded
/// object references. Idempotent; `spec` content is otherwise untouched.
pub fn clean(doc: &mut Document) {
    if let Some(map) = doc.as_map_mut() {
        map.shift_remove("status");
    }
    clean_node(doc);
}

fn clean_node(node: &mut Document) {
    match node {
        Document::Map(map) => {
            if map.contains_key("kind") && map.contains_key("name") {
                map.shift_remove("uid");
                map.shift_remove("resourceVersion");
            }
            if let Some(metadata) = map.get_mut("metadata") {
                clean_metadata(metadata);
            }
            for value in map.values_mut() {
                clean_node(value);
            }
        }
        Document::List(items) => items.iter_mut().for_each(clean_node),
        _ => {}
    }
}

fn clean_metadata(metadata: &mut Document) {
    let Some(meta) = metadata.as_map_mut() else {
        return;
    };
    for field in SERVER_METADATA_FIELDS {
        meta.shift_remove(*field);
    }
    let drop_annotations = match meta.get_mut("annotations").and_then(Document::as_map_mut) {
        Some(annotations) => {
            annotations.shift_remove(LAST_APPLIED_ANNOTATION);
            annotations.is_empty()
        }
        None => false,
    };
    if drop_annotations {
        meta.shift_remove("annotations");
    }
}

/// Replaces every value under `data` and `stringData` with [`REDACTED`].
pub fn redact_secret(doc: &mut Document) {
    let Some(map) = doc.as_map_mut() else {
        return;
    };
    for section in ["data", "stringData"] {
        if let Some(values) = map.get_mut(section).and_then(Document::as_map_mut) {
            for value in values.values_mut() {
                *value = Document::from(REDACTED);
            }
        }
    }
}

/// Serializes documents as one YAML stream joined by `---`.
///
/// # Errors
///
/// Returns an error if a document cannot be serialized.
pub fn to_yaml_stream<'a>(docs: impl IntoIterator<Item = &'a Document>) -> Result<String, ExportError> {
    let mut parts = Vec::new();
    for doc in docs {
        let yaml = serde_yaml::to_string(doc).map_err(|source| ExportError::Serialize {
            resource: doc.resource_id(),
            source,
        })?;
        parts.push(yaml);
    }
    Ok(parts.join("---\n"))
}

/// Output file name for a kind: `Cluster` → `clusters.yaml`.
#[must_use]
pub fn file_name_for_kind(kind: &str) -> String {
    format!("{}s.yaml", kind.to_ascii_lowercase())
}

/// Writes documents into `dir`, either grouped per kind or into one file.
///
/// Returns the written paths with their document counts, in file-name order.
///
/// # Errors
///
/// Returns an error if the directory or a file cannot be written.
pub fn write_manifests(
    docs: &[Document],
    dir: &Path,
    single_file: bool,
) -> Result<Vec<(PathBuf, usize)>, ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut groups: BTreeMap<String, Vec<&Document>> = BTreeMap::new();
    for doc in docs {
        let name = if single_file {
            SINGLE_FILE_NAME.to_string()
        } else {
            file_name_for_kind(doc.kind())
        };
        groups.entry(name).or_default().push(doc);
    }

    let mut written = Vec::new();
    for (name, group) in groups {
        let path = dir.join(&name);
        let yaml = to_yaml_stream(group.iter().copied())?;
        std::fs::write(&path, yaml).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        info!("Wrote {} resource(s) to {}", group.len(), path.display());
        written.push((path, group.len()));
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn live_cluster() -> Document {
        Document::from(json!({
            "apiVersion": "cluster.x-k8s.io/v1beta1",
            "kind": "Cluster",
            "metadata": {
                "name": "alpha",
                "namespace": "prod",
                "uid": "1234",
                "resourceVersion": "99",
                "generation": 3,
                "creationTimestamp": "2025-01-01T00:00:00Z",
                "managedFields": [ { "manager": "capi" } ],
                "ownerReferences": [ { "kind": "ClusterClass", "name": "quick", "uid": "5" } ],
                "annotations": { "kubectl.kubernetes.io/last-applied-configuration": "{}" },
                "labels": { "env": "prod" }
            },
            "spec": {
                "paused": false,
                "infrastructureRef": {
                    "kind": "DockerCluster",
                    "name": "alpha",
                    "uid": "77",
                    "resourceVersion": "12"
                },
                "topology": {
                    "workers": { "machineDeployments": [ { "template": { "metadata": { "uid": "x", "labels": { "a": "b" } } } } ] }
                }
            },
            "status": { "phase": "Provisioned" }
        }))
    }

    #[test]
    fn cleaned_yaml_has_no_server_fields_at_any_depth() {
        let mut doc = live_cluster();
        clean(&mut doc);
        let yaml = to_yaml_stream([&doc]).unwrap();
        for key in ["status:", "resourceVersion:", "uid:", "managedFields:", "ownerReferences:"] {
            assert!(!yaml.contains(key), "{key} survived cleaning:\n{yaml}");
        }
        assert!(!yaml.contains("annotations:"));
        assert!(yaml.contains("env: prod"));
        assert!(yaml.contains("paused: false"));
        assert!(yaml.contains("kind: DockerCluster"));
    }

    #[test]
    fn cleaning_is_idempotent() {
        let mut once = live_cluster();
        clean(&mut once);
        let mut twice = once.clone();
        clean(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn spec_status_fields_are_kept() {
        let mut mhc = Document::from(json!({
            "kind": "MachineHealthCheck",
            "metadata": { "name": "mhc" },
            "spec": { "unhealthyConditions": [ { "type": "Ready", "status": "Unknown", "timeout": "300s" } ] }
        }));
        let before = mhc.path("spec").clone();
        clean(&mut mhc);
        assert_eq!(mhc.path("spec"), &before);
    }

    #[test]
    fn other_annotations_survive() {
        let mut doc = Document::from(json!({
            "kind": "Cluster",
            "metadata": { "name": "a", "annotations": { "owner": "team-a", "kubectl.kubernetes.io/last-applied-configuration": "{}" } }
        }));
        clean(&mut doc);
        assert_eq!(doc.annotation("owner"), Some("team-a"));
        assert_eq!(doc.annotation(LAST_APPLIED_ANNOTATION), None);
    }

    #[test]
    fn secrets_are_redacted() {
        let mut secret = Document::from(json!({
            "kind": "Secret",
            "metadata": { "name": "alpha-kubeconfig" },
            "data": { "value": "c2VjcmV0" },
            "stringData": { "token": "plain" }
        }));
        redact_secret(&mut secret);
        assert_eq!(secret.str_at("data.value"), Some(REDACTED));
        assert_eq!(secret.str_at("stringData.token"), Some(REDACTED));
    }

    #[test]
    fn writes_one_file_per_kind_or_single_file() {
        let docs = vec![
            Document::from(json!({ "kind": "Cluster", "metadata": { "name": "a" } })),
            Document::from(json!({ "kind": "Machine", "metadata": { "name": "m0" } })),
            Document::from(json!({ "kind": "Machine", "metadata": { "name": "m1" } })),
        ];
        let tmp = TempDir::new().unwrap();

        let written = write_manifests(&docs, tmp.path(), false).unwrap();
        let names: Vec<_> = written
            .iter()
            .map(|(p, n)| (p.file_name().unwrap().to_string_lossy().into_owned(), *n))
            .collect();
        assert_eq!(names, vec![("clusters.yaml".to_string(), 1), ("machines.yaml".to_string(), 2)]);
        let machines = std::fs::read_to_string(tmp.path().join("machines.yaml")).unwrap();
        assert_eq!(machines.matches("---\n").count(), 1);

        let single = tmp.path().join("single");
        let written = write_manifests(&docs, &single, true).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].1, 3);
    }
}
