//! The resource source abstraction shared by live and offline loading.

use capi_lint_core::Document;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while fetching resources.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The query command is not installed.
    #[error("{program} not found in PATH")]
    CommandNotFound {
        /// Program that was looked up.
        program: String,
    },

    /// The query did not finish in time. The child process has been killed.
    #[error("query for {resource} timed out after {}s", after.as_secs())]
    Timeout {
        /// Resource type being queried.
        resource: String,
        /// Configured limit.
        after: Duration,
    },

    /// The command failed; carries its diagnostic output verbatim.
    #[error("query for {resource} failed: {stderr}")]
    Command {
        /// Resource type being queried.
        resource: String,
        /// Raw stderr text.
        stderr: String,
    },

    /// The command output was not valid JSON.
    #[error("invalid JSON for {resource}: {message}")]
    Parse {
        /// Resource type being queried.
        resource: String,
        /// Parser message.
        message: String,
    },

    /// IO error spawning or talking to the command.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One resource request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Resource type, e.g. `clusters.cluster.x-k8s.io` or `secrets`.
    pub resource: String,
    /// Single object name.
    pub name: Option<String>,
    /// Namespace to search.
    pub namespace: Option<String>,
    /// Equality-based label selector (`k=v,k2!=v2,k3`).
    pub label_selector: Option<String>,
    /// Search every namespace, ignoring `namespace`.
    pub all_namespaces: bool,
}

impl Query {
    /// Creates a query for all objects of `resource`.
    #[must_use]
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            ..Self::default()
        }
    }

    /// Restricts the query to one object.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Restricts the query to a namespace.
    #[must_use]
    pub fn namespace(mut self, namespace: Option<&str>) -> Self {
        self.namespace = namespace.filter(|ns| !ns.is_empty()).map(str::to_string);
        self
    }

    /// Adds a label selector.
    #[must_use]
    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.label_selector = Some(selector.into());
        self
    }

    /// Searches all namespaces.
    #[must_use]
    pub fn all_namespaces(mut self, all: bool) -> Self {
        self.all_namespaces = all;
        self
    }
}

/// Anything that can answer resource queries with documents.
pub trait ResourceSource {
    /// Fetches matching objects. Nothing found is `Ok(vec![])`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying transport fails.
    fn get(&self, query: &Query) -> Result<Vec<Document>, SourceError>;

    /// Lists resource type names served under `api_group`.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails.
    fn discover(&self, _api_group: &str) -> Result<Vec<String>, SourceError> {
        Ok(Vec::new())
    }
}

/// Flattens a query result: `*List` wrappers yield their items, a single
/// object yields itself, and null yields nothing.
#[must_use]
pub fn normalize(value: Document) -> Vec<Document> {
    if value.is_null() {
        return Vec::new();
    }
    if value.kind().ends_with("List") {
        if let Document::Map(mut map) = value {
            return match map.shift_remove("items") {
                Some(Document::List(items)) => items,
                _ => Vec::new(),
            };
        }
    }
    vec![value]
}

/// Plural resource name for a kind: `Cluster` → `clusters`, `IPAddress` → `ipaddresses`.
#[must_use]
pub fn plural(kind: &str) -> String {
    let lower = kind.to_ascii_lowercase();
    if lower.ends_with('s') {
        format!("{lower}es")
    } else if let Some(stem) = lower.strip_suffix('y') {
        format!("{stem}ies")
    } else {
        format!("{lower}s")
    }
}

/// Fully qualified resource name: `clusters.cluster.x-k8s.io`, or the bare plural for the core group.
#[must_use]
pub fn resource_name(kind: &str, group: &str) -> String {
    if group.is_empty() {
        plural(kind)
    } else {
        format!("{}.{group}", plural(kind))
    }
}

/// API group of an `apiVersion` string; empty for the core group.
#[must_use]
pub fn api_group(api_version: &str) -> &str {
    match api_version.split_once('/') {
        Some((group, _)) => group,
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_wrappers_are_flattened() {
        let list = Document::from(json!({
            "kind": "ClusterList",
            "items": [ { "kind": "Cluster" }, { "kind": "Cluster" } ]
        }));
        assert_eq!(normalize(list).len(), 2);
    }

    #[test]
    fn single_objects_become_one_element_lists() {
        let single = Document::from(json!({ "kind": "Cluster", "metadata": { "name": "a" } }));
        let items = normalize(single);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name(), "a");
        assert!(normalize(Document::Null).is_empty());
    }

    #[test]
    fn empty_list_is_empty() {
        let list = Document::from(json!({ "kind": "List", "items": [] }));
        assert!(normalize(list).is_empty());
    }

    #[test]
    fn plural_names() {
        assert_eq!(plural("Cluster"), "clusters");
        assert_eq!(plural("IPAddress"), "ipaddresses");
        assert_eq!(plural("Policy"), "policies");
        assert_eq!(
            resource_name("KubeadmControlPlane", "controlplane.cluster.x-k8s.io"),
            "kubeadmcontrolplanes.controlplane.cluster.x-k8s.io"
        );
        assert_eq!(resource_name("Secret", ""), "secrets");
    }

    #[test]
    fn api_group_of_version() {
        assert_eq!(api_group("cluster.x-k8s.io/v1beta1"), "cluster.x-k8s.io");
        assert_eq!(api_group("v1"), "");
    }

    #[test]
    fn query_builder_drops_empty_namespace() {
        let q = Query::new("clusters").namespace(Some("")).selector("a=b");
        assert_eq!(q.namespace, None);
        assert_eq!(q.label_selector.as_deref(), Some("a=b"));
    }
}
