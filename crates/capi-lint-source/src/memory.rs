//! In-memory resource source backed by already-loaded documents.
//!
//! Answers the same [`Query`] shape as the live source so every analysis
//! that needs cluster lookups can also run against manifests on disk.

use crate::source::{api_group, plural, Query, ResourceSource, SourceError};
use capi_lint_core::Document;

const CRD_KIND: &str = "CustomResourceDefinition";

/// A fixed set of documents that can be queried like a cluster.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: Vec<Document>,
}

impl MemorySource {
    /// Creates a source over `documents`.
    #[must_use]
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    /// All documents held by this source.
    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    fn matches(doc: &Document, query: &Query) -> bool {
        let (resource, group) = match query.resource.split_once('.') {
            Some((resource, group)) => (resource, Some(group)),
            None => (query.resource.as_str(), None),
        };

        let kind = doc.kind();
        let resource_matches = resource.eq_ignore_ascii_case(kind)
            || resource == plural(kind)
            || resource.eq_ignore_ascii_case(&format!("{kind}s"));
        if !resource_matches {
            return false;
        }
        if let Some(group) = group {
            if api_group(doc.api_version()) != group {
                return false;
            }
        }
        if let Some(name) = &query.name {
            if doc.name() != name {
                return false;
            }
        }
        if !query.all_namespaces {
            if let Some(ns) = &query.namespace {
                if doc.namespace().unwrap_or("default") != ns {
                    return false;
                }
            }
        }
        query
            .label_selector
            .as_deref()
            .map_or(true, |selector| selector_matches(doc, selector))
    }
}

impl ResourceSource for MemorySource {
    fn get(&self, query: &Query) -> Result<Vec<Document>, SourceError> {
        Ok(self
            .documents
            .iter()
            .filter(|doc| Self::matches(doc, query))
            .cloned()
            .collect())
    }

    /// Types with objects in `group`, plus types declared by CRDs for `group`.
    fn discover(&self, group: &str) -> Result<Vec<String>, SourceError> {
        let mut names: Vec<String> = self
            .documents
            .iter()
            .filter_map(|doc| {
                if doc.kind() == CRD_KIND {
                    (doc.str_at("spec.group") == Some(group)).then(|| doc.name().to_string())
                } else {
                    (api_group(doc.api_version()) == group).then(|| format!("{}.{group}", plural(doc.kind())))
                }
            })
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }
}

/// Evaluates an equality-based label selector: `a=b`, `a==b`, `a!=b`, `a`, `!a`.
#[must_use]
pub fn selector_matches(doc: &Document, selector: &str) -> bool {
    selector
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .all(|term| {
            if let Some((key, value)) = term.split_once("!=") {
                doc.label(key.trim()) != Some(value.trim())
            } else if let Some((key, value)) = term.split_once('=') {
                let value = value.trim_start_matches('=');
                doc.label(key.trim()) == Some(value.trim())
            } else if let Some(key) = term.strip_prefix('!') {
                doc.label(key.trim()).is_none()
            } else {
                doc.label(term).is_some()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source() -> MemorySource {
        MemorySource::new(vec![
            Document::from(json!({
                "apiVersion": "cluster.x-k8s.io/v1beta1",
                "kind": "Cluster",
                "metadata": { "name": "alpha", "namespace": "prod" }
            })),
            Document::from(json!({
                "apiVersion": "cluster.x-k8s.io/v1beta1",
                "kind": "Machine",
                "metadata": {
                    "name": "alpha-md-0",
                    "namespace": "prod",
                    "labels": { "cluster.x-k8s.io/cluster-name": "alpha", "role": "worker" }
                }
            })),
            Document::from(json!({
                "apiVersion": "infrastructure.cluster.x-k8s.io/v1beta1",
                "kind": "DockerCluster",
                "metadata": { "name": "alpha" }
            })),
            Document::from(json!({
                "apiVersion": "v1",
                "kind": "Secret",
                "metadata": { "name": "alpha-kubeconfig", "namespace": "prod" }
            })),
        ])
    }

    fn names(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(Document::name).collect()
    }

    #[test]
    fn matches_plural_and_group() {
        let src = source();
        let found = src.get(&Query::new("clusters.cluster.x-k8s.io")).unwrap();
        assert_eq!(names(&found), vec!["alpha"]);
        let found = src.get(&Query::new("dockerclusters.infrastructure.cluster.x-k8s.io")).unwrap();
        assert_eq!(found[0].kind(), "DockerCluster");
        let found = src.get(&Query::new("secrets")).unwrap();
        assert_eq!(names(&found), vec!["alpha-kubeconfig"]);
    }

    #[test]
    fn filters_by_namespace_name_and_labels() {
        let src = source();
        let q = Query::new("machines").namespace(Some("prod")).selector("cluster.x-k8s.io/cluster-name=alpha");
        assert_eq!(src.get(&q).unwrap().len(), 1);

        let q = Query::new("machines").selector("role!=worker");
        assert!(src.get(&q).unwrap().is_empty());

        let q = Query::new("clusters").namespace(Some("default"));
        assert!(src.get(&q).unwrap().is_empty());

        let q = Query::new("dockerclusters").namespace(Some("default")).named("alpha");
        assert_eq!(src.get(&q).unwrap().len(), 1);
    }

    #[test]
    fn nothing_found_is_empty_not_error() {
        assert!(source().get(&Query::new("machinepools")).unwrap().is_empty());
    }

    #[test]
    fn discovers_provider_types() {
        let found = source().discover("infrastructure.cluster.x-k8s.io").unwrap();
        assert_eq!(found, vec!["dockerclusters.infrastructure.cluster.x-k8s.io"]);
    }

    #[test]
    fn crds_declare_served_types() {
        let src = MemorySource::new(vec![Document::from(json!({
            "apiVersion": "apiextensions.k8s.io/v1",
            "kind": "CustomResourceDefinition",
            "metadata": { "name": "dockermachines.infrastructure.cluster.x-k8s.io" },
            "spec": { "group": "infrastructure.cluster.x-k8s.io", "names": { "kind": "DockerMachine" } }
        }))]);
        assert_eq!(
            src.discover("infrastructure.cluster.x-k8s.io").unwrap(),
            vec!["dockermachines.infrastructure.cluster.x-k8s.io"]
        );
        assert!(src.discover("apiextensions.k8s.io").unwrap().is_empty());
        assert_eq!(
            src.get(&Query::new("customresourcedefinitions.apiextensions.k8s.io").named("dockermachines.infrastructure.cluster.x-k8s.io"))
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn selector_forms() {
        let src = source();
        let doc = &src.documents()[1];
        assert!(selector_matches(doc, "role==worker"));
        assert!(selector_matches(doc, "role"));
        assert!(selector_matches(doc, "!missing"));
        assert!(!selector_matches(doc, "role=control-plane"));
    }
}
