//! Cross-resource reference resolution.
//!
//! Follows typed references (`infrastructureRef`, `controlPlaneRef`,
//! `bootstrap.configRef`, CAPI owner references) and label-based ownership
//! to gather the objects a root resource depends on. Resolution is best
//! effort: references that cannot be fetched are skipped.

use crate::source::{api_group, resource_name, Query, ResourceSource};
use capi_lint_core::{Document, CLUSTER_NAME_LABEL};
use std::collections::HashSet;
use tracing::debug;

pub use capi_lint_core::CAPI_GROUP_SUFFIX;

/// Fields holding typed object references.
pub const REFERENCE_FIELDS: &[&str] = &[
    "spec.infrastructureRef",
    "spec.controlPlaneRef",
    "spec.bootstrap.configRef",
];

/// A typed pointer from one object to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    /// Target kind.
    pub kind: String,
    /// Target name.
    pub name: String,
    /// Explicit target namespace; `None` means the referrer's namespace.
    pub namespace: Option<String>,
    /// `apiVersion` when the reference carries one.
    pub api_version: Option<String>,
    /// `apiGroup` when the reference carries one.
    pub api_group: Option<String>,
}

impl Reference {
    /// Reads a reference node. Returns `None` unless `kind` and `name` are set.
    #[must_use]
    pub fn from_node(node: &Document) -> Option<Self> {
        let kind = node.str_at("kind").filter(|k| !k.is_empty())?;
        let name = node.str_at("name").filter(|n| !n.is_empty())?;
        let non_empty = |key: &str| node.str_at(key).filter(|v| !v.is_empty()).map(str::to_string);
        Some(Self {
            kind: kind.to_string(),
            name: name.to_string(),
            namespace: non_empty("namespace"),
            api_version: non_empty("apiVersion"),
            api_group: non_empty("apiGroup"),
        })
    }

    /// The target's API group.
    #[must_use]
    pub fn group(&self) -> &str {
        match (&self.api_group, &self.api_version) {
            (Some(group), _) => group,
            (None, Some(version)) => api_group(version),
            (None, None) => "",
        }
    }

    /// Resource type name to query, e.g. `dockerclusters.infrastructure.cluster.x-k8s.io`.
    #[must_use]
    pub fn resource(&self) -> String {
        resource_name(&self.kind, self.group())
    }
}

/// Extracts every reference a document carries.
#[must_use]
pub fn extract_references(doc: &Document) -> Vec<Reference> {
    let typed = REFERENCE_FIELDS
        .iter()
        .filter_map(|field| Reference::from_node(doc.path(field)));
    let owners = doc
        .owner_references()
        .iter()
        .filter(|owner| {
            owner
                .str_at("apiVersion")
                .is_some_and(|v| v.contains(CAPI_GROUP_SUFFIX))
        })
        .filter_map(|owner| {
            let mut reference = Reference::from_node(owner)?;
            reference.namespace = None;
            Some(reference)
        });
    typed.chain(owners).collect()
}

type SeenKey = (String, String, String);

/// Fetches referenced objects, each at most once per resolver.
pub struct Resolver<'s, S: ResourceSource + ?Sized> {
    source: &'s S,
    depth: usize,
    seen: HashSet<SeenKey>,
}

impl<'s, S: ResourceSource + ?Sized> Resolver<'s, S> {
    /// Creates a one-hop resolver over `source`.
    #[must_use]
    pub fn new(source: &'s S) -> Self {
        Self {
            source,
            depth: 1,
            seen: HashSet::new(),
        }
    }

    /// Follows references up to `depth` hops.
    #[must_use]
    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Records an already-loaded object so it is never fetched again.
    pub fn mark_seen(&mut self, doc: &Document) {
        self.seen.insert(key(
            doc.kind(),
            doc.namespace().unwrap_or("default"),
            doc.name(),
        ));
    }

    /// Returns the objects reachable from `root`, excluding objects already seen.
    pub fn resolve(&mut self, root: &Document) -> Vec<Document> {
        self.mark_seen(root);
        let root_ns = root.namespace().unwrap_or("default").to_string();

        let mut resolved = Vec::new();
        let mut frontier: Vec<(Reference, String)> = extract_references(root)
            .into_iter()
            .map(|r| (r, root_ns.clone()))
            .collect();

        for hop in 0..self.depth {
            let mut next = Vec::new();
            for (reference, referrer_ns) in frontier {
                let ns = reference.namespace.clone().unwrap_or(referrer_ns);
                if !self.seen.insert(key(&reference.kind, &ns, &reference.name)) {
                    continue;
                }

                let query = Query::new(reference.resource())
                    .named(reference.name.clone())
                    .namespace(Some(ns.as_str()));
                match self.source.get(&query) {
                    Ok(docs) if docs.is_empty() => {
                        debug!("Reference {}/{}/{} not found, skipping", reference.kind, ns, reference.name);
                    }
                    Ok(docs) => {
                        for doc in docs {
                            if hop + 1 < self.depth {
                                let doc_ns = doc.namespace().unwrap_or(&ns).to_string();
                                next.extend(extract_references(&doc).into_iter().map(|r| (r, doc_ns.clone())));
                            }
                            resolved.push(doc);
                        }
                    }
                    Err(e) => {
                        debug!("Could not resolve {}/{}/{}: {e}", reference.kind, ns, reference.name);
                    }
                }
            }
            frontier = next;
        }

        resolved
    }

    /// Fetches objects of each resource type labeled as belonging to `cluster`.
    pub fn owned_by_cluster(&mut self, cluster: &Document, resources: &[&str]) -> Vec<Document> {
        let selector = format!("{CLUSTER_NAME_LABEL}={}", cluster.name());
        let ns = cluster.namespace().unwrap_or("default");
        let mut owned = Vec::new();

        for resource in resources {
            let query = Query::new(*resource).namespace(Some(ns)).selector(selector.clone());
            match self.source.get(&query) {
                Ok(docs) => {
                    for doc in docs {
                        let doc_ns = doc.namespace().unwrap_or(ns).to_string();
                        if self.seen.insert(key(doc.kind(), &doc_ns, doc.name())) {
                            owned.push(doc);
                        }
                    }
                }
                Err(e) => debug!("Could not list {resource} for {}: {e}", cluster.name()),
            }
        }

        owned
    }
}

fn key(kind: &str, namespace: &str, name: &str) -> SeenKey {
    (kind.to_string(), namespace.to_string(), name.to_string())
}
