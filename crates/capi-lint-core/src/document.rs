//! Generic, path-addressable tree for Kubernetes objects.
//!
//! Every Cluster API kind (and every provider kind) is handled through the
//! same [`Document`] shape. Accessors never fail: a missing key, an index out
//! of range, or a type mismatch all resolve to [`Document::Null`] so rules can
//! traverse optional structure without guarding every step.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Label carrying the owning cluster's name.
pub const CLUSTER_NAME_LABEL: &str = "cluster.x-k8s.io/cluster-name";

/// Group suffix shared by every Cluster API group.
pub const CAPI_GROUP_SUFFIX: &str = "cluster.x-k8s.io";

static NULL: Document = Document::Null;

/// One node of a Kubernetes object tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Document {
    /// Absent or explicit null value.
    #[default]
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Numeric scalar.
    Number(serde_json::Number),
    /// String scalar.
    String(String),
    /// Ordered sequence.
    List(Vec<Document>),
    /// Mapping with preserved key order.
    Map(IndexMap<String, Document>),
}

impl Document {
    /// Creates an empty mapping.
    #[must_use]
    pub fn map() -> Self {
        Self::Map(IndexMap::new())
    }

    /// Returns the child stored under `key`, or `Null`.
    #[must_use]
    pub fn get(&self, key: &str) -> &Document {
        match self {
            Self::Map(map) => map.get(key).unwrap_or(&NULL),
            Self::List(items) => key
                .parse::<usize>()
                .ok()
                .and_then(|idx| items.get(idx))
                .unwrap_or(&NULL),
            _ => &NULL,
        }
    }

    /// Resolves a dot-separated path such as `spec.topology.controlPlane.replicas`.
    ///
    /// Numeric segments index into lists. Keys that themselves contain dots
    /// (label keys, for instance) must be reached with [`Document::get`].
    #[must_use]
    pub fn path(&self, path: &str) -> &Document {
        path.split('.')
            .filter(|segment| !segment.is_empty())
            .fold(self, |doc, segment| doc.get(segment))
    }

    /// Returns `true` for `Null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for values that carry no content: null, `""`, `[]`, `{}`.
    #[must_use]
    pub fn is_empty_value(&self) -> bool {
        match self {
            Self::Null => true,
            Self::String(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Map(map) => map.is_empty(),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }

    /// Returns `true` if `path` resolves to a non-null value.
    #[must_use]
    pub fn contains_path(&self, path: &str) -> bool {
        !self.path(path).is_null()
    }

    /// Returns the string value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integral number.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Returns the mapping, if this is a map.
    #[must_use]
    pub fn as_map(&self) -> Option<&IndexMap<String, Document>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the mapping mutably, if this is a map.
    pub fn as_map_mut(&mut self) -> Option<&mut IndexMap<String, Document>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the list items, or an empty slice for non-lists.
    #[must_use]
    pub fn as_list(&self) -> &[Document] {
        match self {
            Self::List(items) => items,
            _ => &[],
        }
    }

    /// Renders a scalar as text (`true`, `3`, `foo`). Collections and null yield `None`.
    #[must_use]
    pub fn scalar_string(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Number(n) => Some(n.to_string()),
            Self::Null | Self::List(_) | Self::Map(_) => None,
        }
    }

    /// Shorthand for `self.path(path).as_str()`.
    #[must_use]
    pub fn str_at(&self, path: &str) -> Option<&str> {
        self.path(path).as_str()
    }

    /// Shorthand for `self.path(path).as_bool()`.
    #[must_use]
    pub fn bool_at(&self, path: &str) -> Option<bool> {
        self.path(path).as_bool()
    }

    /// Shorthand for `self.path(path).as_i64()`.
    #[must_use]
    pub fn i64_at(&self, path: &str) -> Option<i64> {
        self.path(path).as_i64()
    }

    /// Shorthand for `self.path(path).as_map()`.
    #[must_use]
    pub fn map_at(&self, path: &str) -> Option<&IndexMap<String, Document>> {
        self.path(path).as_map()
    }

    /// Shorthand for `self.path(path).as_list()`.
    #[must_use]
    pub fn list_at(&self, path: &str) -> &[Document] {
        self.path(path).as_list()
    }

    /// Reads a component argument from an `extraArgs` node.
    ///
    /// Accepts both the map form (`{authorization-mode: Node}`) and the
    /// list form (`[{name: authorization-mode, value: Node}]`).
    #[must_use]
    pub fn extra_arg(&self, name: &str) -> Option<String> {
        match self {
            Self::Map(_) => self.get(name).scalar_string(),
            Self::List(items) => items
                .iter()
                .find(|item| item.str_at("name") == Some(name))
                .and_then(|item| item.get("value").scalar_string()),
            _ => None,
        }
    }

    // ── Kubernetes object helpers ──

    /// The object's `kind`, or `""`.
    #[must_use]
    pub fn kind(&self) -> &str {
        self.str_at("kind").unwrap_or_default()
    }

    /// The object's `apiVersion`, or `""`.
    #[must_use]
    pub fn api_version(&self) -> &str {
        self.str_at("apiVersion").unwrap_or_default()
    }

    /// The object's `metadata.name`, or `""`.
    #[must_use]
    pub fn name(&self) -> &str {
        self.str_at("metadata.name").unwrap_or_default()
    }

    /// The object's `metadata.namespace`, if set and non-empty.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.str_at("metadata.namespace").filter(|ns| !ns.is_empty())
    }

    /// The value of one label.
    #[must_use]
    pub fn label(&self, key: &str) -> Option<&str> {
        self.path("metadata.labels").get(key).as_str()
    }

    /// All labels, if any are set.
    #[must_use]
    pub fn labels(&self) -> Option<&IndexMap<String, Document>> {
        self.map_at("metadata.labels")
    }

    /// All annotations, if any are set.
    #[must_use]
    pub fn annotations(&self) -> Option<&IndexMap<String, Document>> {
        self.map_at("metadata.annotations")
    }

    /// The value of one annotation.
    #[must_use]
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.path("metadata.annotations").get(key).as_str()
    }

    /// The `metadata.ownerReferences` entries.
    #[must_use]
    pub fn owner_references(&self) -> &[Document] {
        self.list_at("metadata.ownerReferences")
    }

    /// The cluster this object belongs to, from `spec.clusterName` or the cluster-name label.
    #[must_use]
    pub fn cluster_name(&self) -> Option<&str> {
        self.str_at("spec.clusterName")
            .filter(|n| !n.is_empty())
            .or_else(|| self.label(CLUSTER_NAME_LABEL))
    }

    /// Identifier used in findings: `Kind/namespace/name`.
    #[must_use]
    pub fn resource_id(&self) -> String {
        let kind = match self.kind() {
            "" => "Unknown",
            kind => kind,
        };
        let name = match self.name() {
            "" => "unknown",
            name => name,
        };
        format!("{kind}/{}/{name}", self.namespace().unwrap_or("default"))
    }
}

impl From<serde_json::Value> for Document {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect()),
        }
    }
}

impl From<serde_yaml::Value> for Document {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => yaml_number(&n),
            Value::String(s) => Self::String(s),
            Value::Sequence(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Mapping(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (yaml_key(k), Self::from(v)))
                    .collect(),
            ),
            Value::Tagged(tagged) => {
                let tagged = *tagged;
                Self::from(tagged.value)
            }
        }
    }
}

impl From<&str> for Document {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Document {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Document {
    if let Some(i) = n.as_i64() {
        Document::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        Document::Number(u.into())
    } else {
        n.as_f64()
            .and_then(serde_json::Number::from_f64)
            .map_or(Document::Null, Document::Number)
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    use serde_yaml::Value;
    match key {
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::List(items) => items.serialize(serializer),
            Self::Map(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn machine() -> Document {
        Document::from(json!({
            "apiVersion": "cluster.x-k8s.io/v1beta1",
            "kind": "Machine",
            "metadata": {
                "name": "worker-0",
                "namespace": "prod",
                "labels": { "cluster.x-k8s.io/cluster-name": "alpha" }
            },
            "spec": {
                "clusterName": "",
                "bootstrap": { "configRef": { "kind": "KubeadmConfig", "name": "worker-0" } }
            },
            "status": {
                "conditions": [ { "type": "Ready", "status": "True" } ]
            }
        }))
    }

    #[test]
    fn path_lookup_walks_maps_and_lists() {
        let doc = machine();
        assert_eq!(doc.str_at("spec.bootstrap.configRef.kind"), Some("KubeadmConfig"));
        assert_eq!(doc.str_at("status.conditions.0.type"), Some("Ready"));
    }

    #[test]
    fn missing_paths_resolve_to_null() {
        let doc = machine();
        assert!(doc.path("spec.does.not.exist").is_null());
        assert!(doc.path("status.conditions.7.type").is_null());
        assert!(doc.path("kind.nested").is_null());
        assert!(!doc.contains_path("spec.infrastructureRef"));
    }

    #[test]
    fn kubernetes_helpers() {
        let doc = machine();
        assert_eq!(doc.kind(), "Machine");
        assert_eq!(doc.namespace(), Some("prod"));
        assert_eq!(doc.label(CLUSTER_NAME_LABEL), Some("alpha"));
        assert_eq!(doc.cluster_name(), Some("alpha"));
        assert_eq!(doc.resource_id(), "Machine/prod/worker-0");
    }

    #[test]
    fn resource_id_defaults() {
        let doc = Document::from(json!({ "metadata": {} }));
        assert_eq!(doc.resource_id(), "Unknown/default/unknown");
    }

    #[test]
    fn extra_arg_reads_map_and_list_forms() {
        let map = Document::from(json!({ "anonymous-auth": true, "authorization-mode": "Node" }));
        assert_eq!(map.extra_arg("anonymous-auth").as_deref(), Some("true"));
        assert_eq!(map.extra_arg("authorization-mode").as_deref(), Some("Node"));

        let list = Document::from(json!([
            { "name": "authorization-mode", "value": "Node,RBAC" }
        ]));
        assert_eq!(list.extra_arg("authorization-mode").as_deref(), Some("Node,RBAC"));
        assert_eq!(list.extra_arg("anonymous-auth"), None);
    }

    #[test]
    fn yaml_conversion_stringifies_keys_and_unwraps_tags() {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str("replicas: 3\n1: one\ntrue: yes-key\ntagged: !custom value\n")
                .unwrap();
        let doc = Document::from(yaml);
        assert_eq!(doc.i64_at("replicas"), Some(3));
        assert_eq!(doc.get("1").as_str(), Some("one"));
        assert_eq!(doc.get("true").as_str(), Some("yes-key"));
        assert_eq!(doc.get("tagged").as_str(), Some("value"));
    }

    #[test]
    fn serialization_preserves_key_order() {
        let doc = Document::from(json!({ "kind": "Cluster", "apiVersion": "v1", "metadata": { "name": "a" } }));
        let out = serde_json::to_string(&doc).unwrap();
        assert_eq!(out, r#"{"kind":"Cluster","apiVersion":"v1","metadata":{"name":"a"}}"#);
    }

    #[test]
    fn empty_values() {
        assert!(Document::Null.is_empty_value());
        assert!(Document::from("").is_empty_value());
        assert!(Document::map().is_empty_value());
        assert!(!Document::Bool(false).is_empty_value());
    }
}
