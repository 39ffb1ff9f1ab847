//! Status condition extraction and classification.
//!
//! Conditions are read from `status.conditions`, falling back to
//! `status.v1beta2.conditions` for v1beta1 objects that already publish the
//! newer condition set.

use capi_lint_core::Document;
use std::collections::{BTreeMap, BTreeSet};

/// Condition types that are healthy only when `True`.
pub const POSITIVE_CONDITIONS: &[&str] = &[
    "Ready",
    "Available",
    "InfrastructureReady",
    "ControlPlaneReady",
    "BootstrapReady",
    "Provisioned",
    "Initialized",
    "UpToDate",
];

/// Condition types that are healthy only when `False`.
pub const NEGATIVE_CONDITIONS: &[&str] = &["Stalled", "Deleting", "Paused"];

/// The condition entries of an object.
#[must_use]
pub fn raw_conditions(doc: &Document) -> &[Document] {
    let conditions = doc.list_at("status.conditions");
    if conditions.is_empty() {
        doc.list_at("status.v1beta2.conditions")
    } else {
        conditions
    }
}

/// One condition together with the object it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// Owning object's kind.
    pub kind: String,
    /// Owning object's name.
    pub name: String,
    /// Owning object's namespace (`default` when unset).
    pub namespace: String,
    /// Condition type, e.g. `Ready`.
    pub condition_type: String,
    /// `True`, `False` or `Unknown`.
    pub status: String,
    /// Machine-readable reason, possibly empty.
    pub reason: String,
    /// Human-readable message, possibly empty.
    pub message: String,
    /// `lastTransitionTime`, possibly empty.
    pub last_transition: String,
}

impl Condition {
    /// Reads one condition entry of `owner`.
    #[must_use]
    pub fn from_entry(owner: &Document, entry: &Document) -> Self {
        let text = |key: &str| entry.str_at(key).unwrap_or_default().to_string();
        let kind = match owner.kind() {
            "" => "Unknown",
            kind => kind,
        };
        let name = match owner.name() {
            "" => "unknown",
            name => name,
        };
        Self {
            kind: kind.to_string(),
            name: name.to_string(),
            namespace: owner.namespace().unwrap_or("default").to_string(),
            condition_type: text("type"),
            status: entry.str_at("status").unwrap_or("Unknown").to_string(),
            reason: text("reason"),
            message: text("message"),
            last_transition: text("lastTransitionTime"),
        }
    }

    /// `Kind/namespace/name` of the owning object.
    #[must_use]
    pub fn resource(&self) -> String {
        format!("{}/{}/{}", self.kind, self.namespace, self.name)
    }

    /// Positive types are healthy when `True`, negative types when `False`,
    /// anything else is considered healthy.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        let condition_type = self.condition_type.as_str();
        if POSITIVE_CONDITIONS.contains(&condition_type) {
            self.status == "True"
        } else if NEGATIVE_CONDITIONS.contains(&condition_type) {
            self.status == "False"
        } else {
            true
        }
    }
}

/// Extracts every condition of `doc`. Entries that are not maps are skipped.
#[must_use]
pub fn conditions(doc: &Document) -> Vec<Condition> {
    raw_conditions(doc)
        .iter()
        .filter(|entry| entry.as_map().is_some())
        .map(|entry| Condition::from_entry(doc, entry))
        .collect()
}

/// Healthy and total counts for one kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindHealth {
    /// All conditions of this kind.
    pub total: usize,
    /// Healthy conditions of this kind.
    pub healthy: usize,
}

/// Aggregate view over a set of conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionSummary {
    /// Number of conditions.
    pub total: usize,
    /// Number of healthy conditions.
    pub healthy: usize,
    /// Counts per owning kind, sorted by kind.
    pub by_kind: BTreeMap<String, KindHealth>,
    /// Condition types with at least one unhealthy entry, sorted.
    pub unhealthy_types: BTreeSet<String>,
}

impl ConditionSummary {
    /// Summarizes `conditions`.
    #[must_use]
    pub fn new(conditions: &[Condition]) -> Self {
        let mut summary = Self::default();
        for condition in conditions {
            let healthy = condition.is_healthy();
            summary.total += 1;
            let kind = summary.by_kind.entry(condition.kind.clone()).or_default();
            kind.total += 1;
            if healthy {
                summary.healthy += 1;
                kind.healthy += 1;
            } else {
                summary.unhealthy_types.insert(condition.condition_type.clone());
            }
        }
        summary
    }

    /// Number of unhealthy conditions.
    #[must_use]
    pub fn unhealthy(&self) -> usize {
        self.total - self.healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn machine(status: serde_json::Value) -> Document {
        Document::from(json!({
            "kind": "Machine",
            "metadata": { "name": "m0", "namespace": "prod" },
            "status": status
        }))
    }

    #[test]
    fn reads_current_conditions_first() {
        let doc = machine(json!({
            "conditions": [ { "type": "Ready", "status": "True" } ],
            "v1beta2": { "conditions": [ { "type": "Available", "status": "False" } ] }
        }));
        let found = conditions(&doc);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].condition_type, "Ready");
        assert_eq!(found[0].resource(), "Machine/prod/m0");
    }

    #[test]
    fn falls_back_to_v1beta2_conditions() {
        let doc = machine(json!({ "v1beta2": { "conditions": [ { "type": "Available", "status": "False" } ] } }));
        let found = conditions(&doc);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].condition_type, "Available");
    }

    #[test]
    fn health_classification() {
        let doc = machine(json!({ "conditions": [
            { "type": "Ready", "status": "False" },
            { "type": "Paused", "status": "False" },
            { "type": "Deleting", "status": "True" },
            { "type": "Custom", "status": "False" },
            { "type": "UpToDate" }
        ] }));
        let healthy: Vec<_> = conditions(&doc).iter().map(Condition::is_healthy).collect();
        assert_eq!(healthy, vec![false, true, false, true, false]);
    }

    #[test]
    fn summary_counts_by_kind() {
        let mut all = conditions(&machine(json!({ "conditions": [
            { "type": "Ready", "status": "False" },
            { "type": "BootstrapReady", "status": "True" }
        ] })));
        all.extend(conditions(&Document::from(json!({
            "kind": "Cluster",
            "metadata": { "name": "a" },
            "status": { "conditions": [ { "type": "Ready", "status": "True" } ] }
        }))));

        let summary = ConditionSummary::new(&all);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.unhealthy(), 1);
        assert_eq!(summary.by_kind["Machine"], KindHealth { total: 2, healthy: 1 });
        assert_eq!(summary.by_kind["Cluster"], KindHealth { total: 1, healthy: 1 });
        assert!(summary.unhealthy_types.contains("Ready"));
    }
}
