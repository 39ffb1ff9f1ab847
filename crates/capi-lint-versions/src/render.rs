//! Text rendering of comparisons.

use crate::compare::Comparison;
use crate::knowledge::known_versions;
use std::fmt::Write;

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";

/// Renders a comparison for humans.
#[must_use]
pub fn render_comparison(c: &Comparison) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "CAPI Version Comparison: {} → {}", c.from_version, c.to_version);
    let _ = writeln!(out, "{RULE}");

    if !c.versions_between.is_empty() {
        let _ = writeln!(out, "\nVersions in range: {}", c.versions_between.join(", "));
    }

    if let Some(k8s) = &c.kubernetes_change {
        let _ = writeln!(out, "\n📦 Kubernetes Version Requirements:");
        let _ = writeln!(out, "   From: {} - {}", k8s.from_min, k8s.from_max);
        let _ = writeln!(out, "   To:   {} - {}", k8s.to_min, k8s.to_max);
    }

    if let Some(go) = c.go_change.as_ref().filter(|go| go.changed()) {
        let _ = writeln!(out, "\n🔧 Go Version:");
        let _ = writeln!(out, "   {} → {}", go.from, go.to);
    }

    bullets(&mut out, "🔴 Breaking Changes:", &c.breaking_changes);
    bullets(&mut out, "⚠️  Deprecations:", &c.deprecations);
    bullets(&mut out, "✨ New Features:", &c.new_features);

    if !c.api_changes.is_empty() {
        let _ = writeln!(out, "\n📝 API Changes (v1beta1 → v1beta2):");
        for change in &c.api_changes {
            let _ = writeln!(
                out,
                "\n   {} [{}] {}",
                change.change_type.icon(),
                change.kind,
                change.description
            );
            if !change.old.is_empty() {
                let _ = writeln!(out, "      Old: {}", change.old);
            }
            if !change.new.is_empty() {
                let _ = writeln!(out, "      New: {}", change.new);
            }
        }
    }

    out
}

fn bullets(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{title}");
    for item in items {
        let _ = writeln!(out, "   • {item}");
    }
}

fn numbered(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n□ {title}");
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(out, "   □ {}. {item}", i + 1);
    }
}

/// Renders a comparison as an ordered migration task list.
#[must_use]
pub fn render_checklist(c: &Comparison) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "MIGRATION CHECKLIST");
    let _ = writeln!(out, "{RULE}");

    let _ = writeln!(out, "\n□ Pre-migration:");
    if let Some(k8s) = &c.kubernetes_change {
        let _ = writeln!(out, "   □ Verify Kubernetes version meets {}+ requirement", k8s.to_min);
    }
    if let Some(go) = c.go_change.as_ref().filter(|go| go.changed()) {
        let _ = writeln!(out, "   □ Update Go to {}", go.to);
    }
    let _ = writeln!(out, "   □ Backup cluster state (clusterctl move or export)");
    let _ = writeln!(out, "   □ Review release notes for all versions in range");

    numbered(&mut out, "Breaking changes to address:", &c.breaking_changes);
    numbered(&mut out, "Deprecated features to migrate:", &c.deprecations);

    let _ = writeln!(out, "\n□ Post-migration:");
    let _ = writeln!(out, "   □ Run clusterctl upgrade plan");
    let _ = writeln!(out, "   □ Verify all clusters Ready");
    let _ = writeln!(out, "   □ Check conditions for any warnings");
    let _ = writeln!(out, "   □ Update provider versions if needed");

    out
}

/// Renders the knowledge base as a table, oldest release first.
#[must_use]
pub fn render_version_table() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Known CAPI Versions:");
    let _ = writeln!(out, "{THIN_RULE}");
    let _ = writeln!(
        out,
        "{:<10} {:<12} {:<10} {:<10} {:<6}",
        "Version", "Release", "K8s Min", "K8s Max", "Go"
    );
    let _ = writeln!(out, "{THIN_RULE}");
    for (_, fact) in known_versions() {
        let _ = writeln!(
            out,
            "{:<10} {:<12} {:<10} {:<10} {:<6}",
            fact.version, fact.release_date, fact.kubernetes.min, fact.kubernetes.max, fact.go_version
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::compare;

    #[test]
    fn checklist_for_two_minor_releases() {
        let c = compare("v1.8.0", "v1.10.0").unwrap();
        insta::assert_snapshot!(render_checklist(&c), @r"
        ============================================================
        MIGRATION CHECKLIST
        ============================================================

        □ Pre-migration:
           □ Verify Kubernetes version meets v1.30.0+ requirement
           □ Update Go to 1.23
           □ Backup cluster state (clusterctl move or export)
           □ Review release notes for all versions in range

        □ Post-migration:
           □ Run clusterctl upgrade plan
           □ Verify all clusters Ready
           □ Check conditions for any warnings
           □ Update provider versions if needed
        ");
    }

    #[test]
    fn checklist_numbers_breaking_changes() {
        let c = compare("v1.7.0", "v1.8.0").unwrap();
        let text = render_checklist(&c);
        assert!(text.contains("□ Breaking changes to address:\n   □ 1. Go 1.22 required\n   □ 2. Minimum"));
        assert!(text.contains("   □ 1. v1beta1 conditions (planned migration to v1beta2)"));
    }

    #[test]
    fn comparison_hides_unchanged_toolchain() {
        let c = compare("v1.6.0", "v1.7.0").unwrap();
        let text = render_comparison(&c);
        assert!(text.contains("CAPI Version Comparison: v1.6.0 → v1.7.0"));
        assert!(text.contains("Versions in range: v1.7.0"));
        assert!(!text.contains("Go Version"));
        assert!(text.contains("↔️ [Cluster] InfrastructureRef now uses TypedObjectReference type"));
        assert!(text.contains("      Old: status.phase"));
    }

    #[test]
    fn version_table_lists_every_release() {
        let table = render_version_table();
        assert!(table.contains("v1.6.0     2024-03-26   v1.26.0    v1.30.x    1.21"));
        assert_eq!(table.lines().filter(|l| l.starts_with("v1.")).count(), 7);
    }
}
