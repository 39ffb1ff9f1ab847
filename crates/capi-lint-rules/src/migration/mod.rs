//! v1beta1 → v1beta2 migration readiness rules used by `migrate`.

pub mod api_version;
pub mod deprecated_fields;
pub mod durations;
pub mod object_reference;

pub use api_version::DeprecatedApiVersion;
pub use deprecated_fields::MigrationDeprecatedFields;
pub use durations::DurationFields;
pub use object_reference::ObjectReferenceShape;

use capi_lint_core::{Document, Finding, Severity};

/// Object reference fields whose shape changes in v1beta2.
pub const OBJECT_REFERENCE_FIELDS: &[&str] = &[
    "spec.infrastructureRef",
    "spec.controlPlaneRef",
    "spec.bootstrap.configRef",
    "spec.template.spec.infrastructureRef",
    "spec.template.spec.bootstrap.configRef",
];

/// Duration fields that become integer seconds: `(v1beta1 path, v1beta2 path)`.
pub const DURATION_FIELDS: &[(&str, &str)] = &[
    ("spec.nodeDeletionTimeout", "spec.deletion.nodeDeletionTimeoutSeconds"),
    ("spec.nodeDrainTimeout", "spec.deletion.nodeDrainTimeoutSeconds"),
    ("spec.nodeVolumeDetachTimeout", "spec.deletion.nodeVolumeDetachTimeoutSeconds"),
    (
        "spec.template.spec.nodeDeletionTimeout",
        "spec.template.spec.deletion.nodeDeletionTimeoutSeconds",
    ),
    (
        "spec.topology.controlPlane.nodeDeletionTimeout",
        "spec.topology.controlPlane.deletion.nodeDeletionTimeoutSeconds",
    ),
];

fn migration_finding(severity: Severity, category: &str, doc: &Document, field: &str, reason: &str) -> Finding {
    Finding::new(severity, category, doc.resource_id(), format!("{field}: {reason}"))
}
