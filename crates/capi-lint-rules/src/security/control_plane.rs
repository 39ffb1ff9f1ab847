//! Hardening checks for kubeadm control planes.
//!
//! Each [`ControlPlaneCheck`] is a separate rule with its own code so it can
//! be disabled or re-graded on its own. All of them read the kubeadm
//! `clusterConfiguration` of a `KubeadmControlPlane` (or the template of a
//! `KubeadmControlPlaneTemplate`); `extraArgs` may use either the map or the
//! `[{name, value}]` list form.

use capi_lint_core::{Document, Finding, Rule, RuleContext, Severity};

/// One control-plane hardening property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPlaneCheck {
    /// `encryption-provider-config` is set on the API server.
    EncryptionAtRest,
    /// `audit-policy-file` is set on the API server.
    AuditPolicy,
    /// `authorization-mode` includes RBAC.
    RbacAuthorization,
    /// `anonymous-auth` is not `true`.
    AnonymousAuth,
    /// Kubelets request serving certificates.
    KubeletServingCerts,
}

impl ControlPlaneCheck {
    /// Every check, in code order.
    pub const ALL: [Self; 5] = [
        Self::EncryptionAtRest,
        Self::AuditPolicy,
        Self::RbacAuthorization,
        Self::AnonymousAuth,
        Self::KubeletServingCerts,
    ];

    fn code(self) -> &'static str {
        match self {
            Self::EncryptionAtRest => "CL102",
            Self::AuditPolicy => "CL103",
            Self::RbacAuthorization => "CL104",
            Self::AnonymousAuth => "CL105",
            Self::KubeletServingCerts => "CL106",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::EncryptionAtRest => "encryption-at-rest",
            Self::AuditPolicy => "audit-policy",
            Self::RbacAuthorization => "rbac-authorization",
            Self::AnonymousAuth => "anonymous-auth",
            Self::KubeletServingCerts => "kubelet-serving-certs",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::EncryptionAtRest => "Requires etcd encryption at rest on the API server",
            Self::AuditPolicy => "Requires an API server audit policy",
            Self::RbacAuthorization => "Requires RBAC in the API server authorization-mode",
            Self::AnonymousAuth => "Forbids anonymous authentication on the API server",
            Self::KubeletServingCerts => "Requires kubelet server TLS bootstrap",
        }
    }

    fn category(self) -> &'static str {
        match self {
            Self::EncryptionAtRest => "Encryption",
            Self::AuditPolicy => "Audit",
            Self::RbacAuthorization => "Authorization",
            Self::AnonymousAuth => "Authentication",
            Self::KubeletServingCerts => "TLS",
        }
    }

    fn default_severity(self) -> Severity {
        match self {
            Self::EncryptionAtRest | Self::AuditPolicy => Severity::Medium,
            Self::RbacAuthorization | Self::AnonymousAuth => Severity::High,
            Self::KubeletServingCerts => Severity::Low,
        }
    }

    /// Returns the message and recommendation when the property does not hold.
    fn violation(self, kubeadm: &Document) -> Option<(&'static str, &'static str)> {
        let cluster_config = kubeadm.get("clusterConfiguration");
        let api_server_args = cluster_config.path("apiServer.extraArgs");
        match self {
            Self::EncryptionAtRest => api_server_args
                .extra_arg("encryption-provider-config")
                .is_none()
                .then_some((
                    "etcd encryption at rest not configured",
                    "Configure encryption-provider-config for secret encryption",
                )),
            Self::AuditPolicy => api_server_args
                .extra_arg("audit-policy-file")
                .is_none()
                .then_some((
                    "Kubernetes audit policy not configured",
                    "Configure audit-policy-file for API audit logging",
                )),
            Self::RbacAuthorization => {
                let mode = api_server_args.extra_arg("authorization-mode").unwrap_or_default();
                (!mode.contains("RBAC")).then_some((
                    "RBAC not explicitly enabled in authorization-mode",
                    "Ensure authorization-mode includes RBAC",
                ))
            }
            Self::AnonymousAuth => (api_server_args.extra_arg("anonymous-auth").as_deref() == Some("true"))
                .then_some(("Anonymous authentication is enabled", "Set anonymous-auth=false")),
            Self::KubeletServingCerts => {
                let bootstrap = cluster_config.bool_at("kubeletConfiguration.serverTLSBootstrap") == Some(true)
                    || ["initConfiguration", "joinConfiguration"].iter().any(|section| {
                        kubeadm
                            .path(section)
                            .path("nodeRegistration.kubeletExtraArgs")
                            .extra_arg("rotate-server-certificates")
                            .as_deref()
                            == Some("true")
                    });
                (!bootstrap).then_some((
                    "Kubelet server TLS bootstrap not enabled",
                    "Enable serverTLSBootstrap for automatic certificate management",
                ))
            }
        }
    }
}

/// Returns the kubeadm config spec of a control plane or control plane template.
pub(crate) fn kubeadm_config_spec(doc: &Document) -> Option<&Document> {
    let spec = match doc.kind() {
        "KubeadmControlPlane" => doc.path("spec.kubeadmConfigSpec"),
        "KubeadmControlPlaneTemplate" => doc.path("spec.template.spec.kubeadmConfigSpec"),
        _ => return None,
    };
    Some(spec)
}

/// Runs one [`ControlPlaneCheck`].
#[derive(Debug, Clone)]
pub struct ControlPlaneSecurity {
    check: ControlPlaneCheck,
    /// Severity level.
    pub severity: Severity,
}

impl ControlPlaneSecurity {
    /// Creates the rule for `check` with its default severity.
    #[must_use]
    pub fn new(check: ControlPlaneCheck) -> Self {
        Self {
            check,
            severity: check.default_severity(),
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// One rule per check.
    #[must_use]
    pub fn all() -> Vec<Self> {
        ControlPlaneCheck::ALL.into_iter().map(Self::new).collect()
    }
}

impl Rule for ControlPlaneSecurity {
    fn name(&self) -> &'static str {
        self.check.name()
    }

    fn code(&self) -> &'static str {
        self.check.code()
    }

    fn description(&self) -> &'static str {
        self.check.description()
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document, _ctx: &RuleContext<'_>) -> Vec<Finding> {
        let Some(kubeadm) = kubeadm_config_spec(doc) else {
            return vec![];
        };
        self.check
            .violation(kubeadm)
            .map(|(message, recommendation)| {
                Finding::new(self.severity, self.check.category(), doc.resource_id(), message)
                    .with_recommendation(recommendation)
            })
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(doc: &Document) -> Vec<Finding> {
        let ctx = RuleContext::new();
        ControlPlaneSecurity::all()
            .iter()
            .flat_map(|rule| rule.check(doc, &ctx))
            .collect()
    }

    fn kcp(api_server_args: serde_json::Value) -> Document {
        Document::from(json!({
            "apiVersion": "controlplane.cluster.x-k8s.io/v1beta1",
            "kind": "KubeadmControlPlane",
            "metadata": { "name": "a-cp", "namespace": "prod" },
            "spec": {
                "kubeadmConfigSpec": {
                    "clusterConfiguration": {
                        "apiServer": { "extraArgs": api_server_args },
                        "kubeletConfiguration": { "serverTLSBootstrap": true }
                    }
                }
            }
        }))
    }

    #[test]
    fn node_only_authorization_with_anonymous_auth_yields_two_high_findings() {
        let doc = kcp(json!({
            "authorization-mode": "Node",
            "anonymous-auth": "true",
            "encryption-provider-config": "/etc/kubernetes/encryption.yaml",
            "audit-policy-file": "/etc/kubernetes/audit.yaml"
        }));
        let findings = run(&doc);
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.severity == Severity::High));
        let categories: Vec<_> = findings.iter().map(|f| f.category.as_str()).collect();
        assert_eq!(categories, vec!["Authorization", "Authentication"]);
    }

    #[test]
    fn list_form_extra_args_are_read() {
        let doc = kcp(json!([
            { "name": "authorization-mode", "value": "Node,RBAC" },
            { "name": "encryption-provider-config", "value": "/enc.yaml" },
            { "name": "audit-policy-file", "value": "/audit.yaml" }
        ]));
        assert!(run(&doc).is_empty());
    }

    #[test]
    fn bare_control_plane_misses_everything_but_anonymous_auth() {
        let doc = Document::from(json!({
            "kind": "KubeadmControlPlane",
            "metadata": { "name": "a-cp" },
            "spec": { "kubeadmConfigSpec": {} }
        }));
        let categories: Vec<_> = run(&doc).into_iter().map(|f| f.category).collect();
        assert_eq!(categories, vec!["Encryption", "Audit", "Authorization", "TLS"]);
    }

    #[test]
    fn rotate_server_certificates_counts_as_serving_certs() {
        let doc = Document::from(json!({
            "kind": "KubeadmControlPlaneTemplate",
            "metadata": { "name": "t" },
            "spec": { "template": { "spec": { "kubeadmConfigSpec": {
                "clusterConfiguration": { "apiServer": { "extraArgs": {
                    "authorization-mode": "Node,RBAC",
                    "encryption-provider-config": "/enc.yaml",
                    "audit-policy-file": "/audit.yaml"
                } } },
                "initConfiguration": { "nodeRegistration": { "kubeletExtraArgs": { "rotate-server-certificates": "true" } } }
            } } } }
        }));
        assert!(run(&doc).is_empty());
    }

    #[test]
    fn other_kinds_are_ignored() {
        let doc = Document::from(json!({ "kind": "Cluster", "metadata": { "name": "a" } }));
        assert!(run(&doc).is_empty());
    }
}
