//! Security posture rules used by `audit`.

pub mod availability;
pub mod bootstrap_data;
pub mod control_plane;
pub mod kubeconfig_secret;
pub mod network;
pub mod pod_security;

pub use availability::ControlPlaneReplicas;
pub use bootstrap_data::BootstrapDataSecret;
pub use control_plane::{ControlPlaneCheck, ControlPlaneSecurity};
pub use kubeconfig_secret::OrphanedKubeconfigSecret;
pub use network::ClusterNetwork;
pub use pod_security::PodSecurityStandard;
