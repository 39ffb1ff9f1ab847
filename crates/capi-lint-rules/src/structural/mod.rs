//! Schema and best-practice rules used by `validate` and `lint`.

pub mod api_version;
pub mod cluster_name_label;
pub mod deprecated_fields;
pub mod hardcoded_credentials;
pub mod namespace_specified;
pub mod required_fields;
pub mod required_spec_fields;

pub use api_version::ApiVersion;
pub use cluster_name_label::ClusterNameLabel;
pub use deprecated_fields::DeprecatedFields;
pub use hardcoded_credentials::HardcodedCredentials;
pub use namespace_specified::NamespaceSpecified;
pub use required_fields::RequiredFields;
pub use required_spec_fields::RequiredSpecFields;
