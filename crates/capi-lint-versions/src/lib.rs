//! # capi-lint-versions
//!
//! Release facts for Cluster API versions and a comparator that diffs two
//! points in the release history.
//!
//! ```
//! use capi_lint_versions::compare;
//!
//! let comparison = compare("v1.8.0", "v1.10.0").unwrap();
//! assert_eq!(comparison.versions_between, vec!["v1.9.0", "v1.10.0"]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod compare;
mod knowledge;
mod render;

pub use compare::{compare, parse_version, Comparison, KubernetesChange, ToolchainChange, VersionError};
pub use knowledge::{
    fact, known_versions, ApiChange, ApiChangeType, KubernetesRange, VersionFact, API_CHANGES, VERSIONS,
};
pub use render::{render_checklist, render_comparison, render_version_table};
